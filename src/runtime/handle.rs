use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::runtime::error::Error;

/// Future for the outcome of one started execution of an [`AsyncTask`].
///
/// Dropping the handle does not stop the work; the outcome is discarded.
///
/// [`AsyncTask`]: crate::runtime::AsyncTask
pub struct TaskHandle<T> {
    id: Uuid,
    receiver: oneshot::Receiver<Result<T, Error>>,
}

// Manual Debug implementation - works regardless of whether T implements Debug
impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("result_type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(id: Uuid, receiver: oneshot::Receiver<Result<T, Error>>) -> Self {
        Self { id, receiver }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.map_err(Error::from).and_then(|result| result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_with_the_sent_result() {
        let (tx, rx) = oneshot::channel();
        let handle = TaskHandle::<u8>::new(Uuid::new_v4(), rx);
        tx.send(Ok(9)).unwrap();
        assert_eq!(handle.await.unwrap(), 9);
    }

    #[tokio::test]
    async fn closed_channel_is_abandoned() {
        let (tx, rx) = oneshot::channel::<Result<u8, Error>>();
        let handle = TaskHandle::new(Uuid::new_v4(), rx);
        let id = handle.id();
        drop(tx);

        assert!(!id.is_nil());
        assert!(matches!(handle.await, Err(Error::Abandoned)));
    }
}
