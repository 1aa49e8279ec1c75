use std::marker::PhantomData;
use std::sync::Arc;

use crate::combinators::guarded;
use crate::runtime::{AsyncTask, Error, ResultSink, Start};

/// Transforms the successful result of the wrapped task.
///
/// Created via [`transform`] or [`AsyncTask::map`].
pub struct Map<T, F> {
    source: AsyncTask<T>,
    f: Arc<F>,
}

/// Create a task whose success is `f` applied to the success of `source`.
pub fn transform<T, R, F>(source: AsyncTask<T>, f: F) -> AsyncTask<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    AsyncTask::from_node(Map {
        source,
        f: Arc::new(f),
    })
}

impl<T, R, F> Start<R> for Map<T, F>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    fn start(&self, sink: ResultSink<R>) {
        let f = Arc::clone(&self.f);
        self.source.start(ResultSink::new(move |result: Result<T, Error>| match result {
            Ok(value) => sink.complete(guarded(|| f(value))),
            Err(error) => {
                tracing::debug!(%error, "map skipped: upstream failed");
                sink.fail(error);
            }
        }));
    }
}

/// Like [`Map`], but the function itself may fail.
pub struct TryMap<T, F, R> {
    source: AsyncTask<T>,
    f: Arc<F>,
    _phantom: PhantomData<fn() -> R>,
}

impl<T, R, F> Start<R> for TryMap<T, F, R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<R, Error> + Send + Sync + 'static,
{
    fn start(&self, sink: ResultSink<R>) {
        let f = Arc::clone(&self.f);
        self.source.start(ResultSink::new(move |result: Result<T, Error>| match result {
            Ok(value) => sink.complete(guarded(|| f(value)).and_then(|mapped| mapped)),
            Err(error) => {
                tracing::debug!(%error, "try_map skipped: upstream failed");
                sink.fail(error);
            }
        }));
    }
}

impl<T> AsyncTask<T>
where
    T: Send + 'static,
{
    /// Transform the successful result; failures pass through unchanged.
    ///
    /// ```
    /// use tasklink::AsyncTask;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let len = AsyncTask::ready("hello").map(str::len);
    /// assert_eq!(len.await.unwrap(), 5);
    /// # }
    /// ```
    pub fn map<R, F>(self, f: F) -> AsyncTask<R>
    where
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        transform(self, f)
    }

    /// Transform the successful result with a function that may itself fail.
    pub fn try_map<R, F>(self, f: F) -> AsyncTask<R>
    where
        R: Send + 'static,
        F: Fn(T) -> Result<R, Error> + Send + Sync + 'static,
    {
        AsyncTask::from_node(TryMap {
            source: self,
            f: Arc::new(f),
            _phantom: PhantomData,
        })
    }
}
