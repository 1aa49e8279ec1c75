use std::sync::Arc;

use crate::combinators::guarded;
use crate::runtime::{AsyncTask, Error, ResultSink, Start};

/// Run the first task, then feed its result to a function producing the next.
///
/// The downstream sink is handed straight to the produced task, so its
/// outcome is forwarded unmodified.
pub fn chain<T, R, F>(source: AsyncTask<T>, f: F) -> AsyncTask<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> AsyncTask<R> + Send + Sync + 'static,
{
    AsyncTask::from_node(Chain {
        source,
        f: Arc::new(f),
    })
}

/// Sequences a dependent task after a successful result.
///
/// Created via [`chain`] or [`AsyncTask::and_then`]. The second task only
/// exists once the first has succeeded.
pub struct Chain<T, F> {
    source: AsyncTask<T>,
    f: Arc<F>,
}

impl<T, R, F> Start<R> for Chain<T, F>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> AsyncTask<R> + Send + Sync + 'static,
{
    fn start(&self, sink: ResultSink<R>) {
        let f = Arc::clone(&self.f);
        self.source
            .start(ResultSink::new(move |result: Result<T, Error>| match result {
                Ok(value) => match guarded(|| f(value)) {
                    Ok(next) => next.start(sink),
                    Err(error) => sink.fail(error),
                },
                Err(error) => {
                    tracing::debug!(%error, "chain skipped: upstream failed");
                    sink.fail(error);
                }
            }));
    }
}

impl<T> AsyncTask<T>
where
    T: Send + 'static,
{
    /// Continue with the task produced from this task's result.
    ///
    /// ```
    /// use tasklink::AsyncTask;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let total = AsyncTask::ready(2_u32).and_then(|x| AsyncTask::ready(x * 10));
    /// assert_eq!(total.await.unwrap(), 20);
    /// # }
    /// ```
    pub fn and_then<R, F>(self, f: F) -> AsyncTask<R>
    where
        R: Send + 'static,
        F: Fn(T) -> AsyncTask<R> + Send + Sync + 'static,
    {
        chain(self, f)
    }
}
