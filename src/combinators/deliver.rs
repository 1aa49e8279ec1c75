use tokio::runtime::Handle;

use crate::runtime::{AsyncTask, Error, ResultSink, Start};

/// Delivers the wrapped task's outcome from a task spawned on a chosen runtime.
///
/// The upstream work still runs wherever it runs; only the downstream sink
/// call is moved.
pub struct DeliverOn<T> {
    source: AsyncTask<T>,
    runtime: Handle,
}

impl<T> Start<T> for DeliverOn<T>
where
    T: Send + 'static,
{
    fn start(&self, sink: ResultSink<T>) {
        let runtime = self.runtime.clone();
        self.source.start(ResultSink::new(move |result: Result<T, Error>| {
            tracing::trace!("redispatching result onto runtime");
            runtime.spawn(async move {
                sink.complete(result);
            });
        }));
    }
}

impl<T> AsyncTask<T>
where
    T: Send + 'static,
{
    /// Report this task's outcome from inside `runtime`.
    pub fn deliver_on(self, runtime: Handle) -> AsyncTask<T> {
        AsyncTask::from_node(DeliverOn {
            source: self,
            runtime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn outcome_arrives_on_the_runtime() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("delivery")
            .enable_all()
            .build()
            .unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        let task = AsyncTask::ready(7_u8).deliver_on(rt.handle().clone());
        task.start(ResultSink::new(move |result: Result<u8, Error>| {
            let name = thread::current().name().map(str::to_string);
            tx.send((result.ok(), name)).unwrap();
        }));

        let (value, thread_name) = rx.recv().unwrap();
        assert_eq!(value, Some(7));
        assert_eq!(thread_name.as_deref(), Some("delivery"));
    }
}
