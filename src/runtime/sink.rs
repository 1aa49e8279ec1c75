use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use tokio::sync::oneshot;

use crate::runtime::error::Error;

type Completion<T> = Box<dyn FnOnce(Result<T, Error>) + Send>;

/// Two-channel completion target handed to [`AsyncTask::start`].
///
/// Every reporting method consumes the sink, so a sink can fire at most once.
/// A sink dropped without firing reports [`Error::Abandoned`] (or
/// [`Error::Panicked`] while unwinding), so whoever holds the far end always
/// hears back exactly once.
///
/// [`AsyncTask::start`]: crate::runtime::AsyncTask::start
pub struct ResultSink<T> {
    completion: Option<Completion<T>>,
}

impl<T> ResultSink<T>
where
    T: Send + 'static,
{
    pub fn new<F>(completion: F) -> Self
    where
        F: FnOnce(Result<T, Error>) + Send + 'static,
    {
        Self {
            completion: Some(Box::new(completion)),
        }
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn fail(self, error: Error) {
        self.complete(Err(error));
    }

    pub fn complete(mut self, result: Result<T, Error>) {
        if let Some(completion) = self.completion.take() {
            tracing::trace!(ok = result.is_ok(), "result sink fired");
            completion(result);
        }
    }
}

impl<T> ResultSink<T>
where
    T: Send + 'static,
{
    /// Splits off downstream panics raised while a leaf is still inside its
    /// own start procedure.
    ///
    /// A leaf that catches panics from caller code would otherwise also catch
    /// a panic from the sinks it reports into synchronously. The returned
    /// sink holds such a panic back, and [`Shield::release`] re-raises it once
    /// the leaf is done. Reports from other threads, or after release, are
    /// not intercepted.
    pub(crate) fn shield(self) -> (ResultSink<T>, Shield) {
        let state = Arc::new(ShieldState {
            owner: thread::current().id(),
            active: AtomicBool::new(true),
            payload: Mutex::new(None),
        });

        let shared = Arc::clone(&state);
        let sink = ResultSink::new(move |result: Result<T, Error>| {
            if !shared.intercepts() {
                self.complete(result);
                return;
            }
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| self.complete(result))) {
                *shared.payload.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload);
            }
        });
        (sink, Shield { state })
    }
}

struct ShieldState {
    owner: ThreadId,
    active: AtomicBool,
    payload: Mutex<Option<Box<dyn Any + Send>>>,
}

impl ShieldState {
    fn intercepts(&self) -> bool {
        self.active.load(Ordering::SeqCst) && thread::current().id() == self.owner
    }
}

/// Re-raises a downstream panic held back by [`ResultSink::shield`].
pub(crate) struct Shield {
    state: Arc<ShieldState>,
}

impl Shield {
    pub(crate) fn release(self) {
        self.state.active.store(false, Ordering::SeqCst);
        let payload = self
            .state
            .payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(payload) = payload {
            resume_unwind(payload);
        }
    }
}

impl<T> From<oneshot::Sender<Result<T, Error>>> for ResultSink<T>
where
    T: Send + 'static,
{
    fn from(sender: oneshot::Sender<Result<T, Error>>) -> Self {
        ResultSink::new(move |result| {
            // receiver gone means nobody is waiting any more
            let _ = sender.send(result);
        })
    }
}

impl<T> Drop for ResultSink<T> {
    fn drop(&mut self) {
        if let Some(completion) = self.completion.take() {
            let error = if std::thread::panicking() {
                Error::Panicked("start procedure panicked before reporting".to_string())
            } else {
                Error::Abandoned
            };
            tracing::warn!(%error, "result sink dropped without firing");
            completion(Err(error));
        }
    }
}

impl<T> fmt::Debug for ResultSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSink")
            .field("fired", &self.completion.is_none())
            .field("value_type", &std::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording<T: Send + 'static>() -> (ResultSink<T>, Arc<Mutex<Vec<Result<T, Error>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let sink = ResultSink::new(move |result| log.lock().unwrap().push(result));
        (sink, seen)
    }

    #[test]
    fn succeed_reports_the_value_once() {
        let (sink, seen) = recording::<u32>();
        sink.succeed(3);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(matches!(seen[0], Ok(3)));
    }

    #[test]
    fn fail_reports_the_error() {
        let (sink, seen) = recording::<u32>();
        sink.fail(Error::NoRuntime);

        let seen = seen.lock().unwrap();
        assert!(matches!(seen.as_slice(), [Err(Error::NoRuntime)]));
    }

    #[test]
    fn dropping_an_unfired_sink_reports_abandoned() {
        let (sink, seen) = recording::<u32>();
        drop(sink);

        let seen = seen.lock().unwrap();
        assert!(matches!(seen.as_slice(), [Err(Error::Abandoned)]));
    }

    #[tokio::test]
    async fn oneshot_sender_converts_into_a_sink() {
        let (tx, rx) = oneshot::channel();
        let sink: ResultSink<&str> = tx.into();
        sink.succeed("done");

        assert!(matches!(rx.await, Ok(Ok("done"))));
    }

    #[test]
    fn shield_rethrows_a_synchronous_downstream_panic() {
        let sink = ResultSink::new(|_: Result<u8, Error>| panic!("downstream assertion"));
        let (sink, shield) = sink.shield();
        sink.succeed(1);

        let payload = catch_unwind(AssertUnwindSafe(|| shield.release())).unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"downstream assertion"));
    }

    #[test]
    fn shield_passes_results_through() {
        let (sink, seen) = recording::<u8>();
        let (sink, shield) = sink.shield();
        sink.succeed(4);
        shield.release();

        assert!(matches!(seen.lock().unwrap().as_slice(), [Ok(4)]));
    }

    #[test]
    fn shield_leaves_reports_after_release_alone() {
        let (sink, seen) = recording::<u8>();
        let (sink, shield) = sink.shield();
        shield.release();
        sink.succeed(6);

        assert!(matches!(seen.lock().unwrap().as_slice(), [Ok(6)]));
    }
}
