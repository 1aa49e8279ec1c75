//! Turning existing callback- and future-based operations into [`AsyncTask`]s.
//!
//! Every adapter stores only the recipe for the call. The wrapped operation
//! is invoked when the task is started, once per start.

use std::future::Future;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;

use crate::runtime::global::runtime_handle;
use crate::runtime::{AsyncTask, BoxError, Error, ResultSink, Start};

/// One of the two callbacks handed to an adapted operation.
pub type Callback<A> = Box<dyn FnOnce(A) + Send>;

/// Adapt an operation shaped `op(args.., on_success, on_failure)`.
///
/// Whichever callback fires first wins; a second call is logged and ignored.
/// If the operation drops both callbacks without calling either, the task
/// fails with [`Error::Abandoned`].
///
/// ```
/// use tasklink::adapter::{Callback, from_callbacks};
///
/// fn lookup(key: &str, on_ok: Callback<usize>, _on_err: Callback<std::io::Error>) {
///     on_ok(key.len());
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let task = from_callbacks(|on_ok, on_err| lookup("whiskers", on_ok, on_err));
/// assert_eq!(task.await.unwrap(), 8);
/// # }
/// ```
pub fn from_callbacks<V, E, Op>(operation: Op) -> AsyncTask<V>
where
    V: Send + 'static,
    E: Into<BoxError> + 'static,
    Op: Fn(Callback<V>, Callback<E>) + Send + Sync + 'static,
{
    AsyncTask::from_node(FromCallbacks {
        operation,
        _phantom: PhantomData,
    })
}

pub struct FromCallbacks<Op, V, E> {
    operation: Op,
    _phantom: PhantomData<fn(V, E)>,
}

impl<Op, V, E> Start<V> for FromCallbacks<Op, V, E>
where
    V: Send + 'static,
    E: Into<BoxError> + 'static,
    Op: Fn(Callback<V>, Callback<E>) + Send + Sync + 'static,
{
    fn start(&self, sink: ResultSink<V>) {
        let (sink, downstream) = sink.shield();
        let slot = Arc::new(Mutex::new(Some(sink)));

        let on_success = {
            let slot = Arc::clone(&slot);
            Box::new(move |value: V| match take(&slot) {
                Some(sink) => sink.succeed(value),
                None => tracing::warn!("success callback fired after the operation reported"),
            }) as Callback<V>
        };
        let on_failure = {
            let slot = Arc::clone(&slot);
            Box::new(move |error: E| match take(&slot) {
                Some(sink) => sink.fail(Error::operation(error)),
                None => tracing::warn!("failure callback fired after the operation reported"),
            }) as Callback<E>
        };

        tracing::trace!("invoking adapted operation");
        let invoked = catch_unwind(AssertUnwindSafe(|| {
            (self.operation)(on_success, on_failure)
        }));
        if let Err(payload) = invoked {
            let error = Error::from_panic(payload);
            tracing::error!(%error, "adapted operation panicked");
            if let Some(sink) = take(&slot) {
                sink.fail(error);
            }
        }
        drop(slot);
        downstream.release();
    }
}

fn take<V>(slot: &Mutex<Option<ResultSink<V>>>) -> Option<ResultSink<V>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// Adapt an async operation: each start calls `make` and spawns the future.
///
/// The future runs on the caller's tokio runtime, or on the one registered
/// through [`init`](crate::runtime::init). Without either the task fails
/// with [`Error::NoRuntime`].
pub fn from_future<V, Fut, Make>(make: Make) -> AsyncTask<V>
where
    V: Send + 'static,
    Fut: Future<Output = Result<V, Error>> + Send + 'static,
    Make: Fn() -> Fut + Send + Sync + 'static,
{
    AsyncTask::new(move |sink: ResultSink<V>| {
        let Some(runtime) = runtime_handle() else {
            sink.fail(Error::NoRuntime);
            return;
        };
        let future = make();
        runtime.spawn(async move {
            let result = AssertUnwindSafe(future)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(Error::from_panic(payload)));
            sink.complete(result);
        });
    })
}

/// Adapt a blocking call by running it on the runtime's blocking pool.
pub fn blocking<V, F>(f: F) -> AsyncTask<V>
where
    V: Send + 'static,
    F: Fn() -> Result<V, Error> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    AsyncTask::new(move |sink: ResultSink<V>| {
        let Some(runtime) = runtime_handle() else {
            sink.fail(Error::NoRuntime);
            return;
        };
        let f = Arc::clone(&f);
        runtime.spawn_blocking(move || {
            let result = catch_unwind(AssertUnwindSafe(|| f()))
                .unwrap_or_else(|payload| Err(Error::from_panic(payload)));
            sink.complete(result);
        });
    })
}
