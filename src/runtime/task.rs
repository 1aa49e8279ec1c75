use std::fmt;
use std::future::IntoFuture;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::runtime::error::Error;
use crate::runtime::handle::TaskHandle;
use crate::runtime::sink::ResultSink;

/// One node of a task graph: given a sink, begin the work.
///
/// Implementations must not do anything at construction time and must be
/// restartable; every call to `start` is an independent execution.
pub trait Start<T>: Send + Sync + 'static {
    fn start(&self, sink: ResultSink<T>);
}

/// A lazy, restartable single-result computation.
///
/// Nothing runs until [`start`](AsyncTask::start) is called, and each call
/// re-runs the whole graph. Cloning is cheap and shares the graph.
pub struct AsyncTask<T> {
    node: Arc<dyn Start<T>>,
}

impl<T> Clone for AsyncTask<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<T> fmt::Debug for AsyncTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTask")
            .field("output_type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> AsyncTask<T>
where
    T: Send + 'static,
{
    pub fn from_node<S>(node: S) -> Self
    where
        S: Start<T>,
    {
        Self {
            node: Arc::new(node),
        }
    }

    /// Wraps a raw start procedure.
    ///
    /// A panic inside `start` is caught and logged; the sink it was holding
    /// reports the failure as it unwinds. A panic raised by the downstream
    /// sink itself is not caught and propagates out of [`AsyncTask::start`].
    pub fn new<F>(start: F) -> Self
    where
        F: Fn(ResultSink<T>) + Send + Sync + 'static,
    {
        Self::from_node(FromFn(start))
    }

    /// Succeeds with a clone of `value` on every start.
    pub fn ready(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(move |sink| sink.succeed(value.clone()))
    }

    /// Fails on every start with the error built by `make_error`.
    pub fn failed<F>(make_error: F) -> Self
    where
        F: Fn() -> Error + Send + Sync + 'static,
    {
        Self::new(move |sink| sink.fail(make_error()))
    }

    pub fn start(&self, sink: ResultSink<T>) {
        self.node.start(sink);
    }

    /// Starts one execution and returns a future for its outcome.
    pub fn run(&self) -> TaskHandle<T> {
        let id = Uuid::new_v4();
        let (sender, receiver) = oneshot::channel();
        tracing::trace!(task_id = %id, "running task");
        self.start(ResultSink::from(sender));
        TaskHandle::new(id, receiver)
    }

    /// Traces every start of this task inside a span carrying `name`.
    pub fn named(self, name: impl Into<String>) -> Self {
        Self::from_node(Named {
            name: Arc::from(name.into()),
            inner: self,
        })
    }
}

impl<T> IntoFuture for AsyncTask<T>
where
    T: Send + 'static,
{
    type Output = Result<T, Error>;
    type IntoFuture = TaskHandle<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.run()
    }
}

struct FromFn<F>(F);

impl<T, F> Start<T> for FromFn<F>
where
    T: Send + 'static,
    F: Fn(ResultSink<T>) + Send + Sync + 'static,
{
    fn start(&self, sink: ResultSink<T>) {
        tracing::trace!("starting leaf task");
        let (sink, downstream) = sink.shield();
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| (self.0)(sink))) {
            let error = Error::from_panic(payload);
            tracing::error!(%error, "start procedure panicked");
        }
        // a panic from the sinks we reported into belongs to the caller
        downstream.release();
    }
}

struct Named<T> {
    name: Arc<str>,
    inner: AsyncTask<T>,
}

impl<T> Start<T> for Named<T>
where
    T: Send + 'static,
{
    fn start(&self, sink: ResultSink<T>) {
        let span = tracing::debug_span!("task", name = %self.name, run = %Uuid::new_v4());
        let _entered = span.enter();
        tracing::debug!("started");

        let done = span.clone();
        self.inner.start(ResultSink::new(move |result: Result<T, Error>| {
            done.in_scope(|| match &result {
                Ok(_) => tracing::debug!("succeeded"),
                Err(error) => tracing::debug!(%error, "failed"),
            });
            sink.complete(result);
        }));
    }
}
