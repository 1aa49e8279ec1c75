//! Lazy, composable single-result async tasks over callback-style operations.
//!
//! An [`AsyncTask<T>`] describes a computation that eventually reports one
//! value or one [`Error`] to a [`ResultSink<T>`]. Building a task never runs
//! anything; [`AsyncTask::start`] does, and every start is a fresh run.
//!
//! - [`adapter`] turns `op(args.., on_success, on_failure)` APIs and futures
//!   into tasks.
//! - [`combinators`] chain tasks: [`AsyncTask::map`] transforms a result,
//!   [`AsyncTask::and_then`] sequences a dependent task.
//! - [`runtime`] holds the core types plus the bridge back to `async`
//!   ([`TaskHandle`]) and the process-wide runtime fallback.
//!
//! ```
//! use tasklink::adapter::{Callback, from_callbacks};
//!
//! fn query_items(on_ok: Callback<Vec<String>>, _on_err: Callback<std::io::Error>) {
//!     on_ok(vec!["a".into(), "c".into(), "b".into()]);
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let newest = from_callbacks(query_items).map(|items| items.into_iter().max());
//! assert_eq!(newest.await.unwrap().as_deref(), Some("c"));
//! # }
//! ```

pub mod adapter;
pub mod combinators;
pub mod runtime;

pub use runtime::{AsyncTask, Error, ResultSink, TaskHandle};
