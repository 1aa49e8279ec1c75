//! Building new tasks out of existing ones.
//!
//! Every combinator here only builds a graph node; nothing runs until the
//! outermost task is started. Failures from upstream skip the caller's
//! function and reach the downstream sink unchanged.

mod chain;
mod deliver;
mod map;

pub use chain::{Chain, chain};
pub use deliver::DeliverOn;
pub use map::{Map, TryMap, transform};

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::runtime::Error;

// Runs caller-supplied logic, turning a panic into a reportable failure.
fn guarded<R>(f: impl FnOnce() -> R) -> Result<R, Error> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let error = Error::from_panic(payload);
        tracing::error!(%error, "caller function panicked");
        error
    })
}
