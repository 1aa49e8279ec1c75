pub mod codec;
pub mod error;
pub mod global;
pub mod handle;
pub mod sink;
pub mod task;

pub use error::{BoxError, Error};
pub use global::{RuntimeConfig, init, init_with_config};
pub use handle::TaskHandle;
pub use sink::ResultSink;
pub use task::{AsyncTask, Start};
