use std::sync::OnceLock;

use tokio::runtime::Handle;

use crate::runtime::error::Error;

// Fallback runtime for adapters started outside any tokio context
static GLOBAL_RUNTIME: OnceLock<RuntimeConfig> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Runtime that future and blocking adapters spawn onto when the
    /// starting thread is not inside a tokio context.
    pub runtime: Option<Handle>,
}

impl RuntimeConfig {
    pub fn with_runtime(handle: Handle) -> Self {
        Self {
            runtime: Some(handle),
        }
    }
}

/// Records the current tokio runtime as the process-wide fallback.
///
/// Must be called from inside a runtime; fails with [`Error::NoRuntime`]
/// otherwise.
pub fn init() -> Result<(), Error> {
    let handle = Handle::try_current().map_err(|_| Error::NoRuntime)?;
    init_with_config(RuntimeConfig::with_runtime(handle))
}

pub fn init_with_config(config: RuntimeConfig) -> Result<(), Error> {
    GLOBAL_RUNTIME
        .set(config)
        .map_err(|_| Error::AlreadyInitialized)?;
    tracing::debug!("global runtime configured");
    Ok(())
}

/// Runtime to spawn adapter work onto: the caller's tokio context first,
/// then the configured fallback.
pub fn runtime_handle() -> Option<Handle> {
    Handle::try_current().ok().or_else(|| {
        GLOBAL_RUNTIME
            .get()
            .and_then(|config| config.runtime.clone())
    })
}
