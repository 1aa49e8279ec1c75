use std::any::Any;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("operation failed: {0}")]
    Operation(#[source] BoxError),

    #[error("panicked: {0}")]
    Panicked(String),

    /// A sink went away without reporting. Also what a [`TaskHandle`] sees
    /// if its sending side is gone.
    ///
    /// [`TaskHandle`]: crate::runtime::TaskHandle
    #[error("result sink dropped without a result")]
    Abandoned,

    #[error("no tokio runtime available")]
    NoRuntime,

    #[error("runtime already initialized")]
    AlreadyInitialized,

    #[error("deserialization error: {0}")]
    Deserialize(String),
}

impl Error {
    /// Wraps a failure reported by an adapted operation.
    ///
    /// An `Error` passed back in is returned as-is rather than nested.
    pub fn operation<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        match error.into().downcast::<Error>() {
            Ok(error) => *error,
            Err(other) => Error::Operation(other),
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Error::Panicked(message)
    }

    /// Borrows the domain error carried by an `Operation` failure.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::Operation(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Error::Panicked(_))
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Error::Abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error, PartialEq)]
    #[error("storage full")]
    struct StorageFull;

    #[test]
    fn operation_keeps_domain_error_reachable() {
        let error = Error::operation(StorageFull);
        assert_eq!(error.downcast_ref::<StorageFull>(), Some(&StorageFull));
        assert_eq!(error.to_string(), "operation failed: storage full");
    }

    #[test]
    fn operation_does_not_nest_crate_errors() {
        let error = Error::operation(Error::NoRuntime);
        assert!(matches!(error, Error::NoRuntime));
    }

    #[test]
    fn operation_accepts_plain_messages() {
        let error = Error::operation("disk on fire");
        assert_eq!(error.to_string(), "operation failed: disk on fire");
        assert!(error.downcast_ref::<StorageFull>().is_none());
    }

    #[test]
    fn panic_payloads_become_messages() {
        let error = Error::from_panic(Box::new("boom"));
        assert!(matches!(&error, Error::Panicked(m) if m == "boom"));

        let error = Error::from_panic(Box::new(String::from("bang")));
        assert!(matches!(&error, Error::Panicked(m) if m == "bang"));

        let error = Error::from_panic(Box::new(7_u32));
        assert!(error.is_panic());
    }
}
