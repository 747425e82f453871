use thiserror::Error;

/// Errors reported by a driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The driver does not implement this introspection capability.
    #[error("Operation not supported by the driver: {operation}")]
    Unsupported { operation: &'static str },
    /// The session could not be established or was lost.
    #[error("Connection error: {0}")]
    Connection(String),
    /// A statement failed.
    #[error("Query error: {0}")]
    Query(String),
    /// A statement did not complete in time.
    #[error("Statement timed out")]
    Timeout,
}

impl DriverError {
    /// Returns whether the error means the session itself is unusable.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, DriverError::Connection(_) | DriverError::Timeout)
    }
}

/// Driver Result type
pub type DriverResult<T> = Result<T, DriverError>;
