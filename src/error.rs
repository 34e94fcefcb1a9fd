use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),

    #[error("Driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Possible SQL injection detected in {0}")]
    Injection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Conflicting query arguments: {0}")]
    Conflict(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Error in dynamic call to {method}: {source}")]
    DynamicDispatch {
        method: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion { expected: &'static str, actual: String },

    #[error("Unexpected null value for non-nullable field")]
    UnexpectedNull,

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wraps a failure that surfaced while resolving or running a dynamic
    /// method, preserving the original error as the source.
    pub fn dynamic_dispatch(method: impl Into<String>, source: Error) -> Self {
        Error::DynamicDispatch { method: method.into(), source: Box::new(source) }
    }
}
