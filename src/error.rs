//! Error types for the hill climber.

use thiserror::Error;

/// Errors returned by [`HillClimber`](crate::hc::HillClimber) and its helpers.
///
/// A call that returns an error leaves the optimizer state untouched.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing input to a mutating or validating call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A name-keyed lookup referenced a target that does not exist.
    #[error("target '{0}' not found")]
    NotFound(String),

    /// Serializing or writing the iteration history failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
