//! Error types for the test command

use thiserror::Error;

/// The engine could not turn an identifier into a suite
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct LoadError(pub String);

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Fatal errors; per-test failures are counted outcomes, never errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("{component} is required to run the tests: {reason}")]
    DependencyMissing { component: String, reason: String },

    #[error("Invalid test argument name: {0}")]
    ImportFailure(#[from] LoadError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
