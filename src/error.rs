use std::io;

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by network construction, computation and persistence.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied argument does not fit the network's shape
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The underlying reader or writer failed
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A stream did not decode to a valid network
    #[error("corrupt network data: {0}")]
    Corrupt(String),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Error::Corrupt(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Io => Error::Io(err.into()),
            _ => Error::Corrupt(err.to_string()),
        }
    }
}
