//! Errors.

use thiserror::Error;

/// Errors raised by the component core.
///
/// None of these are transient: each one means the tree was assembled incorrectly or an
/// invariant was broken, so the current request cycle should be aborted.
#[derive(Debug, Error)]
pub enum Error {
    /// An invalid argument, such as a malformed name or a negative page index.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// An illegal structural edit, such as adding a node that already has a parent.
    #[error("invalid structure: {0}")]
    Structure(String),

    /// An operation that is not allowed in the current state, such as editing a locked node
    /// without a session.
    #[error("invalid state: {0}")]
    State(String),

    /// A broken invariant discovered while walking the tree or coercing a value.
    #[error("system error: {0}")]
    System(String),

    /// Malformed configuration.
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Error::Argument(message.into())
    }

    pub(crate) fn structure(message: impl Into<String>) -> Self {
        Error::Structure(message.into())
    }

    pub(crate) fn state(message: impl Into<String>) -> Self {
        Error::State(message.into())
    }

    pub(crate) fn system(message: impl Into<String>) -> Self {
        Error::System(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
