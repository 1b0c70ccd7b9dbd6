//! Error types for townlet-hub
//!
//! Rejections come from the engine and are the player's fault; everything
//! else is a server-side failure.

use thiserror::Error;

/// Result type for townlet-hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in townlet-hub
#[derive(Debug, Error)]
pub enum Error {
    /// The engine refused the action
    #[error("action rejected: {0}")]
    Rejected(#[from] townlet_core::Error),

    /// Persistence failed
    #[error("store error: {0}")]
    Store(#[from] townlet_db::Error),

    /// Configuration could not be parsed
    #[error("config error: {0}")]
    Config(#[from] ron::error::SpannedError),
}

impl Error {
    /// Whether this is a validation failure to report back to the player
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Rejected(_))
    }

    /// The engine's reason, if the action was rejected
    pub fn rejection(&self) -> Option<&townlet_core::Error> {
        match self {
            Error::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
// This function is never called but will fail to compile if the bound is not satisfied.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
