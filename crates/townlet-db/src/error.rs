//! Error types for database operations.

use thiserror::Error;
use townlet_core::PlayerId;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Native DB error.
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A newer version of the player is already stored.
    #[error("Stale write for {player}: stored version {stored}, attempted {attempted}")]
    StaleWrite {
        player: PlayerId,
        stored: u64,
        attempted: u64,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;
