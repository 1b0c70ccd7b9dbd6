//! Error types for townlet-script

use thiserror::Error;

/// Content loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(String),

    #[error("{referenced_by} references unknown building type {building}")]
    UnknownBuilding {
        referenced_by: String,
        building: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
