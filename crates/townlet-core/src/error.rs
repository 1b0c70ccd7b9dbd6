//! Error types for townlet-core
//!
//! Every variant is a validation failure: the action was rejected and the
//! player aggregate was left untouched.

use crate::resource::ResourceBundle;
use crate::zone::Direction;
use crate::{DefId, QuestId};
use thiserror::Error;

/// Rejection reasons for player actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown building type: {0}")]
    UnknownBuildingType(DefId),

    #[error("Player level {current} is below the required level {required}")]
    LevelTooLow { required: u32, current: u32 },

    #[error("Tile ({x}, {y}) is not unlocked")]
    TileLocked { x: i32, y: i32 },

    #[error("Tile ({x}, {y}) is already occupied")]
    TileOccupied { x: i32, y: i32 },

    #[error("Not enough energy: need {required}, have {available}")]
    InsufficientEnergy { required: u64, available: u64 },

    #[error("Not enough resources: missing {missing}")]
    InsufficientResources { missing: ResourceBundle },

    #[error("Building not found at index {0}")]
    BuildingNotFound(usize),

    #[error("Building is already at max level {max_level}")]
    MaxLevelReached { max_level: u32 },

    #[error("Production not ready: {remaining_secs}s remaining")]
    NotReady { remaining_secs: u64 },

    #[error("Building does not need collecting")]
    NotCollectible,

    #[error("Quest not found: {0}")]
    QuestNotFound(QuestId),

    #[error("Quest incomplete: {progress}/{count}")]
    QuestIncomplete { progress: u64, count: u64 },

    #[error("No zone available to the {0}")]
    ZoneUnavailable(Direction),

    #[error("Not enough coins: need {required}, have {available}")]
    InsufficientCoins { required: u64, available: u64 },
}

impl Error {
    /// Short machine-readable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnknownBuildingType(_) => "unknown_building_type",
            Error::LevelTooLow { .. } => "level_too_low",
            Error::TileLocked { .. } => "tile_locked",
            Error::TileOccupied { .. } => "tile_occupied",
            Error::InsufficientEnergy { .. } => "insufficient_energy",
            Error::InsufficientResources { .. } => "insufficient_resources",
            Error::BuildingNotFound(_) => "building_not_found",
            Error::MaxLevelReached { .. } => "max_level_reached",
            Error::NotReady { .. } => "not_ready",
            Error::NotCollectible => "not_collectible",
            Error::QuestNotFound(_) => "quest_not_found",
            Error::QuestIncomplete { .. } => "quest_incomplete",
            Error::ZoneUnavailable(_) => "zone_unavailable",
            Error::InsufficientCoins { .. } => "insufficient_coins",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
