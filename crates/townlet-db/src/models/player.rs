//! Player models for database storage.

use crate::error::Result;
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use townlet_core::{Player, PlayerId};

/// Stored player aggregate in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredPlayer {
    /// Primary key - player ID.
    #[primary_key]
    pub id: u64,
    /// Display name.
    #[secondary_key]
    pub name: String,
    /// Aggregate version at the time of the save.
    pub version: u64,
    /// Serialized player.
    pub data: Vec<u8>,
}

impl StoredPlayer {
    /// Create from a player aggregate.
    pub fn from_player(id: PlayerId, player: &Player) -> Result<Self> {
        Ok(Self {
            id: id.raw(),
            name: player.name.clone(),
            version: player.version,
            data: bincode::serialize(player)?,
        })
    }

    /// Convert to a player aggregate.
    pub fn to_player(&self) -> Result<Player> {
        Ok(bincode::deserialize(&self.data)?)
    }

    /// The player ID this row belongs to.
    pub fn player_id(&self) -> PlayerId {
        PlayerId::new(self.id)
    }
}
