//! PlayerStore trait - The persistence seam of the hub
//!
//! The hub only talks to this trait. `townlet_db::Store` is the durable
//! implementation; `MemoryStore` keeps everything in a map for tests and
//! demos.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use townlet_core::{Player, PlayerId};

/// Load/save access to player aggregates
///
/// Implementations must refuse a save whose `Player::version` is older than
/// the stored copy.
pub trait PlayerStore: Send + Sync {
    /// Load a player, `None` if never saved
    fn load(&self, id: PlayerId) -> Result<Option<Player>>;

    /// Save a player, replacing any older version
    fn save(&self, id: PlayerId, player: &Player) -> Result<()>;

    /// Remove a player
    fn delete(&self, id: PlayerId) -> Result<()>;
}

impl PlayerStore for townlet_db::Store {
    fn load(&self, id: PlayerId) -> Result<Option<Player>> {
        Ok(self.load_player(id)?)
    }

    fn save(&self, id: PlayerId, player: &Player) -> Result<()> {
        Ok(self.save_player(id, player)?)
    }

    fn delete(&self, id: PlayerId) -> Result<()> {
        Ok(self.delete_player(id)?)
    }
}

/// In-memory player store
#[derive(Debug, Default)]
pub struct MemoryStore {
    players: Mutex<HashMap<PlayerId, Player>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored players
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PlayerId, Player>> {
        self.players.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PlayerStore for MemoryStore {
    fn load(&self, id: PlayerId) -> Result<Option<Player>> {
        Ok(self.lock().get(&id).cloned())
    }

    fn save(&self, id: PlayerId, player: &Player) -> Result<()> {
        let mut players = self.lock();
        if let Some(existing) = players.get(&id) {
            if existing.version > player.version {
                return Err(townlet_db::Error::StaleWrite {
                    player: id,
                    stored: existing.version,
                    attempted: player.version,
                }
                .into());
            }
        }
        players.insert(id, player.clone());
        Ok(())
    }

    fn delete(&self, id: PlayerId) -> Result<()> {
        self.lock().remove(&id);
        Ok(())
    }
}
