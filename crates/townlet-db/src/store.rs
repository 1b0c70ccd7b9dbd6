//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use native_db::*;
use std::path::Path;
use std::sync::LazyLock;
use townlet_core::{Player, PlayerId};

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models
        .define::<StoredPlayer>()
        .unwrap_or_else(|e| panic!("invalid StoredPlayer model: {}", e));
    models
});

/// Database store for player aggregates.
pub struct Store {
    pub(crate) db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Save a player.
    ///
    /// Fails with `Error::StaleWrite` if the stored copy has a higher
    /// version than `player`; the check and the write share a transaction.
    pub fn save_player(&self, id: PlayerId, player: &Player) -> Result<()> {
        let stored = StoredPlayer::from_player(id, player)?;
        let rw = self.db.rw_transaction()?;
        let existing: Option<StoredPlayer> = rw.get().primary(id.raw())?;
        if let Some(existing) = existing {
            if existing.version > stored.version {
                return Err(Error::StaleWrite {
                    player: id,
                    stored: existing.version,
                    attempted: stored.version,
                });
            }
        }
        rw.upsert(stored)?;
        rw.commit()?;
        tracing::trace!(
            target: "townlet::db",
            player = %id,
            version = player.version,
            "player saved"
        );
        Ok(())
    }

    /// Load a player by ID.
    pub fn load_player(&self, id: PlayerId) -> Result<Option<Player>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredPlayer> = r.get().primary(id.raw())?;
        stored.map(|s| s.to_player()).transpose()
    }

    /// Stored version of a player, if saved.
    pub fn player_version(&self, id: PlayerId) -> Result<Option<u64>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredPlayer> = r.get().primary(id.raw())?;
        Ok(stored.map(|s| s.version))
    }

    /// Delete a player.
    pub fn delete_player(&self, id: PlayerId) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredPlayer> = rw.get().primary(id.raw())?;
        if let Some(s) = stored {
            rw.remove(s)?;
        }
        rw.commit()?;
        Ok(())
    }

    /// Load all players.
    pub fn load_all_players(&self) -> Result<Vec<(PlayerId, Player)>> {
        self.all_stored()?
            .into_iter()
            .map(|s| Ok((s.player_id(), s.to_player()?)))
            .collect()
    }

    /// Clear all data.
    pub fn clear(&self) -> Result<()> {
        // Collect rows first, then delete in a separate transaction
        let rows = self.all_stored()?;

        let rw = self.db.rw_transaction()?;
        for row in rows {
            rw.remove(row)?;
        }
        rw.commit()?;
        Ok(())
    }

    pub(crate) fn all_stored(&self) -> Result<Vec<StoredPlayer>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredPlayer>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<StoredPlayer>, _> = iter.collect();
        rows.map_err(|e| Error::Database(e.to_string()))
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use townlet_core::{Action, Catalog, DefId, Engine, Timestamp};

    fn player(name: &str) -> Player {
        Player::new(name, Timestamp::from_secs(0), &Catalog::standard(), 11)
    }

    #[test]
    fn test_save_and_load_player() {
        let catalog = Catalog::standard();
        let engine = Engine::new(&catalog);
        let mut ada = Player::new("ada", Timestamp::from_secs(0), &catalog, 11);
        engine
            .apply(
                &mut ada,
                Action::Build {
                    kind: DefId::new("farm"),
                    x: 20,
                    y: 20,
                },
                Timestamp::from_secs(3),
            )
            .unwrap();

        let store = Store::in_memory().unwrap();
        let id = PlayerId::new(1);
        store.save_player(id, &ada).unwrap();

        let loaded = store.load_player(id).unwrap().unwrap();
        assert_eq!(loaded, ada);
        assert_eq!(store.player_version(id).unwrap(), Some(1));
        assert!(store.load_player(PlayerId::new(2)).unwrap().is_none());
    }

    #[test]
    fn test_stale_write_refused() {
        let store = Store::in_memory().unwrap();
        let id = PlayerId::new(7);
        let mut current = player("bo");
        current.version = 5;
        store.save_player(id, &current).unwrap();

        let mut stale = current.clone();
        stale.version = 4;
        stale.resources.set(townlet_core::ResourceKind::Coins, 99_999);
        let err = store.save_player(id, &stale).unwrap_err();
        assert!(matches!(
            err,
            Error::StaleWrite {
                stored: 5,
                attempted: 4,
                ..
            }
        ));
        assert_eq!(store.load_player(id).unwrap().unwrap(), current);

        // Re-saving the same version is allowed
        store.save_player(id, &current).unwrap();
    }

    #[test]
    fn test_delete_and_clear() {
        let store = Store::in_memory().unwrap();
        for raw in 1..=3 {
            store
                .save_player(PlayerId::new(raw), &player(&format!("p{}", raw)))
                .unwrap();
        }
        store.delete_player(PlayerId::new(2)).unwrap();
        let ids: Vec<_> = store
            .load_all_players()
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.raw())
            .collect();
        assert_eq!(ids, vec![1, 3]);

        store.clear().unwrap();
        assert!(store.load_all_players().unwrap().is_empty());
    }
}
