//! Common query patterns for the database.

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::Store;
use townlet_core::{Player, PlayerId};

impl Store {
    /// Get all players with a specific display name.
    pub fn players_by_name(&self, name: &str) -> Result<Vec<(PlayerId, Player)>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredPlayer>(StoredPlayerKey::name)?;
        let iter = scan.start_with(name)?;
        let rows: std::result::Result<Vec<StoredPlayer>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter()
            // start_with is a prefix match
            .filter(|s| s.name == name)
            .map(|s| Ok((s.player_id(), s.to_player()?)))
            .collect()
    }

    /// Count stored players.
    pub fn count_players(&self) -> Result<usize> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredPlayer>()?;
        let iter = scan.all()?;
        Ok(iter.count())
    }

    /// IDs of every stored player.
    pub fn player_ids(&self) -> Result<Vec<PlayerId>> {
        Ok(self.all_stored()?.iter().map(StoredPlayer::player_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use townlet_core::{Catalog, Timestamp};

    #[test]
    fn test_players_by_name() {
        let catalog = Catalog::standard();
        let store = Store::in_memory().unwrap();
        for (raw, name) in [(1, "ada"), (2, "adam"), (3, "ada")] {
            let player = Player::new(name, Timestamp::from_secs(0), &catalog, raw);
            store.save_player(PlayerId::new(raw), &player).unwrap();
        }

        let found: Vec<_> = store
            .players_by_name("ada")
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.raw())
            .collect();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&1) && found.contains(&3));
        assert_eq!(store.count_players().unwrap(), 3);
        assert_eq!(store.player_ids().unwrap().len(), 3);
    }
}
