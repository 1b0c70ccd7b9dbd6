//! Offline catch-up
//!
//! When a player returns, production that happened while they were away is
//! credited in one lump. Elapsed time is capped, and each building pays out
//! at most as many cycles as a manual collect would.
//!
//! Catch-up does not touch `last_collected`, so the same cycles can still be
//! collected manually afterwards.

use crate::catalog::Catalog;
use crate::economy;
use crate::player::Building;
use crate::resource::ResourceBundle;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Production credited for time spent offline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchUp {
    /// Real seconds since the player was last online
    pub elapsed_secs: u64,
    /// Seconds actually credited after the cap
    pub credited_secs: u64,
    /// Number of buildings that produced
    pub buildings: usize,
    pub reward: ResourceBundle,
}

impl CatchUp {
    /// Whether anything was produced
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }
}

/// Compute what `buildings` produced between `last_online` and `now`
pub fn catch_up(
    catalog: &Catalog,
    buildings: &[Building],
    last_online: Timestamp,
    now: Timestamp,
) -> CatchUp {
    let rules = &catalog.rules;
    let elapsed_secs = now.elapsed_since(last_online);
    let credited_secs = elapsed_secs.min(rules.offline_cap_secs);

    let mut result = CatchUp {
        elapsed_secs,
        credited_secs,
        ..CatchUp::default()
    };
    for building in buildings {
        let Some(def) = catalog.building(&building.kind) else {
            continue;
        };
        let cycle = economy::production_time(def, building.level);
        let cycles = economy::cycles(credited_secs, cycle, rules.collect_cycle_cap);
        if cycles == 0 {
            continue;
        }
        result
            .reward
            .merge(&economy::output(def, building.level).scaled(cycles));
        result.buildings += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;
    use crate::{BuildingId, DefId};

    fn building(kind: &str, level: u32) -> Building {
        Building {
            id: BuildingId::new(1),
            kind: DefId::new(kind),
            level,
            x: 20,
            y: 20,
            last_collected: Timestamp::from_secs(0),
            producing: true,
        }
    }

    #[test]
    fn test_catch_up_counts_whole_cycles() {
        let catalog = Catalog::standard();
        let buildings = vec![building("farm", 1), building("lumber_mill", 1), building("house", 3)];
        let result = catch_up(
            &catalog,
            &buildings,
            Timestamp::from_secs(0),
            Timestamp::from_secs(200),
        );
        assert_eq!(result.credited_secs, 200);
        // farm: 3 cycles of 10 food; mill: 2 cycles of 8 materials; house passive
        assert_eq!(result.reward.get(ResourceKind::Food), 30);
        assert_eq!(result.reward.get(ResourceKind::Materials), 16);
        assert_eq!(result.buildings, 2);
    }

    #[test]
    fn test_catch_up_caps() {
        let catalog = Catalog::standard();
        let buildings = vec![building("crystal_mine", 1), building("farm", 1)];
        let day = 24 * 60 * 60;
        let result = catch_up(
            &catalog,
            &buildings,
            Timestamp::from_secs(0),
            Timestamp::from_secs(day),
        );
        assert_eq!(result.elapsed_secs, day as u64);
        assert_eq!(result.credited_secs, 28_800);
        // 28800 / 600 = 48 cycles, capped at 10
        assert_eq!(result.reward.get(ResourceKind::Crystals), 10);
        assert_eq!(result.reward.get(ResourceKind::Food), 100);
    }

    #[test]
    fn test_catch_up_nothing_elapsed() {
        let catalog = Catalog::standard();
        let buildings = vec![building("farm", 1)];
        let result = catch_up(
            &catalog,
            &buildings,
            Timestamp::from_secs(100),
            Timestamp::from_secs(50),
        );
        assert_eq!(result.elapsed_secs, 0);
        assert!(result.is_empty());
    }
}
