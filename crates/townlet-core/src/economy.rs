//! Economy calculator
//!
//! Stateless functions that derive costs, outputs and capacity totals from
//! catalog definitions and a player's buildings. All scaling goes through
//! `crate::formula`.

use crate::catalog::{BuildingTypeDef, Catalog};
use crate::formula::{income_at, production_time_at, upgrade_cost_at};
use crate::player::Building;
use crate::resource::{ResourceBundle, ResourceKind};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Cost to construct a building at level 1
pub fn build_cost(def: &BuildingTypeDef) -> ResourceBundle {
    def.cost.clone()
}

/// Cost to raise a building from `level` to `level + 1`
pub fn upgrade_cost(def: &BuildingTypeDef, level: u32) -> ResourceBundle {
    def.cost.map(|_, base| upgrade_cost_at(base, level))
}

/// Output of one production cycle at `level`
pub fn output(def: &BuildingTypeDef, level: u32) -> ResourceBundle {
    def.output.map(|_, base| income_at(base, level))
}

/// Production cycle length at `level` (0 for passive buildings)
pub fn production_time(def: &BuildingTypeDef, level: u32) -> u64 {
    if def.is_passive() {
        0
    } else {
        production_time_at(def.production_time, level)
    }
}

/// Seconds until a building can be collected
///
/// `None` for passive buildings, `Some(0)` when it is ready now.
pub fn ready_in(def: &BuildingTypeDef, building: &Building, now: Timestamp) -> Option<u64> {
    let cycle = production_time(def, building.level);
    if cycle == 0 {
        return None;
    }
    let elapsed = now.elapsed_since(building.last_collected);
    Some(cycle.saturating_sub(elapsed))
}

/// Whole production cycles completed in `elapsed` seconds, capped
pub fn cycles(elapsed: u64, cycle: u64, cap: u64) -> u64 {
    if cycle == 0 {
        0
    } else {
        (elapsed / cycle).min(cap)
    }
}

/// Everything `resources` lacks to cover `cost`
///
/// Empty when the cost is affordable.
pub fn shortfall(resources: &ResourceBundle, cost: &ResourceBundle) -> ResourceBundle {
    cost.map(|kind, amount| amount.saturating_sub(resources.get(kind)))
}

/// Whether every resource in `cost` is available in full
pub fn can_afford(resources: &ResourceBundle, cost: &ResourceBundle) -> bool {
    cost.iter().all(|(kind, amount)| resources.get(kind) >= amount)
}

/// Deduct a cost the caller has already checked with `can_afford`
pub fn apply_cost(resources: &mut ResourceBundle, cost: &ResourceBundle) {
    for (kind, amount) in cost.iter() {
        resources.sub(kind, amount);
    }
}

/// Add a reward, clamping bankable resources at `max_storage`
///
/// A bankable balance that already exceeds the cap is left as is rather than
/// reduced.
pub fn apply_reward(resources: &mut ResourceBundle, reward: &ResourceBundle, max_storage: u64) {
    for (kind, amount) in reward.iter() {
        let current = resources.get(kind);
        let next = current.saturating_add(amount);
        if kind.is_bankable() {
            resources.set(kind, next.min(max_storage.max(current)));
        } else {
            resources.set(kind, next);
        }
    }
}

/// Clamp every bankable resource down to `max_storage`
pub fn clamp_to_storage(resources: &mut ResourceBundle, max_storage: u64) {
    for kind in ResourceKind::ALL.into_iter().filter(ResourceKind::is_bankable) {
        let current = resources.get(kind);
        if current > max_storage {
            resources.set(kind, max_storage);
        }
    }
}

fn sum_over<F>(catalog: &Catalog, buildings: &[Building], f: F) -> u64
where
    F: Fn(&BuildingTypeDef, &Building) -> u64,
{
    buildings
        .iter()
        .filter_map(|building| catalog.building(&building.kind).map(|def| f(def, building)))
        .sum()
}

/// Base allowance plus the energy output of every energy producer
pub fn total_energy(catalog: &Catalog, buildings: &[Building]) -> u64 {
    catalog.rules.base_energy
        + sum_over(catalog, buildings, |def, b| {
            income_at(def.output.get(ResourceKind::Energy), b.level)
        })
}

/// Summed energy upkeep of every building (upkeep does not scale with level)
pub fn energy_used(catalog: &Catalog, buildings: &[Building]) -> u64 {
    sum_over(catalog, buildings, |def, _| def.energy_cost)
}

/// Storage cap shared by every bankable resource
pub fn max_storage(catalog: &Catalog, buildings: &[Building]) -> u64 {
    catalog.rules.base_storage
        + sum_over(catalog, buildings, |def, b| income_at(def.storage, b.level))
}

/// Population housed by all buildings
pub fn total_population(catalog: &Catalog, buildings: &[Building]) -> u64 {
    sum_over(catalog, buildings, |def, b| {
        income_at(def.output.get(ResourceKind::Population), b.level)
    })
}

/// Derived capacity totals for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub max_storage: u64,
    pub energy_total: u64,
    pub energy_used: u64,
    pub population: u64,
}

impl Totals {
    pub fn compute(catalog: &Catalog, buildings: &[Building]) -> Self {
        Self {
            max_storage: max_storage(catalog, buildings),
            energy_total: total_energy(catalog, buildings),
            energy_used: energy_used(catalog, buildings),
            population: total_population(catalog, buildings),
        }
    }

    /// Energy still free for new buildings
    pub fn energy_free(&self) -> u64 {
        self.energy_total.saturating_sub(self.energy_used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildingId, DefId};
    use ResourceKind::*;

    fn building(kind: &str, level: u32) -> Building {
        Building {
            id: BuildingId::new(1),
            kind: DefId::new(kind),
            level,
            x: 0,
            y: 0,
            last_collected: Timestamp::from_secs(0),
            producing: true,
        }
    }

    #[test]
    fn test_costs_and_output() {
        let catalog = Catalog::standard();
        let farm = catalog.building(&DefId::new("farm")).unwrap();
        assert_eq!(build_cost(farm), ResourceBundle::from([(Coins, 50), (Materials, 20)]));
        assert_eq!(
            upgrade_cost(farm, 1),
            ResourceBundle::from([(Coins, 66), (Materials, 26)])
        );
        assert_eq!(output(farm, 3).get(Food), 13);
        assert_eq!(production_time(farm, 2), 61);

        let house = catalog.building(&DefId::new("house")).unwrap();
        assert_eq!(production_time(house, 5), 0);
    }

    #[test]
    fn test_affordability_is_all_or_nothing() {
        let resources = ResourceBundle::from([(Coins, 100), (Materials, 10)]);
        let cost = ResourceBundle::from([(Coins, 50), (Materials, 20)]);
        assert!(!can_afford(&resources, &cost));
        assert_eq!(shortfall(&resources, &cost), ResourceBundle::from([(Materials, 10)]));
        assert!(can_afford(&resources, &ResourceBundle::from([(Coins, 100)])));
    }

    #[test]
    fn test_apply_cost_to_zero() {
        let mut resources = ResourceBundle::from([(Coins, 50), (Food, 3)]);
        apply_cost(&mut resources, &ResourceBundle::from([(Coins, 50)]));
        assert_eq!(resources.get(Coins), 0);
        assert_eq!(resources.get(Food), 3);
    }

    #[test]
    fn test_apply_reward_caps_bankable_only() {
        let mut resources = ResourceBundle::from([(Coins, 950), (Crystals, 990)]);
        let reward = ResourceBundle::from([(Coins, 100), (Crystals, 100), (Population, 2000)]);
        apply_reward(&mut resources, &reward, 1000);
        assert_eq!(resources.get(Coins), 1000);
        assert_eq!(resources.get(Crystals), 1090);
        assert_eq!(resources.get(Population), 2000);
    }

    #[test]
    fn test_clamp_to_storage() {
        let mut resources = ResourceBundle::from([(Food, 1400), (Crystals, 1400)]);
        clamp_to_storage(&mut resources, 1000);
        assert_eq!(resources.get(Food), 1000);
        assert_eq!(resources.get(Crystals), 1400);
    }

    #[test]
    fn test_totals() {
        let catalog = Catalog::standard();
        let buildings = vec![
            building("powerplant", 2),
            building("warehouse", 1),
            building("house", 1),
            building("park", 2),
            building("farm", 3),
        ];
        let totals = Totals::compute(&catalog, &buildings);
        assert_eq!(totals.energy_total, 10 + 11);
        // powerplant 0, warehouse 1, house 1, park 0, farm 1
        assert_eq!(totals.energy_used, 3);
        assert_eq!(totals.max_storage, 1500);
        assert_eq!(totals.population, 5 + 2);
        assert_eq!(totals.energy_free(), 18);
    }

    #[test]
    fn test_ready_in() {
        let catalog = Catalog::standard();
        let farm = catalog.building(&DefId::new("farm")).unwrap();
        let b = building("farm", 1);
        assert_eq!(ready_in(farm, &b, Timestamp::from_secs(45)), Some(15));
        assert_eq!(ready_in(farm, &b, Timestamp::from_secs(600)), Some(0));
        assert_eq!(cycles(6000, 60, 10), 10);
        assert_eq!(cycles(150, 60, 10), 2);
    }
}
