//! Progression engine
//!
//! Applies player actions to a `Player` aggregate. Each action validates
//! everything first and only then mutates, so a rejected action leaves the
//! player exactly as it was. Successful actions feed quest progress, grant
//! experience, run the level-up loop and top the quest list back up.

use crate::action::{
    Action, Built, Collected, Demolished, Outcome, Progress, QuestClaimed, Upgraded, ZoneUnlocked,
};
use crate::catalog::{BuildingTypeDef, Catalog, XpRule};
use crate::economy;
use crate::error::{Error, Result};
use crate::formula::level_xp_needed;
use crate::offline::{self, CatchUp};
use crate::player::{Building, Player};
use crate::quest::{self, QuestEvent, QuestOrigin};
use crate::resource::{ResourceBundle, ResourceKind};
use crate::state::StateView;
use crate::time::Timestamp;
use crate::zone::{expansion_candidates, is_tile_unlocked, Direction};
use crate::{DefId, QuestId};
use tracing::{debug, info};

/// Applies actions against a shared, read-only catalog
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    catalog: &'a Catalog,
}

impl<'a> Engine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Dispatch an action to its handler
    pub fn apply(&self, player: &mut Player, action: Action, now: Timestamp) -> Result<Outcome> {
        match action {
            Action::Build { kind, x, y } => {
                self.build(player, &kind, x, y, now).map(Outcome::Built)
            }
            Action::Collect { index } => self.collect(player, index, now).map(Outcome::Collected),
            Action::CollectAll => self.collect_all(player, now).map(Outcome::Collected),
            Action::Upgrade { index } => self.upgrade(player, index, now).map(Outcome::Upgraded),
            Action::Demolish { index } => {
                self.demolish(player, index, now).map(Outcome::Demolished)
            }
            Action::Move { index, x, y } => {
                self.move_building(player, index, x, y, now)?;
                Ok(Outcome::Moved { index, x, y })
            }
            Action::UnlockZone { direction } => self
                .unlock_zone(player, direction, now)
                .map(Outcome::ZoneUnlocked),
            Action::ClaimQuest { id } => self
                .claim_quest(player, &id, now)
                .map(Outcome::QuestClaimed),
            Action::Reset => {
                self.reset(player, now);
                Ok(Outcome::Reset)
            }
        }
    }

    /// Place a new level-1 building
    pub fn build(
        &self,
        player: &mut Player,
        kind: &DefId,
        x: i32,
        y: i32,
        now: Timestamp,
    ) -> Result<Built> {
        let def = self.def(kind)?;
        if player.level < def.unlock_level {
            return Err(Error::LevelTooLow {
                required: def.unlock_level,
                current: player.level,
            });
        }
        self.check_tile_free(player, x, y, None)?;
        if !self.catalog.rules.is_energy_exempt(kind) {
            let totals = economy::Totals::compute(self.catalog, &player.buildings);
            if totals.energy_used + def.energy_cost > totals.energy_total {
                return Err(Error::InsufficientEnergy {
                    required: def.energy_cost,
                    available: totals.energy_free(),
                });
            }
        }
        let cost = economy::build_cost(def);
        check_affordable(&player.resources, &cost)?;

        self.spend(player, &cost);
        let id = player.allocate_building_id();
        player.buildings.push(Building {
            id,
            kind: kind.clone(),
            level: 1,
            x,
            y,
            last_collected: now,
            producing: !def.is_passive(),
        });
        player.stats.built += 1;

        quest::track(&mut player.quests, &QuestEvent::Built(kind));
        self.track_population(player);
        let progress = self.reward_experience(player, self.catalog.rules.experience.build);
        self.finish(player, now);

        debug!(target: "townlet::engine", player = %player.name, %kind, x, y, "built");
        Ok(Built {
            index: player.buildings.len() - 1,
            id,
            cost,
            progress,
        })
    }

    /// Collect finished production from one building
    pub fn collect(&self, player: &mut Player, index: usize, now: Timestamp) -> Result<Collected> {
        let building = building_at(player, index)?;
        let def = self.def(&building.kind)?;
        let cycle = economy::production_time(def, building.level);
        if cycle == 0 {
            return Err(Error::NotCollectible);
        }
        let elapsed = now.elapsed_since(building.last_collected);
        if elapsed < cycle {
            return Err(Error::NotReady {
                remaining_secs: cycle - elapsed,
            });
        }
        let cycles = economy::cycles(elapsed, cycle, self.catalog.rules.collect_cycle_cap);
        let reward = economy::output(def, building.level).scaled(cycles);

        player.buildings[index].last_collected = now;
        let progress = self.pay_out(player, &reward, 1);
        self.finish(player, now);

        debug!(
            target: "townlet::engine",
            player = %player.name,
            index,
            cycles,
            %reward,
            "collected"
        );
        Ok(Collected {
            count: 1,
            cycles,
            reward,
            progress,
        })
    }

    /// Collect every ready building in one pass
    ///
    /// Output is summed before it is banked, so the storage cap applies to
    /// the total. With nothing ready the player is left untouched.
    pub fn collect_all(&self, player: &mut Player, now: Timestamp) -> Result<Collected> {
        let cap = self.catalog.rules.collect_cycle_cap;
        let mut ready = Vec::new();
        let mut reward = ResourceBundle::new();
        let mut total_cycles = 0;
        for (index, building) in player.buildings.iter().enumerate() {
            let Some(def) = self.catalog.building(&building.kind) else {
                continue;
            };
            let cycle = economy::production_time(def, building.level);
            let elapsed = now.elapsed_since(building.last_collected);
            if cycle == 0 || elapsed < cycle {
                continue;
            }
            let cycles = economy::cycles(elapsed, cycle, cap);
            reward.merge(&economy::output(def, building.level).scaled(cycles));
            total_cycles += cycles;
            ready.push(index);
        }

        let mut progress = Progress::default();
        if !ready.is_empty() {
            for &index in &ready {
                player.buildings[index].last_collected = now;
            }
            progress = self.pay_out(player, &reward, ready.len() as u64);
            self.finish(player, now);
        }

        debug!(
            target: "townlet::engine",
            player = %player.name,
            count = ready.len(),
            %reward,
            "collected all"
        );
        Ok(Collected {
            count: ready.len(),
            cycles: total_cycles,
            reward,
            progress,
        })
    }

    /// Raise a building by one level
    pub fn upgrade(&self, player: &mut Player, index: usize, now: Timestamp) -> Result<Upgraded> {
        let building = building_at(player, index)?;
        let def = self.def(&building.kind)?;
        if building.level >= def.max_level {
            return Err(Error::MaxLevelReached {
                max_level: def.max_level,
            });
        }
        let cost = economy::upgrade_cost(def, building.level);
        check_affordable(&player.resources, &cost)?;

        self.spend(player, &cost);
        let building = &mut player.buildings[index];
        building.level += 1;
        let level = building.level;
        let kind = building.kind.clone();
        player.stats.upgraded += 1;

        quest::track(&mut player.quests, &QuestEvent::Upgraded(&kind, level));
        self.track_population(player);
        let progress = self.reward_experience(player, self.catalog.rules.experience.upgrade);
        self.finish(player, now);

        debug!(target: "townlet::engine", player = %player.name, index, %kind, level, "upgraded");
        Ok(Upgraded {
            index,
            level,
            cost,
            progress,
        })
    }

    /// Remove a building and refund part of its build cost
    ///
    /// Later buildings shift down by one position.
    pub fn demolish(
        &self,
        player: &mut Player,
        index: usize,
        now: Timestamp,
    ) -> Result<Demolished> {
        let building = building_at(player, index)?;
        let percent = self.catalog.rules.demolish_refund_percent;
        let refund = self
            .catalog
            .building(&building.kind)
            .map(|def| economy::build_cost(def).map(|_, amount| amount * percent / 100))
            .unwrap_or_default();

        let max_storage = economy::max_storage(self.catalog, &player.buildings);
        economy::apply_reward(&mut player.resources, &refund, max_storage);
        let building = player.buildings.remove(index);
        // Losing a warehouse can shrink the cap below current balances
        let max_storage = economy::max_storage(self.catalog, &player.buildings);
        economy::clamp_to_storage(&mut player.resources, max_storage);
        self.finish(player, now);

        debug!(
            target: "townlet::engine",
            player = %player.name,
            index,
            kind = %building.kind,
            %refund,
            "demolished"
        );
        Ok(Demolished {
            id: building.id,
            kind: building.kind,
            refund,
        })
    }

    /// Relocate a building to another free, unlocked tile
    pub fn move_building(
        &self,
        player: &mut Player,
        index: usize,
        x: i32,
        y: i32,
        now: Timestamp,
    ) -> Result<()> {
        building_at(player, index)?;
        self.check_tile_free(player, x, y, Some(index))?;

        let building = &mut player.buildings[index];
        building.x = x;
        building.y = y;
        self.finish(player, now);

        debug!(target: "townlet::engine", player = %player.name, index, x, y, "moved");
        Ok(())
    }

    /// Buy the expansion candidate on one side of the territory
    pub fn unlock_zone(
        &self,
        player: &mut Player,
        direction: Direction,
        now: Timestamp,
    ) -> Result<ZoneUnlocked> {
        let candidate = expansion_candidates(&self.catalog.rules, &player.zones)
            .into_iter()
            .find(|c| c.zone.direction == direction)
            .ok_or(Error::ZoneUnavailable(direction))?;
        let coins = player.resources.get(ResourceKind::Coins);
        if coins < candidate.cost {
            return Err(Error::InsufficientCoins {
                required: candidate.cost,
                available: coins,
            });
        }

        self.spend(player, &ResourceBundle::from([(ResourceKind::Coins, candidate.cost)]));
        player.zones.push(candidate.zone);
        player.stats.zones_unlocked += 1;

        quest::track(
            &mut player.quests,
            &QuestEvent::ZonesUnlocked(player.stats.zones_unlocked),
        );
        let progress = self.reward_experience(player, self.catalog.rules.experience.unlock_zone);
        self.finish(player, now);

        info!(
            target: "townlet::engine",
            player = %player.name,
            %direction,
            cost = candidate.cost,
            zones = player.zones.len(),
            "zone unlocked"
        );
        Ok(ZoneUnlocked {
            zone: candidate.zone,
            cost: candidate.cost,
            progress,
        })
    }

    /// Claim the reward of a completed quest
    ///
    /// Experience in the reward goes through the level-up loop together with
    /// the claim bonus.
    pub fn claim_quest(
        &self,
        player: &mut Player,
        id: &QuestId,
        now: Timestamp,
    ) -> Result<QuestClaimed> {
        let position = player
            .quests
            .iter()
            .position(|q| &q.id == id)
            .ok_or_else(|| Error::QuestNotFound(id.clone()))?;
        let quest = &player.quests[position];
        if !quest.is_complete() {
            return Err(Error::QuestIncomplete {
                progress: quest.progress,
                count: quest.count,
            });
        }

        let quest = player.quests.remove(position);
        let mut reward = quest.reward.clone();
        let bonus_xp = reward.take(ResourceKind::Experience);
        let max_storage = economy::max_storage(self.catalog, &player.buildings);
        economy::apply_reward(&mut player.resources, &reward, max_storage);
        if quest.origin == QuestOrigin::Story {
            player.completed_quests.insert(quest.id.clone());
        }

        let claim_xp = self.catalog.rules.experience.claim_quest.at(player.level);
        let progress = self.grant_experience(player, claim_xp + bonus_xp);
        self.finish(player, now);

        info!(
            target: "townlet::engine",
            player = %player.name,
            quest = %quest.id,
            reward = %quest.reward,
            "quest claimed"
        );
        Ok(QuestClaimed {
            id: quest.id,
            reward: quest.reward,
            progress,
        })
    }

    /// Replace the player with a fresh one of the same name
    ///
    /// The version keeps counting up so stores never mistake the new
    /// aggregate for an older save.
    pub fn reset(&self, player: &mut Player, now: Timestamp) {
        let seed = player.rng.next_u64();
        let version = player.version;
        *player = Player::new(player.name.clone(), now, self.catalog, seed);
        player.version = version + 1;

        info!(target: "townlet::engine", player = %player.name, "player reset");
    }

    /// Credit production accrued since the player was last online
    ///
    /// Building collection timers are left alone.
    pub fn welcome_back(&self, player: &mut Player, now: Timestamp) -> CatchUp {
        let catch_up = offline::catch_up(self.catalog, &player.buildings, player.last_online, now);
        if !catch_up.is_empty() {
            let max_storage = economy::max_storage(self.catalog, &player.buildings);
            economy::apply_reward(&mut player.resources, &catch_up.reward, max_storage);
            debug!(
                target: "townlet::engine",
                player = %player.name,
                elapsed = catch_up.elapsed_secs,
                reward = %catch_up.reward,
                "offline production credited"
            );
        }
        player.last_online = now;
        player.version += 1;
        catch_up
    }

    /// Build the client view of a player
    pub fn state(&self, player: &Player, now: Timestamp, offline: Option<CatchUp>) -> StateView {
        StateView::new(self.catalog, player, now, offline)
    }

    /// Add experience and level up as many times as it covers
    ///
    /// Every level gained re-scans the story list for newly eligible quests.
    pub fn grant_experience(&self, player: &mut Player, amount: u64) -> Progress {
        player.experience = player.experience.saturating_add(amount);
        let mut levels_gained = 0;
        loop {
            let needed = level_xp_needed(player.level);
            if player.experience < needed {
                break;
            }
            player.experience -= needed;
            player.level += 1;
            levels_gained += 1;
            quest::add_story_quests(player, self.catalog);
            info!(
                target: "townlet::engine",
                player = %player.name,
                level = player.level,
                "level up"
            );
        }
        Progress {
            experience: amount,
            levels_gained,
        }
    }

    fn def(&self, kind: &DefId) -> Result<&'a BuildingTypeDef> {
        self.catalog
            .building(kind)
            .ok_or_else(|| Error::UnknownBuildingType(kind.clone()))
    }

    /// Check that a tile is unlocked and not taken by anyone but `ignore`
    fn check_tile_free(
        &self,
        player: &Player,
        x: i32,
        y: i32,
        ignore: Option<usize>,
    ) -> Result<()> {
        if !is_tile_unlocked(&self.catalog.rules, &player.zones, x, y) {
            return Err(Error::TileLocked { x, y });
        }
        match player.building_at(x, y) {
            Some(other) if Some(other) != ignore => Err(Error::TileOccupied { x, y }),
            _ => Ok(()),
        }
    }

    fn spend(&self, player: &mut Player, cost: &ResourceBundle) {
        economy::apply_cost(&mut player.resources, cost);
        for (kind, amount) in cost.iter() {
            quest::track(&mut player.quests, &QuestEvent::Spent(kind, amount));
        }
    }

    /// Bank collected output and credit stats, quests and experience
    fn pay_out(&self, player: &mut Player, reward: &ResourceBundle, buildings: u64) -> Progress {
        let max_storage = economy::max_storage(self.catalog, &player.buildings);
        economy::apply_reward(&mut player.resources, reward, max_storage);
        player.stats.collected += buildings;
        player.stats.earned.merge(reward);

        for (kind, amount) in reward.iter() {
            quest::track(&mut player.quests, &QuestEvent::Collected(kind, amount));
        }
        self.track_population(player);

        let xp = self.catalog.rules.experience.collect.at(player.level) * buildings;
        self.grant_experience(player, xp)
    }

    fn reward_experience(&self, player: &mut Player, rule: XpRule) -> Progress {
        let amount = rule.at(player.level);
        self.grant_experience(player, amount)
    }

    fn track_population(&self, player: &mut Player) {
        let population = economy::total_population(self.catalog, &player.buildings);
        quest::track(&mut player.quests, &QuestEvent::Population(population));
    }

    /// Common tail of every successful action
    fn finish(&self, player: &mut Player, now: Timestamp) {
        quest::refill(player, self.catalog);
        player.last_online = player.last_online.max(now);
        player.version += 1;
    }
}

fn building_at(player: &Player, index: usize) -> Result<&Building> {
    player.building(index).ok_or(Error::BuildingNotFound(index))
}

fn check_affordable(resources: &ResourceBundle, cost: &ResourceBundle) -> Result<()> {
    let missing = economy::shortfall(resources, cost);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::InsufficientResources { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::Quest;
    use ResourceKind::*;

    fn setup() -> (Catalog, Player) {
        let catalog = Catalog::standard();
        let player = Player::new("tester", Timestamp::from_secs(0), &catalog, 42);
        (catalog, player)
    }

    fn t(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn farm() -> DefId {
        DefId::new("farm")
    }

    #[test]
    fn test_build_deducts_cost_and_grants_xp() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        let built = engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();

        assert_eq!(built.index, 0);
        assert_eq!(player.resources.get(Coins), 250);
        assert_eq!(player.resources.get(Materials), 130);
        assert_eq!(player.experience, 12);
        assert_eq!(player.stats.built, 1);
        assert_eq!(player.buildings[0].last_collected, t(0));
        assert_eq!(player.version, 1);
    }

    #[test]
    fn test_build_rejections_leave_player_unchanged() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        let before = player.clone();

        assert_eq!(
            engine.build(&mut player, &farm(), 20, 20, t(1)),
            Err(Error::TileOccupied { x: 20, y: 20 })
        );
        assert_eq!(
            engine.build(&mut player, &farm(), 0, 0, t(1)),
            Err(Error::TileLocked { x: 0, y: 0 })
        );
        assert_eq!(
            engine.build(&mut player, &DefId::new("castle"), 21, 21, t(1)),
            Err(Error::UnknownBuildingType(DefId::new("castle")))
        );
        assert_eq!(
            engine.build(&mut player, &DefId::new("market"), 21, 21, t(1)),
            Err(Error::LevelTooLow {
                required: 2,
                current: 1
            })
        );
        assert_eq!(player, before);
    }

    #[test]
    fn test_build_insufficient_resources() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        player.resources.set(Materials, 5);
        let err = engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientResources {
                missing: ResourceBundle::from([(Materials, 15)])
            }
        );
        assert!(player.buildings.is_empty());
    }

    #[test]
    fn test_energy_limit_and_exemption() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        player.level = 2;
        player.resources = ResourceBundle::from([(Coins, 1000), (Materials, 1000), (Food, 1000)]);
        // Base allowance of 10 fits five lumber mills at 2 upkeep each
        for x in 15..20 {
            engine
                .build(&mut player, &DefId::new("lumber_mill"), x, 15, t(0))
                .unwrap();
        }
        assert_eq!(
            engine.build(&mut player, &farm(), 20, 15, t(0)),
            Err(Error::InsufficientEnergy {
                required: 1,
                available: 0
            })
        );
        engine
            .build(&mut player, &DefId::new("powerplant"), 20, 15, t(0))
            .unwrap();
        engine.build(&mut player, &farm(), 21, 15, t(0)).unwrap();
    }

    #[test]
    fn test_energy_overdraft_blocks_zero_upkeep_builds() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        player.level = 3;
        player.resources = ResourceBundle::from([(Coins, 2000), (Materials, 1000), (Food, 1000)]);
        engine
            .build(&mut player, &DefId::new("powerplant"), 20, 15, t(0))
            .unwrap();
        // 9 mills use 18 of the 20 available
        for x in 15..24 {
            engine
                .build(&mut player, &DefId::new("lumber_mill"), x, 16, t(0))
                .unwrap();
        }
        engine.demolish(&mut player, 0, t(0)).unwrap();

        let before = player.clone();
        assert_eq!(
            engine.build(&mut player, &DefId::new("park"), 20, 20, t(0)),
            Err(Error::InsufficientEnergy {
                required: 0,
                available: 0
            })
        );
        assert_eq!(player, before);
    }

    #[test]
    fn test_collect_not_ready_reports_remaining() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        assert_eq!(
            engine.collect(&mut player, 0, t(45)),
            Err(Error::NotReady { remaining_secs: 15 })
        );
    }

    #[test]
    fn test_collect_caps_cycles() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        let food = player.resources.get(Food);

        let collected = engine.collect(&mut player, 0, t(6000)).unwrap();
        assert_eq!(collected.cycles, 10);
        assert_eq!(collected.reward.get(Food), 100);
        assert_eq!(player.resources.get(Food), food + 100);
        assert_eq!(player.buildings[0].last_collected, t(6000));
        assert_eq!(player.stats.earned.get(Food), 100);
    }

    #[test]
    fn test_collect_passive_and_missing() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        engine
            .build(&mut player, &DefId::new("house"), 20, 20, t(0))
            .unwrap();
        assert_eq!(engine.collect(&mut player, 0, t(999)), Err(Error::NotCollectible));
        assert_eq!(engine.collect(&mut player, 3, t(999)), Err(Error::BuildingNotFound(3)));
    }

    #[test]
    fn test_collect_respects_storage() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        player.resources.set(Food, 950);
        engine.collect(&mut player, 0, t(6000)).unwrap();
        assert_eq!(player.resources.get(Food), 1000);
    }

    #[test]
    fn test_collect_all() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        engine.build(&mut player, &farm(), 21, 20, t(30)).unwrap();
        engine
            .build(&mut player, &DefId::new("house"), 22, 20, t(0))
            .unwrap();

        let collected = engine.collect_all(&mut player, t(70)).unwrap();
        assert_eq!(collected.count, 1);
        assert_eq!(collected.reward.get(Food), 10);

        let version = player.version;
        let collected = engine.collect_all(&mut player, t(71)).unwrap();
        assert_eq!(collected.count, 0);
        assert_eq!(player.version, version);

        let collected = engine.collect_all(&mut player, t(200)).unwrap();
        assert_eq!(collected.count, 2);
        assert_eq!(collected.cycles, 4);
        assert_eq!(player.stats.collected, 3);
    }

    #[test]
    fn test_upgrade_to_max_level() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        player.level = 3;
        player.resources = ResourceBundle::from([(Coins, 1000), (Materials, 1000)]);
        engine
            .build(&mut player, &DefId::new("park"), 20, 20, t(0))
            .unwrap();
        player.resources = ResourceBundle::from([(Coins, 1000), (Materials, 1000)]);
        for level in 2..=5 {
            let upgraded = engine.upgrade(&mut player, 0, t(0)).unwrap();
            assert_eq!(upgraded.level, level);
        }
        let before = player.resources.clone();
        assert_eq!(
            engine.upgrade(&mut player, 0, t(0)),
            Err(Error::MaxLevelReached { max_level: 5 })
        );
        assert_eq!(player.resources, before);
        assert_eq!(player.buildings[0].level, 5);
        assert_eq!(player.stats.upgraded, 4);
    }

    #[test]
    fn test_demolish_refund_and_shift() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        engine
            .build(&mut player, &DefId::new("house"), 21, 20, t(0))
            .unwrap();
        let house_id = player.buildings[1].id;
        let coins = player.resources.get(Coins);
        let materials = player.resources.get(Materials);

        let demolished = engine.demolish(&mut player, 0, t(0)).unwrap();
        assert_eq!(demolished.refund, ResourceBundle::from([(Coins, 15), (Materials, 6)]));
        assert_eq!(player.resources.get(Coins), coins + 15);
        assert_eq!(player.resources.get(Materials), materials + 6);
        assert_eq!(player.buildings.len(), 1);
        assert_eq!(player.building_index(house_id), Some(0));
    }

    #[test]
    fn test_demolish_warehouse_clamps_storage() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        player.level = 3;
        engine
            .build(&mut player, &DefId::new("warehouse"), 20, 20, t(0))
            .unwrap();
        player.resources.set(Food, 1400);
        engine.demolish(&mut player, 0, t(0)).unwrap();
        assert_eq!(player.resources.get(Food), 1000);
    }

    #[test]
    fn test_move() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        engine
            .build(&mut player, &DefId::new("house"), 21, 20, t(0))
            .unwrap();
        let resources = player.resources.clone();

        assert_eq!(
            engine.move_building(&mut player, 0, 21, 20, t(0)),
            Err(Error::TileOccupied { x: 21, y: 20 })
        );
        assert_eq!(
            engine.move_building(&mut player, 0, 39, 39, t(0)),
            Err(Error::TileLocked { x: 39, y: 39 })
        );
        engine.move_building(&mut player, 0, 20, 20, t(0)).unwrap();
        engine.move_building(&mut player, 0, 22, 22, t(0)).unwrap();
        assert_eq!((player.buildings[0].x, player.buildings[0].y), (22, 22));
        assert_eq!(player.resources, resources);
    }

    #[test]
    fn test_unlock_zone() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        assert_eq!(
            engine.unlock_zone(&mut player, Direction::North, t(0)),
            Err(Error::InsufficientCoins {
                required: 500,
                available: 300
            })
        );

        player.resources.set(Coins, 1000);
        let unlocked = engine.unlock_zone(&mut player, Direction::North, t(0)).unwrap();
        assert_eq!(unlocked.cost, 500);
        assert_eq!(player.resources.get(Coins), 500);
        assert_eq!(player.zones.len(), 1);
        assert_eq!(player.stats.zones_unlocked, 1);
        // 50 experience is short of the 70 needed for level 2
        assert_eq!(player.level, 1);
        assert_eq!(player.experience, 50);
        engine.build(&mut player, &farm(), 20, 12, t(0)).unwrap();
    }

    #[test]
    fn test_level_up_crosses_two_thresholds() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        // 70 for level 1, 120 for level 2
        let progress = engine.grant_experience(&mut player, 70 + 120 + 15);
        assert_eq!(progress.levels_gained, 2);
        assert_eq!(player.level, 3);
        assert_eq!(player.experience, 15);
    }

    #[test]
    fn test_claim_quest() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        let s1 = QuestId::new("s1");
        let s2 = QuestId::new("s2");
        assert_eq!(
            engine.claim_quest(&mut player, &s2, t(0)),
            Err(Error::QuestIncomplete {
                progress: 0,
                count: 1
            })
        );
        assert_eq!(
            engine.claim_quest(&mut player, &QuestId::new("nope"), t(0)),
            Err(Error::QuestNotFound(QuestId::new("nope")))
        );

        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        let coins = player.resources.get(Coins);
        let claimed = engine.claim_quest(&mut player, &s1, t(0)).unwrap();
        assert_eq!(claimed.reward, ResourceBundle::from([(Coins, 100), (Materials, 50)]));
        assert_eq!(player.resources.get(Coins), coins + 100);
        assert!(player.quest(&s1).is_none());
        assert!(player.completed_quests.contains(&s1));
        assert_eq!(player.quests.len(), 8);
    }

    #[test]
    fn test_quest_experience_reward_levels_up() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        let quest = &mut player.quests[0];
        quest.progress = quest.count;
        quest.reward = ResourceBundle::from([(Experience, 200)]);
        let id = quest.id.clone();

        engine.claim_quest(&mut player, &id, t(0)).unwrap();
        assert_eq!(player.resources.get(Experience), 0);
        // 200 + 25 claim bonus = 70 + 120 + 35
        assert_eq!(player.level, 3);
        assert_eq!(player.experience, 35);
    }

    /// Put a story quest at the front of the active list
    fn track_story(player: &mut Player, catalog: &Catalog, id: &str) -> QuestId {
        let id = QuestId::new(id);
        if player.quest(&id).is_none() {
            let def = catalog.story_quests.iter().find(|q| q.id == id).unwrap();
            player.quests.insert(0, Quest::from_story(def, catalog));
        }
        id
    }

    fn progress_of(player: &Player, id: &QuestId) -> u64 {
        player.quest(id).unwrap().progress
    }

    #[test]
    fn test_level_up_adds_story_quests() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        assert_eq!(player.quests.len(), 8);

        let progress = engine.grant_experience(&mut player, 70);
        assert_eq!(progress.levels_gained, 1);
        for id in ["s4", "s5", "s6"] {
            assert!(player.quest(&QuestId::new(id)).is_some(), "{} missing", id);
        }
        assert_eq!(player.quests.len(), 8);
    }

    #[test]
    fn test_spend_quest_tracks_costs() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        player.level = 4;
        player.resources = ResourceBundle::from([(Coins, 1000), (Materials, 1000), (Food, 1000)]);
        let s10 = track_story(&mut player, &catalog, "s10");

        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        assert_eq!(progress_of(&player, &s10), 50);

        // Upgrading a level 1 farm costs floor(50 × 1.32)
        engine.upgrade(&mut player, 0, t(0)).unwrap();
        assert_eq!(progress_of(&player, &s10), 50 + 66);

        engine.unlock_zone(&mut player, Direction::North, t(0)).unwrap();
        assert_eq!(progress_of(&player, &s10), 50 + 66 + 500);
    }

    #[test]
    fn test_upgrade_quest_takes_highest_level() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        player.level = 2;
        player.resources = ResourceBundle::from([(Coins, 1000), (Materials, 1000), (Food, 1000)]);
        let s6 = track_story(&mut player, &catalog, "s6");

        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        engine.build(&mut player, &farm(), 21, 20, t(0)).unwrap();
        engine.upgrade(&mut player, 0, t(0)).unwrap();
        engine.upgrade(&mut player, 0, t(0)).unwrap();
        assert_eq!(progress_of(&player, &s6), 3);
        assert!(player.quest(&s6).unwrap().is_complete());

        // A second farm reaching level 2 does not add to or lower progress
        engine.upgrade(&mut player, 1, t(0)).unwrap();
        assert_eq!(progress_of(&player, &s6), 3);
    }

    #[test]
    fn test_collect_population_and_zone_quests() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        player.level = 3;
        player.resources = ResourceBundle::from([(Coins, 1000), (Materials, 1000), (Food, 1000)]);
        let s3 = track_story(&mut player, &catalog, "s3");
        let s7 = track_story(&mut player, &catalog, "s7");
        let s8 = track_story(&mut player, &catalog, "s8");

        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        engine.collect(&mut player, 0, t(300)).unwrap();
        assert_eq!(progress_of(&player, &s3), 50);

        engine
            .build(&mut player, &DefId::new("house"), 21, 20, t(300))
            .unwrap();
        engine
            .build(&mut player, &DefId::new("park"), 22, 20, t(300))
            .unwrap();
        assert_eq!(progress_of(&player, &s7), 7);

        engine.unlock_zone(&mut player, Direction::North, t(300)).unwrap();
        assert_eq!(progress_of(&player, &s8), 1);
    }

    #[test]
    fn test_welcome_back() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        let food = player.resources.get(Food);

        let catch_up = engine.welcome_back(&mut player, t(150));
        assert_eq!(catch_up.reward.get(Food), 20);
        assert_eq!(player.resources.get(Food), food + 20);
        assert_eq!(player.last_online, t(150));
        // Timers are untouched, so the same cycles are still collectible
        assert_eq!(player.buildings[0].last_collected, t(0));
        assert_eq!(engine.collect(&mut player, 0, t(150)).unwrap().cycles, 2);
    }

    #[test]
    fn test_reset() {
        let (catalog, mut player) = setup();
        let engine = Engine::new(&catalog);
        engine.build(&mut player, &farm(), 20, 20, t(0)).unwrap();
        let version = player.version;

        engine.apply(&mut player, Action::Reset, t(10)).unwrap();
        assert!(player.buildings.is_empty());
        assert_eq!(player.name, "tester");
        assert_eq!(player.resources.get(Coins), 300);
        assert_eq!(player.quests.len(), 8);
        assert_eq!(player.version, version + 1);
    }
}
