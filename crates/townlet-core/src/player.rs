//! The player aggregate
//!
//! A `Player` owns everything one user has built: resources, buildings,
//! zones and quests. It is loaded, mutated by the engine and persisted as a
//! single unit.

use crate::catalog::Catalog;
use crate::economy;
use crate::formula::level_xp_needed;
use crate::quest::{self, Quest};
use crate::resource::ResourceBundle;
use crate::rng::GameRng;
use crate::time::Timestamp;
use crate::zone::Zone;
use crate::{BuildingId, DefId, QuestId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A placed building instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Stable identifier, unaffected by demolishing other buildings
    pub id: BuildingId,
    /// Building type
    pub kind: DefId,
    /// Current level, within `1..=max_level`
    pub level: u32,
    pub x: i32,
    pub y: i32,
    /// When the building was last collected (or built)
    pub last_collected: Timestamp,
    pub producing: bool,
}

impl Building {
    /// Whether the building stands on the given tile
    pub fn occupies(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }
}

/// Cumulative lifetime counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Buildings constructed
    pub built: u64,
    /// Successful collections (per building)
    pub collected: u64,
    /// Upgrades performed
    pub upgraded: u64,
    /// Total income collected, per resource
    pub earned: ResourceBundle,
    pub zones_unlocked: u64,
}

/// Everything one player owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name
    pub name: String,
    pub level: u32,
    /// Experience towards the next level
    pub experience: u64,
    pub resources: ResourceBundle,
    /// Buildings in placement order; actions address them by position
    pub buildings: Vec<Building>,
    /// Unlocked zones, append-only
    pub zones: Vec<Zone>,
    /// Active quests
    pub quests: Vec<Quest>,
    /// Ids of claimed story quests
    pub completed_quests: IndexSet<QuestId>,
    pub stats: Stats,
    pub last_online: Timestamp,
    /// Incremented on every successful action
    pub version: u64,
    pub(crate) next_building_id: u64,
    pub(crate) quest_serial: u64,
    pub(crate) rng: GameRng,
}

impl Player {
    /// Create a fresh player with starting resources and a full quest list
    pub fn new(name: impl Into<String>, now: Timestamp, catalog: &Catalog, seed: u64) -> Self {
        let mut player = Self {
            name: name.into(),
            level: 1,
            experience: 0,
            resources: catalog.rules.starting_resources.clone(),
            buildings: Vec::new(),
            zones: Vec::new(),
            quests: Vec::new(),
            completed_quests: IndexSet::new(),
            stats: Stats::default(),
            last_online: now,
            version: 0,
            next_building_id: 1,
            quest_serial: 0,
            rng: GameRng::new(seed),
        };
        quest::refill(&mut player, catalog);
        player
    }

    /// Experience required to reach the next level
    pub fn xp_to_next_level(&self) -> u64 {
        level_xp_needed(self.level)
    }

    /// Get an active quest by id
    pub fn quest(&self, id: &QuestId) -> Option<&Quest> {
        self.quests.iter().find(|q| &q.id == id)
    }

    /// Get a building by list position
    pub fn building(&self, index: usize) -> Option<&Building> {
        self.buildings.get(index)
    }

    /// Current list position of a building
    pub fn building_index(&self, id: BuildingId) -> Option<usize> {
        self.buildings.iter().position(|b| b.id == id)
    }

    /// List position of the building standing on a tile
    pub fn building_at(&self, x: i32, y: i32) -> Option<usize> {
        self.buildings.iter().position(|b| b.occupies(x, y))
    }

    /// Positions of every building that can be collected right now
    pub fn ready_buildings(&self, catalog: &Catalog, now: Timestamp) -> Vec<usize> {
        self.buildings
            .iter()
            .enumerate()
            .filter(|(_, building)| {
                catalog
                    .building(&building.kind)
                    .and_then(|def| economy::ready_in(def, building, now))
                    == Some(0)
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn allocate_building_id(&mut self) -> BuildingId {
        let id = BuildingId::new(self.next_building_id);
        self.next_building_id += 1;
        id
    }
}
