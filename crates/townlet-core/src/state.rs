//! Read-only view of a player for clients

use crate::catalog::Catalog;
use crate::economy::{self, Totals};
use crate::offline::CatchUp;
use crate::player::{Player, Stats};
use crate::quest::Quest;
use crate::resource::ResourceBundle;
use crate::time::Timestamp;
use crate::zone::{expansion_candidates, Zone, ZoneCandidate};
use crate::{BuildingId, DefId, QuestId};
use serde::Serialize;

/// One building as shown to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingView {
    /// Position in the building list, valid until the next demolish
    pub index: usize,
    pub id: BuildingId,
    pub kind: DefId,
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub x: i32,
    pub y: i32,
    pub producing: bool,
    /// Seconds until collectible; `None` for passive buildings
    pub ready_in_secs: Option<u64>,
    /// Output per cycle at the current level
    pub output: ResourceBundle,
    /// Cost of the next level; `None` at max level
    pub upgrade_cost: Option<ResourceBundle>,
}

/// Everything the client needs to render a player's town
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateView {
    pub name: String,
    pub level: u32,
    pub experience: u64,
    pub xp_to_next_level: u64,
    pub resources: ResourceBundle,
    pub buildings: Vec<BuildingView>,
    pub zones: Vec<Zone>,
    pub quests: Vec<Quest>,
    pub completed_quests: Vec<QuestId>,
    pub stats: Stats,
    pub totals: Totals,
    pub zone_candidates: Vec<ZoneCandidate>,
    /// Production credited on this load, if any
    pub offline: Option<CatchUp>,
    pub version: u64,
}

impl StateView {
    pub fn new(
        catalog: &Catalog,
        player: &Player,
        now: Timestamp,
        offline: Option<CatchUp>,
    ) -> Self {
        let buildings = player
            .buildings
            .iter()
            .enumerate()
            .map(|(index, building)| {
                let def = catalog.building(&building.kind);
                BuildingView {
                    index,
                    id: building.id,
                    kind: building.kind.clone(),
                    name: catalog.building_name(&building.kind),
                    level: building.level,
                    max_level: def.map(|d| d.max_level).unwrap_or(building.level),
                    x: building.x,
                    y: building.y,
                    producing: building.producing,
                    ready_in_secs: def.and_then(|d| economy::ready_in(d, building, now)),
                    output: def
                        .map(|d| economy::output(d, building.level))
                        .unwrap_or_default(),
                    upgrade_cost: def
                        .filter(|d| building.level < d.max_level)
                        .map(|d| economy::upgrade_cost(d, building.level)),
                }
            })
            .collect();

        Self {
            name: player.name.clone(),
            level: player.level,
            experience: player.experience,
            xp_to_next_level: player.xp_to_next_level(),
            resources: player.resources.clone(),
            buildings,
            zones: player.zones.clone(),
            quests: player.quests.clone(),
            completed_quests: player.completed_quests.iter().cloned().collect(),
            stats: player.stats.clone(),
            totals: Totals::compute(catalog, &player.buildings),
            zone_candidates: expansion_candidates(&catalog.rules, &player.zones),
            offline: offline.filter(|c| !c.is_empty()),
            version: player.version,
        }
    }
}
