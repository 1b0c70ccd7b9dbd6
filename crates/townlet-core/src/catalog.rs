//! Static game definitions
//!
//! The catalog is built once at startup (from `Catalog::standard()` or from
//! RON content via `townlet-script`) and then shared read-only by every
//! engine call.

use crate::quest::{QuestGoal, Target};
use crate::resource::{ResourceBundle, ResourceKind};
use crate::{DefId, QuestId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Grouping tag for building types, used for display and filtering
///
/// Capacity effects come from the definition itself: an `energy` output
/// raises the energy capacity and a non-zero `storage` raises the storage cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Production,
    Residential,
    Commerce,
    Energy,
    Storage,
    Decoration,
}

/// Definition of a building type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingTypeDef {
    /// Unique identifier for this building type
    pub id: DefId,
    /// Display name
    pub name: String,
    /// Icon identifier for UI
    #[serde(default)]
    pub icon: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Cost to construct at level 1
    pub cost: ResourceBundle,
    /// Output per production cycle at level 1
    #[serde(default)]
    pub output: ResourceBundle,
    /// Storage capacity added at level 1
    #[serde(default)]
    pub storage: u64,
    /// Production cycle in seconds at level 1 (0 = passive)
    #[serde(default)]
    pub production_time: u64,
    /// Highest reachable level
    pub max_level: u32,
    pub category: Category,
    /// Player level required to build
    #[serde(default = "default_unlock_level")]
    pub unlock_level: u32,
    /// Energy consumed while the building stands (does not scale with level)
    #[serde(default)]
    pub energy_cost: u64,
}

fn default_unlock_level() -> u32 {
    1
}

impl BuildingTypeDef {
    /// Create a building type with no cost, output or upkeep
    pub fn new(id: impl Into<DefId>, name: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            description: String::new(),
            cost: ResourceBundle::new(),
            output: ResourceBundle::new(),
            storage: 0,
            production_time: 0,
            max_level: 1,
            category,
            unlock_level: 1,
            energy_cost: 0,
        }
    }

    /// Passive buildings never need collecting
    pub fn is_passive(&self) -> bool {
        self.production_time == 0
    }

    fn with_icon(mut self, icon: &str, description: &str) -> Self {
        self.icon = icon.to_string();
        self.description = description.to_string();
        self
    }

    fn with_cost(mut self, cost: impl Into<ResourceBundle>) -> Self {
        self.cost = cost.into();
        self
    }

    fn with_output(mut self, output: impl Into<ResourceBundle>, production_time: u64) -> Self {
        self.output = output.into();
        self.production_time = production_time;
        self
    }

    fn with_storage(mut self, storage: u64) -> Self {
        self.storage = storage;
        self
    }

    fn with_limits(mut self, max_level: u32, unlock_level: u32, energy_cost: u64) -> Self {
        self.max_level = max_level;
        self.unlock_level = unlock_level;
        self.energy_cost = energy_cost;
        self
    }
}

/// A story quest from the fixed, ordered list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryQuestDef {
    /// Unique identifier, never reissued once completed
    pub id: QuestId,
    /// Player level at which the quest becomes available
    #[serde(default = "default_unlock_level")]
    pub min_level: u32,
    pub goal: QuestGoal,
    /// Required progress
    pub count: u64,
    pub reward: ResourceBundle,
    #[serde(default)]
    pub description: String,
}

impl StoryQuestDef {
    /// Create a story quest with no reward
    pub fn new(id: impl Into<String>, min_level: u32, goal: QuestGoal, count: u64) -> Self {
        Self {
            id: QuestId::new(id),
            min_level,
            goal,
            count,
            reward: ResourceBundle::new(),
            description: String::new(),
        }
    }

    fn with_reward(mut self, reward: impl Into<ResourceBundle>) -> Self {
        self.reward = reward.into();
        self
    }

    fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// A template for randomly generated quests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomQuestTemplate {
    /// Template identifier (at most one live instance per template)
    pub id: DefId,
    pub goal: QuestGoal,
    /// Required count at level 0
    pub base_count: u64,
    /// Extra required count per player level
    #[serde(default)]
    pub count_per_level: u64,
    /// Reward at level 0
    #[serde(default)]
    pub reward: ResourceBundle,
    /// Extra reward per player level
    #[serde(default)]
    pub reward_per_level: ResourceBundle,
}

/// Random quest templates grouped by quest type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestPools {
    #[serde(default)]
    pub build: Vec<RandomQuestTemplate>,
    #[serde(default)]
    pub collect: Vec<RandomQuestTemplate>,
    #[serde(default)]
    pub upgrade: Vec<RandomQuestTemplate>,
    #[serde(default)]
    pub spend: Vec<RandomQuestTemplate>,
}

impl QuestPools {
    /// The four pools in a fixed order
    pub fn pools(&self) -> [&[RandomQuestTemplate]; 4] {
        [&self.build, &self.collect, &self.upgrade, &self.spend]
    }

    /// Every template across all pools
    pub fn iter(&self) -> impl Iterator<Item = &RandomQuestTemplate> {
        self.pools().into_iter().flatten()
    }
}

/// Experience granted for an action: `base + per_level × player level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpRule {
    pub base: u64,
    #[serde(default)]
    pub per_level: u64,
}

impl XpRule {
    pub const fn new(base: u64, per_level: u64) -> Self {
        Self { base, per_level }
    }

    /// Experience granted at the given player level
    pub fn at(&self, level: u32) -> u64 {
        self.base + self.per_level * level as u64
    }
}

/// Experience grants per action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceRules {
    pub build: XpRule,
    pub collect: XpRule,
    pub upgrade: XpRule,
    pub unlock_zone: XpRule,
    pub claim_quest: XpRule,
}

impl Default for ExperienceRules {
    fn default() -> Self {
        Self {
            build: XpRule::new(10, 2),
            collect: XpRule::new(5, 1),
            upgrade: XpRule::new(15, 3),
            unlock_zone: XpRule::new(50, 0),
            claim_quest: XpRule::new(20, 5),
        }
    }
}

/// Tunable game rules
///
/// Every field has a default, so RON content may override any subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Resources of a freshly created player
    pub starting_resources: ResourceBundle,
    /// Storage cap for coins/food/materials before warehouses
    pub base_storage: u64,
    /// Energy capacity before power plants
    pub base_energy: u64,
    /// Cap on the active quest list
    pub max_active_quests: usize,
    /// Maximum production cycles paid out by one collect
    pub collect_cycle_cap: u64,
    /// Maximum offline time credited on load, in seconds
    pub offline_cap_secs: u64,
    /// Share of the build cost refunded on demolish, in percent
    pub demolish_refund_percent: u64,
    /// Width and height of the square tile grid
    pub grid_size: i32,
    /// Half-width of the always-unlocked central core
    pub core_half_width: i32,
    /// Depth of each zone expansion band
    pub zone_depth: i32,
    /// Building types that may be built even when energy is exhausted
    pub energy_exempt: Vec<DefId>,
    pub experience: ExperienceRules,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            starting_resources: ResourceBundle::from([
                (ResourceKind::Coins, 300),
                (ResourceKind::Food, 100),
                (ResourceKind::Materials, 150),
                (ResourceKind::Crystals, 5),
            ]),
            base_storage: 1000,
            base_energy: 10,
            max_active_quests: 8,
            collect_cycle_cap: 10,
            offline_cap_secs: 8 * 60 * 60,
            demolish_refund_percent: 30,
            grid_size: 40,
            core_half_width: 5,
            zone_depth: 4,
            energy_exempt: vec![DefId::new("powerplant")],
            experience: ExperienceRules::default(),
        }
    }
}

impl Rules {
    /// Whether a building type skips the energy capacity check
    pub fn is_energy_exempt(&self, kind: &DefId) -> bool {
        self.energy_exempt.contains(kind)
    }
}

/// All static definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Building types by ID, in display order
    pub buildings: IndexMap<DefId, BuildingTypeDef>,
    /// Story quests in unlock order
    pub story_quests: Vec<StoryQuestDef>,
    pub quest_pools: QuestPools,
    pub rules: Rules,
}

impl Catalog {
    /// Create an empty catalog with default rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a building type definition
    pub fn building(&self, id: &DefId) -> Option<&BuildingTypeDef> {
        self.buildings.get(id)
    }

    /// Get a story quest definition
    pub fn story_quest(&self, id: &QuestId) -> Option<&StoryQuestDef> {
        self.story_quests.iter().find(|q| &q.id == id)
    }

    /// Display name of a building type, falling back to its id
    pub fn building_name(&self, id: &DefId) -> String {
        self.building(id)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Add a building type, replacing any previous definition with the same id
    pub fn add_building(&mut self, def: BuildingTypeDef) {
        self.buildings.insert(def.id.clone(), def);
    }

    /// The built-in content shipped with the game
    pub fn standard() -> Self {
        use ResourceKind::*;

        let mut catalog = Catalog::new();

        for def in [
            BuildingTypeDef::new("farm", "Farm", Category::Production)
                .with_icon("🌾", "Grows food every minute.")
                .with_cost([(Coins, 50), (Materials, 20)])
                .with_output([(Food, 10)], 60)
                .with_limits(10, 1, 1),
            BuildingTypeDef::new("house", "House", Category::Residential)
                .with_icon("🏠", "Homes for your townsfolk.")
                .with_cost([(Coins, 80), (Materials, 30)])
                .with_output([(Population, 5)], 0)
                .with_limits(10, 1, 1),
            BuildingTypeDef::new("lumber_mill", "Lumber Mill", Category::Production)
                .with_icon("🪵", "Turns forests into building materials.")
                .with_cost([(Coins, 100), (Food, 20)])
                .with_output([(Materials, 8)], 90)
                .with_limits(10, 1, 2),
            BuildingTypeDef::new("market", "Market", Category::Commerce)
                .with_icon("🏪", "Traders pay coins for your goods.")
                .with_cost([(Coins, 120), (Materials, 60)])
                .with_output([(Coins, 15)], 120)
                .with_limits(10, 2, 2),
            BuildingTypeDef::new("powerplant", "Power Plant", Category::Energy)
                .with_icon("⚡", "Supplies energy to the town.")
                .with_cost([(Coins, 150), (Materials, 80)])
                .with_output([(Energy, 10)], 0)
                .with_limits(8, 2, 0),
            BuildingTypeDef::new("warehouse", "Warehouse", Category::Storage)
                .with_icon("📦", "Raises the storage cap.")
                .with_cost([(Coins, 100), (Materials, 100)])
                .with_storage(500)
                .with_limits(8, 3, 1),
            BuildingTypeDef::new("park", "Park", Category::Decoration)
                .with_icon("🌳", "A green spot that attracts new residents.")
                .with_cost([(Coins, 60), (Materials, 10)])
                .with_output([(Population, 2)], 0)
                .with_limits(5, 3, 0),
            BuildingTypeDef::new("crystal_mine", "Crystal Mine", Category::Production)
                .with_icon("💎", "Slowly digs up rare crystals.")
                .with_cost([(Coins, 400), (Materials, 250)])
                .with_output([(Crystals, 1)], 600)
                .with_limits(5, 5, 3),
        ] {
            catalog.add_building(def);
        }

        let building = |id: &str| Target::Only(DefId::new(id));

        catalog.story_quests = vec![
            StoryQuestDef::new("s1", 1, QuestGoal::Build(building("farm")), 1)
                .with_reward([(Coins, 100), (Materials, 50)])
                .with_description("Build your first Farm"),
            StoryQuestDef::new("s2", 1, QuestGoal::Build(building("house")), 1)
                .with_reward([(Coins, 80), (Food, 40)])
                .with_description("Build a House"),
            StoryQuestDef::new("s3", 1, QuestGoal::Collect(Target::Only(Food)), 50)
                .with_reward([(Coins, 120)])
                .with_description("Harvest 50 food"),
            StoryQuestDef::new("s4", 2, QuestGoal::BuildCount, 5)
                .with_reward([(Materials, 150)])
                .with_description("Construct 5 buildings"),
            StoryQuestDef::new("s5", 2, QuestGoal::Build(building("powerplant")), 1)
                .with_reward([(Coins, 150), (Crystals, 2)])
                .with_description("Build a Power Plant"),
            StoryQuestDef::new("s6", 2, QuestGoal::Upgrade(building("farm")), 3)
                .with_reward([(Coins, 200), (Materials, 100)])
                .with_description("Upgrade a Farm to level 3"),
            StoryQuestDef::new("s7", 3, QuestGoal::ReachPopulation, 30)
                .with_reward([(Coins, 250), (Crystals, 5)])
                .with_description("Reach a population of 30"),
            StoryQuestDef::new("s8", 3, QuestGoal::UnlockZone, 1)
                .with_reward([(Coins, 500)])
                .with_description("Unlock a new zone"),
            StoryQuestDef::new("s9", 3, QuestGoal::Build(building("warehouse")), 1)
                .with_reward([(Materials, 200)])
                .with_description("Build a Warehouse"),
            StoryQuestDef::new("s10", 4, QuestGoal::Spend(Target::Only(Coins)), 2000)
                .with_reward([(Crystals, 10)])
                .with_description("Spend 2000 coins"),
            StoryQuestDef::new("s11", 5, QuestGoal::Build(building("crystal_mine")), 1)
                .with_reward([(Coins, 1000)])
                .with_description("Build a Crystal Mine"),
        ];

        let template = |id: &str,
                        goal: QuestGoal,
                        base_count: u64,
                        count_per_level: u64| RandomQuestTemplate {
            id: DefId::new(id),
            goal,
            base_count,
            count_per_level,
            reward: [(Coins, 40)].into(),
            reward_per_level: [(Coins, 15)].into(),
        };

        catalog.quest_pools = QuestPools {
            build: ["farm", "house", "lumber_mill", "market", "park"]
                .into_iter()
                .map(|id| template(&format!("build_{}", id), QuestGoal::Build(building(id)), 1, 0))
                .collect(),
            collect: [(Coins, 30), (Food, 40), (Materials, 25)]
                .into_iter()
                .map(|(kind, per_level)| {
                    template(
                        &format!("collect_{}", kind),
                        QuestGoal::Collect(Target::Only(kind)),
                        per_level,
                        per_level,
                    )
                })
                .collect(),
            upgrade: ["farm", "lumber_mill", "market"]
                .into_iter()
                .map(|id| {
                    template(
                        &format!("upgrade_{}", id),
                        QuestGoal::Upgrade(building(id)),
                        2,
                        0,
                    )
                })
                .collect(),
            spend: [(Coins, 100), (Materials, 60)]
                .into_iter()
                .map(|(kind, per_level)| {
                    template(
                        &format!("spend_{}", kind),
                        QuestGoal::Spend(Target::Only(kind)),
                        per_level,
                        per_level,
                    )
                })
                .collect(),
        };

        catalog
    }
}
