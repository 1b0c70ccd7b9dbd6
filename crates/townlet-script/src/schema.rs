//! On-disk content format

use serde::Deserialize;
use townlet_core::catalog::{QuestPools, StoryQuestDef};
use townlet_core::{BuildingTypeDef, Rules};

/// One RON content file
///
/// Every section is optional:
///
/// ```text
/// (
///     buildings: [ (id: "farm", name: "Farm", cost: { coins: 50 }, max_level: 10, category: production) ],
///     story_quests: [],
///     quest_pools: (build: [], collect: []),
///     rules: (base_storage: 2000),
/// )
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContentFile {
    pub buildings: Vec<BuildingTypeDef>,
    pub story_quests: Vec<StoryQuestDef>,
    pub quest_pools: QuestPools,
    pub rules: Option<Rules>,
}
