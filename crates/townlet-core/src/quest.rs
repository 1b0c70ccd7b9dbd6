//! Quest tracking
//!
//! A player holds a bounded list of active quests fed from two sources:
//! - Story quests: a fixed, ordered list gated by player level. Completed
//!   story ids are recorded and never reissued.
//! - Random quests: synthesized from per-type template pools and scaled to
//!   the player's level. They pad the list whenever story quests run short.
//!
//! Progress is driven by `QuestEvent`s that the engine emits after each
//! action. Each goal variant decides for itself whether an event applies.

use crate::catalog::{Catalog, RandomQuestTemplate, StoryQuestDef};
use crate::player::Player;
use crate::resource::{ResourceBundle, ResourceKind};
use crate::{DefId, QuestId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a quest goal applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target<T> {
    /// Every instance matches
    Any,
    /// Only this instance matches
    Only(T),
}

impl<T: PartialEq> Target<T> {
    /// Check whether `value` satisfies this target
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Target::Any => true,
            Target::Only(expected) => expected == value,
        }
    }

    /// The specific target, if any
    pub fn specific(&self) -> Option<&T> {
        match self {
            Target::Any => None,
            Target::Only(value) => Some(value),
        }
    }
}

/// The objective of a quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestGoal {
    /// Build buildings of a type
    Build(Target<DefId>),
    /// Build anything
    BuildCount,
    /// Collect an amount of a resource
    Collect(Target<ResourceKind>),
    /// Raise a building of a type to a level
    Upgrade(Target<DefId>),
    /// Reach a total population
    ReachPopulation,
    /// Unlock a number of zones
    UnlockZone,
    /// Spend an amount of a resource
    Spend(Target<ResourceKind>),
}

/// Quest type names as shown to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    Build,
    BuildCount,
    Collect,
    Upgrade,
    ReachPopulation,
    UnlockZone,
    Spend,
}

impl QuestGoal {
    pub fn kind(&self) -> QuestKind {
        match self {
            QuestGoal::Build(_) => QuestKind::Build,
            QuestGoal::BuildCount => QuestKind::BuildCount,
            QuestGoal::Collect(_) => QuestKind::Collect,
            QuestGoal::Upgrade(_) => QuestKind::Upgrade,
            QuestGoal::ReachPopulation => QuestKind::ReachPopulation,
            QuestGoal::UnlockZone => QuestKind::UnlockZone,
            QuestGoal::Spend(_) => QuestKind::Spend,
        }
    }

    /// The building type this goal names, if any
    pub fn building_target(&self) -> Option<&DefId> {
        match self {
            QuestGoal::Build(target) | QuestGoal::Upgrade(target) => target.specific(),
            _ => None,
        }
    }

    /// New progress value after `event`, or `None` if the event does not apply
    pub fn advance(&self, progress: u64, event: &QuestEvent<'_>) -> Option<u64> {
        match (self, event) {
            (QuestGoal::Build(target), QuestEvent::Built(kind)) if target.matches(kind) => {
                Some(progress + 1)
            }
            (QuestGoal::BuildCount, QuestEvent::Built(_)) => Some(progress + 1),
            (QuestGoal::Collect(target), QuestEvent::Collected(kind, amount))
                if target.matches(kind) =>
            {
                Some(progress.saturating_add(*amount))
            }
            (QuestGoal::Upgrade(target), QuestEvent::Upgraded(kind, level))
                if target.matches(kind) =>
            {
                Some(progress.max(*level as u64))
            }
            (QuestGoal::ReachPopulation, QuestEvent::Population(total)) => Some(*total),
            (QuestGoal::UnlockZone, QuestEvent::ZonesUnlocked(total)) => Some(*total),
            (QuestGoal::Spend(target), QuestEvent::Spent(kind, amount)) if target.matches(kind) => {
                Some(progress.saturating_add(*amount))
            }
            _ => None,
        }
    }

    /// Human-readable objective
    pub fn describe(&self, count: u64, catalog: &Catalog) -> String {
        let building = |target: &Target<DefId>| match target {
            Target::Any => "building".to_string(),
            Target::Only(id) => catalog.building_name(id),
        };
        let resource = |target: &Target<ResourceKind>| match target {
            Target::Any => "resources".to_string(),
            Target::Only(kind) => kind.to_string(),
        };
        match self {
            QuestGoal::Build(target) => format!("Build {} {}", count, building(target)),
            QuestGoal::BuildCount => format!("Construct {} buildings", count),
            QuestGoal::Collect(target) => format!("Collect {} {}", count, resource(target)),
            QuestGoal::Upgrade(target) => {
                format!("Upgrade a {} to level {}", building(target), count)
            }
            QuestGoal::ReachPopulation => format!("Reach a population of {}", count),
            QuestGoal::UnlockZone => format!("Unlock {} zones", count),
            QuestGoal::Spend(target) => format!("Spend {} {}", count, resource(target)),
        }
    }
}

/// Something that happened which may move quest progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestEvent<'a> {
    /// A building of this type was built
    Built(&'a DefId),
    /// An amount of a resource was collected
    Collected(ResourceKind, u64),
    /// A building of this type reached this level
    Upgraded(&'a DefId, u32),
    /// Total population after the action
    Population(u64),
    /// Cumulative number of unlocked zones
    ZonesUnlocked(u64),
    /// An amount of a resource was spent
    Spent(ResourceKind, u64),
}

impl fmt::Display for QuestEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestEvent::Built(kind) => write!(f, "built {}", kind),
            QuestEvent::Collected(kind, amount) => write!(f, "collected {} {}", amount, kind),
            QuestEvent::Upgraded(kind, level) => write!(f, "upgraded {} to {}", kind, level),
            QuestEvent::Population(total) => write!(f, "population {}", total),
            QuestEvent::ZonesUnlocked(total) => write!(f, "zones unlocked {}", total),
            QuestEvent::Spent(kind, amount) => write!(f, "spent {} {}", amount, kind),
        }
    }
}

/// Where an active quest came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestOrigin {
    Story,
    Random,
}

/// An active quest instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    /// Story quest id or random template id this instance came from
    pub template: DefId,
    pub origin: QuestOrigin,
    pub goal: QuestGoal,
    /// Required progress
    pub count: u64,
    pub reward: ResourceBundle,
    pub description: String,
    pub progress: u64,
}

impl Quest {
    /// Instantiate a story quest
    pub fn from_story(def: &StoryQuestDef, catalog: &Catalog) -> Self {
        let description = if def.description.is_empty() {
            def.goal.describe(def.count, catalog)
        } else {
            def.description.clone()
        };
        Self {
            id: def.id.clone(),
            template: DefId::new(def.id.as_str()),
            origin: QuestOrigin::Story,
            goal: def.goal.clone(),
            count: def.count,
            reward: def.reward.clone(),
            description,
            progress: 0,
        }
    }

    /// Instantiate a random quest scaled to `level`
    pub fn from_template(
        id: QuestId,
        template: &RandomQuestTemplate,
        level: u32,
        catalog: &Catalog,
    ) -> Self {
        let mut count = template.base_count + template.count_per_level * level as u64;
        if let QuestGoal::Upgrade(Target::Only(kind)) = &template.goal {
            // Never ask for a level the building cannot reach
            if let Some(def) = catalog.building(kind) {
                count = count.min(def.max_level as u64);
            }
        }
        let count = count.max(1);
        let mut reward = template.reward.clone();
        reward.merge(&template.reward_per_level.scaled(level as u64));

        Self {
            id,
            template: template.id.clone(),
            origin: QuestOrigin::Random,
            description: template.goal.describe(count, catalog),
            goal: template.goal.clone(),
            count,
            reward,
            progress: 0,
        }
    }

    /// Whether progress has reached the required count
    pub fn is_complete(&self) -> bool {
        self.progress >= self.count
    }

    /// Apply an event, returning true if progress changed
    pub fn observe(&mut self, event: &QuestEvent<'_>) -> bool {
        match self.goal.advance(self.progress, event) {
            Some(next) if next != self.progress => {
                self.progress = next;
                true
            }
            _ => false,
        }
    }
}

/// Feed an event to every active quest
pub fn track(quests: &mut [Quest], event: &QuestEvent<'_>) {
    for quest in quests.iter_mut() {
        if quest.observe(event) {
            tracing::trace!(
                target: "townlet::quest",
                quest = %quest.id,
                progress = quest.progress,
                count = quest.count,
                %event,
                "quest progress"
            );
        }
    }
}

/// Add every story quest the player is eligible for
///
/// Story quests take priority over random ones: when the list is full, an
/// unstarted random quest makes room. If every random quest already has
/// progress the list grows past the cap until claims shrink it again.
/// Returns the number of quests added.
pub fn add_story_quests(player: &mut Player, catalog: &Catalog) -> usize {
    let cap = catalog.rules.max_active_quests;
    let mut added = 0;
    for def in &catalog.story_quests {
        if def.min_level > player.level
            || player.completed_quests.contains(&def.id)
            || player.quest(&def.id).is_some()
        {
            continue;
        }
        if player.quests.len() >= cap {
            if let Some(index) = player
                .quests
                .iter()
                .rposition(|q| q.origin == QuestOrigin::Random && q.progress == 0)
            {
                let evicted = player.quests.remove(index);
                tracing::trace!(
                    target: "townlet::quest",
                    quest = %evicted.id,
                    story = %def.id,
                    "random quest replaced"
                );
            }
        }
        player.quests.push(Quest::from_story(def, catalog));
        added += 1;
    }
    added
}

/// Templates that may be instantiated for the player right now
///
/// A template is eligible when its building target is unlocked at the
/// player's level and no instance of it is already active.
fn eligible_templates<'c>(
    player: &Player,
    pool: &'c [RandomQuestTemplate],
    catalog: &Catalog,
) -> Vec<&'c RandomQuestTemplate> {
    pool.iter()
        .filter(|template| {
            let unlocked = match template.goal.building_target() {
                Some(kind) => catalog
                    .building(kind)
                    .map(|def| def.unlock_level <= player.level)
                    .unwrap_or(false),
                None => true,
            };
            unlocked && !player.quests.iter().any(|q| q.template == template.id)
        })
        .collect()
}

/// Synthesize one random quest, or `None` when every pool is exhausted
pub fn generate_random(player: &mut Player, catalog: &Catalog) -> Option<Quest> {
    let pools: Vec<Vec<&RandomQuestTemplate>> = catalog
        .quest_pools
        .pools()
        .into_iter()
        .map(|pool| eligible_templates(player, pool, catalog))
        .filter(|eligible| !eligible.is_empty())
        .collect();

    let pool = player.rng.pick(&pools)?;
    let template = *player.rng.pick(pool)?;

    player.quest_serial += 1;
    let id = QuestId::random(player.quest_serial);
    Some(Quest::from_template(id, template, player.level, catalog))
}

/// Top the active list back up to the cap
///
/// Pending story quests go first; random quests fill the rest until the cap
/// is reached or no eligible template remains.
pub fn refill(player: &mut Player, catalog: &Catalog) {
    add_story_quests(player, catalog);
    while player.quests.len() < catalog.rules.max_active_quests {
        match generate_random(player, catalog) {
            Some(quest) => player.quests.push(quest),
            None => break,
        }
    }
}
