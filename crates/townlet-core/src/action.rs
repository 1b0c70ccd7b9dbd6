//! Player actions and their outcomes
//!
//! `Action` is the single message type a request layer hands to
//! `Engine::apply`. Buildings are addressed by their current position in the
//! player's building list.

use crate::resource::ResourceBundle;
use crate::zone::{Direction, Zone};
use crate::{BuildingId, DefId, QuestId};
use serde::{Deserialize, Serialize};

/// A state-changing request from a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Build { kind: DefId, x: i32, y: i32 },
    Collect { index: usize },
    CollectAll,
    Upgrade { index: usize },
    Demolish { index: usize },
    Move { index: usize, x: i32, y: i32 },
    UnlockZone { direction: Direction },
    ClaimQuest { id: QuestId },
    Reset,
}

impl Action {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::Build { .. } => "build",
            Action::Collect { .. } => "collect",
            Action::CollectAll => "collect_all",
            Action::Upgrade { .. } => "upgrade",
            Action::Demolish { .. } => "demolish",
            Action::Move { .. } => "move",
            Action::UnlockZone { .. } => "unlock_zone",
            Action::ClaimQuest { .. } => "claim_quest",
            Action::Reset => "reset",
        }
    }
}

/// Experience gained by an action and the levels it crossed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub experience: u64,
    pub levels_gained: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Built {
    pub index: usize,
    pub id: BuildingId,
    pub cost: ResourceBundle,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collected {
    /// Buildings that paid out
    pub count: usize,
    /// Production cycles paid, summed over buildings
    pub cycles: u64,
    /// Nominal output before the storage cap
    pub reward: ResourceBundle,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgraded {
    pub index: usize,
    pub level: u32,
    pub cost: ResourceBundle,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demolished {
    pub id: BuildingId,
    pub kind: DefId,
    pub refund: ResourceBundle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneUnlocked {
    pub zone: Zone,
    pub cost: u64,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestClaimed {
    pub id: QuestId,
    pub reward: ResourceBundle,
    pub progress: Progress,
}

/// Result of a successful action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Built(Built),
    Collected(Collected),
    Upgraded(Upgraded),
    Demolished(Demolished),
    Moved { index: usize, x: i32, y: i32 },
    ZoneUnlocked(ZoneUnlocked),
    QuestClaimed(QuestClaimed),
    Reset,
}

impl Outcome {
    /// Experience and levels gained, if the action grants any
    pub fn progress(&self) -> Progress {
        match self {
            Outcome::Built(o) => o.progress,
            Outcome::Collected(o) => o.progress,
            Outcome::Upgraded(o) => o.progress,
            Outcome::ZoneUnlocked(o) => o.progress,
            Outcome::QuestClaimed(o) => o.progress,
            Outcome::Demolished(_) | Outcome::Moved { .. } | Outcome::Reset => Progress::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_ron_format() {
        let action: Action = ron::from_str("build(kind: \"farm\", x: 20, y: 21)").unwrap();
        assert_eq!(
            action,
            Action::Build {
                kind: DefId::new("farm"),
                x: 20,
                y: 21
            }
        );
        assert_eq!(action.name(), "build");

        let action: Action = ron::from_str("unlock_zone(direction: north)").unwrap();
        assert_eq!(action, Action::UnlockZone { direction: Direction::North });
    }
}
