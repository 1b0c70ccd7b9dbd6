//! Identity types for players, buildings, quests and catalog definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a player aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Create a new player ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player:{}", self.0)
    }
}

/// Stable identifier for a building instance
///
/// Assigned from a per-player counter and never reused, unlike the
/// building's position in the player's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u64);

impl BuildingId {
    /// Create a new building ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "building:{}", self.0)
    }
}

/// Identifier for a catalog definition (building type, quest template)
///
/// Uses a string-based ID for easy reference from RON content files
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefId(pub String);

impl DefId {
    /// Create a new definition ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DefId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DefId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of a quest instance
///
/// Story quests reuse their template id (`s1`, `s2`, ...); random quests get
/// a per-player serial (`r1`, `r2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(pub String);

impl QuestId {
    /// Create a new quest ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for the n-th generated random quest of a player
    pub fn random(serial: u64) -> Self {
        Self(format!("r{}", serial))
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QuestId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id() {
        let id = PlayerId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "player:42");
    }

    #[test]
    fn test_def_id() {
        let id = DefId::new("farm");
        assert_eq!(id.as_str(), "farm");
        assert_eq!(format!("{}", id), "farm");
    }

    #[test]
    fn test_random_quest_id() {
        assert_eq!(QuestId::random(7).as_str(), "r7");
    }
}
