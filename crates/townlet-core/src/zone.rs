//! Territory and zone expansion
//!
//! Every player starts with a fixed square core in the middle of the grid.
//! Territory grows by unlocking bands of tiles along one side of the bounding
//! box of everything unlocked so far.

use crate::catalog::Rules;
use crate::formula::zone_unlock_cost;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cardinal direction of an expansion band (north is towards y = 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions in candidate order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// Axis-aligned tile rectangle with inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Whether the tile lies inside (bounds inclusive)
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Clip to the grid, or `None` if nothing remains
    fn clip(&self, grid_size: i32) -> Option<Rect> {
        let max = grid_size - 1;
        let clipped = Rect {
            x1: self.x1.max(0),
            y1: self.y1.max(0),
            x2: self.x2.min(max),
            y2: self.y2.min(max),
        };
        (clipped.x1 <= clipped.x2 && clipped.y1 <= clipped.y2).then_some(clipped)
    }
}

/// An unlocked expansion zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub bounds: Rect,
    /// Side of the territory this zone extends from
    pub direction: Direction,
}

/// A zone that could be unlocked next, with its coin cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCandidate {
    pub zone: Zone,
    pub cost: u64,
}

/// The always-unlocked central core
pub fn core_rect(rules: &Rules) -> Rect {
    let center = rules.grid_size / 2;
    let half = rules.core_half_width;
    Rect::new(center - half, center - half, center + half, center + half)
}

/// Whether a tile is buildable: inside the core or any unlocked zone
pub fn is_tile_unlocked(rules: &Rules, zones: &[Zone], x: i32, y: i32) -> bool {
    core_rect(rules).contains(x, y) || zones.iter().any(|zone| zone.bounds.contains(x, y))
}

/// Bounding box of the core and every unlocked zone
pub fn territory(rules: &Rules, zones: &[Zone]) -> Rect {
    zones
        .iter()
        .fold(core_rect(rules), |acc, zone| acc.union(&zone.bounds))
}

/// Candidate zones for the next unlock, at most one per direction
///
/// Each band sits directly against one side of the territory, clipped to the
/// grid. Directions whose band would fall entirely outside the grid, or would
/// repeat an unlocked zone exactly, are skipped. The n-th returned candidate
/// costs `zone_unlock_cost(unlocked + 1 + n)`.
pub fn expansion_candidates(rules: &Rules, zones: &[Zone]) -> Vec<ZoneCandidate> {
    let area = territory(rules, zones);
    let depth = rules.zone_depth.max(1);

    let mut candidates = Vec::new();
    for direction in Direction::ALL {
        let band = match direction {
            Direction::North => Rect::new(area.x1, area.y1 - depth, area.x2, area.y1 - 1),
            Direction::South => Rect::new(area.x1, area.y2 + 1, area.x2, area.y2 + depth),
            Direction::East => Rect::new(area.x2 + 1, area.y1, area.x2 + depth, area.y2),
            Direction::West => Rect::new(area.x1 - depth, area.y1, area.x1 - 1, area.y2),
        };
        let Some(bounds) = band.clip(rules.grid_size) else {
            continue;
        };
        if zones.iter().any(|zone| zone.bounds == bounds) {
            continue;
        }
        let ordinal = zones.len() as u64 + 1 + candidates.len() as u64;
        candidates.push(ZoneCandidate {
            zone: Zone { bounds, direction },
            cost: zone_unlock_cost(ordinal),
        });
    }
    candidates
}
