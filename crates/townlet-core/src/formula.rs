//! Scaling formulas
//!
//! Every cost, output, cycle length and threshold in the game derives from
//! these functions. Results are floored to whole units.

/// Per-level growth of building output
pub const INCOME_GROWTH: f64 = 1.18;
/// Per-level growth of upgrade cost
pub const UPGRADE_COST_GROWTH: f64 = 1.32;
/// Fractional slowdown of a production cycle per level above the first
pub const PRODUCTION_TIME_STEP: f64 = 0.03;
/// Cost multiplier for zone unlocks
pub const ZONE_COST_BASE: u64 = 500;

/// Output of one production cycle at `level`
///
/// `floor(base × 1.18^(level-1))`
pub fn income_at(base: u64, level: u32) -> u64 {
    let exponent = level as i32 - 1;
    (base as f64 * INCOME_GROWTH.powi(exponent)).floor() as u64
}

/// Cost of raising a building from `level` to `level + 1`
///
/// `floor(base × 1.32^level)`
pub fn upgrade_cost_at(base: u64, level: u32) -> u64 {
    (base as f64 * UPGRADE_COST_GROWTH.powi(level as i32)).floor() as u64
}

/// Length of one production cycle in seconds at `level`
///
/// `floor(base_time × (1 + (level-1) × 0.03))`. A base time of zero marks a
/// passive building and stays zero at every level.
pub fn production_time_at(base_time: u64, level: u32) -> u64 {
    let steps = level.saturating_sub(1) as f64;
    (base_time as f64 * (1.0 + steps * PRODUCTION_TIME_STEP)).floor() as u64
}

/// Coin cost of the n-th zone unlock (1-based)
///
/// `floor(500 × n²)`
pub fn zone_unlock_cost(n: u64) -> u64 {
    ZONE_COST_BASE.saturating_mul(n.saturating_mul(n))
}

/// Experience needed to advance from `level` to `level + 1`
///
/// `floor(50 × level + 20)`
pub fn level_xp_needed(level: u32) -> u64 {
    50 * level as u64 + 20
}
