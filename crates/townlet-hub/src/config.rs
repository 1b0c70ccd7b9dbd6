//! Hub Configuration - Lock sharding and new-player defaults
//!
//! Sessions are spread over a number of lock shards so that lookups for
//! different players rarely contend. The shard count follows the machine's
//! logical CPU count by default.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Configuration for the Hub
///
/// # Example
///
/// ```
/// use townlet_hub::HubConfig;
///
/// let config = HubConfig::from_ron_str("(shard_count: 4, default_name: \"Mayor\")").unwrap();
/// assert_eq!(config.shard_count(), 4.min(townlet_hub::max_shards()));
/// assert_eq!(config.default_name, "Mayor");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Number of session lock shards, clamped to `[1, max_shards()]`
    #[serde(default = "max_shards")]
    shard_count: usize,
    /// Display name for players created without one
    #[serde(default = "default_name")]
    pub default_name: String,
    /// Base seed mixed with the player id to seed each new player's RNG
    #[serde(default = "default_seed")]
    pub base_seed: u64,
}

fn default_name() -> String {
    "Mayor".to_string()
}

fn default_seed() -> u64 {
    12345
}

impl HubConfig {
    /// Create a configuration with the specified shard count
    ///
    /// The shard count is clamped to `[1, max_shards()]`.
    pub fn with_shard_count(shard_count: usize) -> Self {
        Self {
            shard_count: shard_count.clamp(1, max_shards()),
            ..Self::default()
        }
    }

    /// Parse a configuration from RON; missing fields take their defaults
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let mut config: HubConfig = ron::from_str(content)?;
        config.set_shard_count(config.shard_count);
        Ok(config)
    }

    /// Get the current shard count
    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// Set the number of shards
    ///
    /// The value is clamped to `[1, max_shards()]`.
    pub fn set_shard_count(&mut self, n: usize) {
        self.shard_count = n.clamp(1, max_shards());
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            shard_count: max_shards(),
            default_name: default_name(),
            base_seed: default_seed(),
        }
    }
}

/// Get the maximum number of shards on this system
///
/// This uses the `num_cpus` crate to detect the number of logical CPUs.
pub fn max_shards() -> usize {
    num_cpus::get()
}

/// Mix the base seed with a player id into a per-player RNG seed
///
/// SplitMix64 finalizer; never returns zero so xorshift always advances.
pub fn player_seed(base_seed: u64, player: u64) -> u64 {
    let mut z = base_seed ^ player.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    z.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_all_cores() {
        let config = HubConfig::default();
        assert_eq!(config.shard_count(), max_shards());
        assert_eq!(config.default_name, "Mayor");
    }

    #[test]
    fn test_shard_count_clamped_minimum() {
        // 0 should be clamped to 1
        let config = HubConfig::with_shard_count(0);
        assert_eq!(config.shard_count(), 1);
    }

    #[test]
    fn test_shard_count_clamped_maximum() {
        let config = HubConfig::with_shard_count(10000);
        assert_eq!(config.shard_count(), max_shards());
    }

    #[test]
    fn test_from_ron_partial() {
        let config = HubConfig::from_ron_str("(base_seed: 9)").unwrap();
        assert_eq!(config.base_seed, 9);
        assert_eq!(config.shard_count(), max_shards());

        let config = HubConfig::from_ron_str("(shard_count: 0)").unwrap();
        assert_eq!(config.shard_count(), 1);

        assert!(HubConfig::from_ron_str("(shard_count: \"many\")").is_err());
    }

    #[test]
    fn test_player_seed_determinism() {
        assert_eq!(player_seed(100, 5), player_seed(100, 5));
        assert_ne!(player_seed(100, 5), player_seed(100, 6));
        assert_ne!(player_seed(100, 5), player_seed(101, 5));
    }
}
