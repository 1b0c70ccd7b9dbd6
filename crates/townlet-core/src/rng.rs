//! Deterministic random number generator
//!
//! Uses a simple xorshift64 algorithm for reproducibility across platforms.
//! The generator state is stored inside the player aggregate, so replaying
//! the same actions against the same save yields the same quest pool.

use serde::{Deserialize, Serialize};

/// A deterministic random number generator
///
/// Uses xorshift64 for simplicity and reproducibility.
/// Never use system randomness in game logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // Ensure non-zero state (xorshift requires this)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create an RNG from a saved state
    pub fn from_state(state: u64) -> Self {
        Self::new(state)
    }

    /// Get the current state (useful for saving/loading)
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64 algorithm
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Pick a random index below `len`
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some((self.next_u64() as usize) % len)
        }
    }

    /// Pick a random element from a slice
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        self.index(slice.len()).map(|i| &slice[i])
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_zero_seed() {
        let mut rng = GameRng::new(0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn test_index_in_bounds() {
        let mut rng = GameRng::new(42);
        assert_eq!(rng.index(0), None);
        for _ in 0..100 {
            assert!(rng.index(11).unwrap() < 11);
        }
    }

    #[test]
    fn test_pick() {
        let mut rng = GameRng::new(7);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());

        let items = [1, 2, 3];
        for _ in 0..20 {
            assert!(items.contains(rng.pick(&items).unwrap()));
        }
    }

    #[test]
    fn test_state_roundtrip() {
        let mut rng = GameRng::new(99);
        rng.next_u64();
        let mut restored = GameRng::from_state(rng.state());
        assert_eq!(rng.next_u64(), restored.next_u64());
    }
}
