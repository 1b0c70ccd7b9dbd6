//! Resource kinds and bundles
//!
//! A `ResourceBundle` is the currency of every cost, output and reward in the
//! engine. Quantities are non-negative by construction and zero entries are
//! never stored, so two bundles with the same amounts always compare equal.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of resources a player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Coins,
    Food,
    Materials,
    Energy,
    Population,
    Experience,
    Crystals,
}

impl ResourceKind {
    /// Every resource kind in display order
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Coins,
        ResourceKind::Food,
        ResourceKind::Materials,
        ResourceKind::Energy,
        ResourceKind::Population,
        ResourceKind::Experience,
        ResourceKind::Crystals,
    ];

    /// Whether this resource is limited by warehouse storage
    pub fn is_bankable(&self) -> bool {
        matches!(
            self,
            ResourceKind::Coins | ResourceKind::Food | ResourceKind::Materials
        )
    }

    /// Lowercase name used in descriptions and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Coins => "coins",
            ResourceKind::Food => "food",
            ResourceKind::Materials => "materials",
            ResourceKind::Energy => "energy",
            ResourceKind::Population => "population",
            ResourceKind::Experience => "experience",
            ResourceKind::Crystals => "crystals",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mapping from resource kind to quantity
///
/// Uses IndexMap to preserve insertion order (useful for deterministic serialization)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceBundle(IndexMap<ResourceKind, u64>);

impl ResourceBundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity of one resource (zero when absent)
    pub fn get(&self, kind: ResourceKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Set a quantity, dropping the entry when it is zero
    pub fn set(&mut self, kind: ResourceKind, amount: u64) {
        if amount == 0 {
            self.0.shift_remove(&kind);
        } else {
            self.0.insert(kind, amount);
        }
    }

    /// Add to a quantity
    pub fn add(&mut self, kind: ResourceKind, amount: u64) {
        let current = self.get(kind);
        self.set(kind, current.saturating_add(amount));
    }

    /// Subtract from a quantity, stopping at zero
    pub fn sub(&mut self, kind: ResourceKind, amount: u64) {
        let current = self.get(kind);
        self.set(kind, current.saturating_sub(amount));
    }

    /// Add every entry of another bundle
    pub fn merge(&mut self, other: &ResourceBundle) {
        for (kind, amount) in other.iter() {
            self.add(kind, amount);
        }
    }

    /// Apply `f` to every quantity, dropping entries that become zero
    pub fn map(&self, mut f: impl FnMut(ResourceKind, u64) -> u64) -> ResourceBundle {
        self.iter().map(|(kind, amount)| (kind, f(kind, amount))).collect()
    }

    /// Every quantity multiplied by `factor`
    pub fn scaled(&self, factor: u64) -> ResourceBundle {
        self.map(|_, amount| amount.saturating_mul(factor))
    }

    /// Remove one resource from the bundle, returning its quantity
    pub fn take(&mut self, kind: ResourceKind) -> u64 {
        self.0.shift_remove(&kind).unwrap_or(0)
    }

    /// Iterate over non-zero entries
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u64)> + '_ {
        self.0.iter().map(|(kind, amount)| (*kind, *amount))
    }

    /// Whether the bundle has a non-zero entry for `kind`
    pub fn contains(&self, kind: ResourceKind) -> bool {
        self.0.contains_key(&kind)
    }

    /// Check if the bundle holds nothing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of non-zero entries
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(ResourceKind, u64)> for ResourceBundle {
    fn from_iter<I: IntoIterator<Item = (ResourceKind, u64)>>(iter: I) -> Self {
        let mut bundle = ResourceBundle::new();
        for (kind, amount) in iter {
            bundle.add(kind, amount);
        }
        bundle
    }
}

impl<const N: usize> From<[(ResourceKind, u64); N]> for ResourceBundle {
    fn from(entries: [(ResourceKind, u64); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl fmt::Display for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "nothing");
        }
        for (i, (kind, amount)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", amount, kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ResourceKind::*;

    #[test]
    fn test_bankable_kinds() {
        assert!(Coins.is_bankable());
        assert!(Food.is_bankable());
        assert!(Materials.is_bankable());
        assert!(!Energy.is_bankable());
        assert!(!Population.is_bankable());
        assert!(!Experience.is_bankable());
        assert!(!Crystals.is_bankable());
    }

    #[test]
    fn test_zero_entries_dropped() {
        let mut bundle = ResourceBundle::from([(Coins, 10)]);
        bundle.sub(Coins, 25);
        assert!(bundle.is_empty());
        assert_eq!(bundle.get(Coins), 0);
        assert_eq!(bundle, ResourceBundle::new());
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = ResourceBundle::from([(Coins, 1), (Food, 2)]);
        let b = ResourceBundle::from([(Food, 2), (Coins, 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_merge_and_scale() {
        let mut total = ResourceBundle::from([(Food, 10)]);
        total.merge(&ResourceBundle::from([(Food, 5), (Coins, 3)]).scaled(2));
        assert_eq!(total.get(Food), 20);
        assert_eq!(total.get(Coins), 6);
        assert_eq!(total.to_string(), "20 food, 6 coins");
    }

    #[test]
    fn test_ron_format() {
        let bundle: ResourceBundle = ron::from_str("{ coins: 50, materials: 20 }").unwrap();
        assert_eq!(bundle.get(Coins), 50);
        assert_eq!(bundle.get(Materials), 20);
    }
}
