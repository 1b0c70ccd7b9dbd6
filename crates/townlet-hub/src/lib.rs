//! Townlet Hub - Per-player session coordination
//!
//! This crate runs townlet actions for many players at once. Each player is
//! an independent aggregate: actions against one player are serialized,
//! actions against different players run in parallel.
//!
//! ## Architecture
//!
//! ```text
//! Hub (owns Catalog + Clock)
//!  │
//!  ├── shards[] ← session cache, keyed by PlayerId
//!  │    └── Mutex<Player>
//!  │
//!  └── PlayerStore (trait) ← townlet-db or in-memory
//! ```
//!
//! ## Key Components
//!
//! - [`Hub`]: Loads, mutates and persists player aggregates
//! - [`PlayerStore`]: Persistence seam, implemented for `townlet_db::Store`
//! - [`HubConfig`]: Shard count and new-player defaults
//! - [`SystemClock`]: Wall clock for production use
//!
//! ## Design Principles
//!
//! 1. **townlet-core is standalone** - it does NOT know about the hub
//! 2. **Commit after save** - the cached aggregate only changes once the store accepted it
//! 3. **Rejections are values** - engine errors surface as [`Error::Rejected`]

mod clock;
mod config;
mod error;
mod hub;
mod store;

pub use clock::SystemClock;
pub use config::{max_shards, player_seed, HubConfig};
pub use error::{Error, Result};
pub use hub::Hub;
pub use store::{MemoryStore, PlayerStore};
