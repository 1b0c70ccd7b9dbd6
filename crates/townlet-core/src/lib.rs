//! Townlet Core - progression and resource economy for a city builder
//!
//! This crate holds the game rules and performs no I/O:
//! - Static definitions (`Catalog`) and the scaling formulas
//! - Economy calculator: costs, outputs, storage/energy/population totals
//! - The `Player` aggregate and the `Engine` that applies actions to it
//! - Quest tracking with story and randomly generated quests
//! - Offline catch-up and zone expansion
//!
//! ## Usage
//!
//! ```
//! use townlet_core::{Action, Catalog, Engine, Player, Timestamp};
//!
//! let catalog = Catalog::standard();
//! let engine = Engine::new(&catalog);
//! let mut player = Player::new("mayor", Timestamp::from_secs(0), &catalog, 1);
//!
//! let action = Action::Build { kind: "farm".into(), x: 20, y: 20 };
//! engine.apply(&mut player, action, Timestamp::from_secs(0)).unwrap();
//! assert_eq!(player.buildings.len(), 1);
//! ```
//!
//! Actions are validated before anything is changed; a rejected action
//! returns an `Error` and leaves the player untouched.

pub mod action;
pub mod catalog;
pub mod economy;
mod engine;
mod error;
pub mod formula;
mod identity;
pub mod offline;
mod player;
pub mod quest;
mod resource;
mod rng;
mod state;
pub mod time;
pub mod zone;

pub use action::{Action, Outcome, Progress};
pub use catalog::{BuildingTypeDef, Catalog, Category, Rules};
pub use economy::Totals;
pub use engine::Engine;
pub use error::{Error, Result};
pub use identity::{BuildingId, DefId, PlayerId, QuestId};
pub use offline::CatchUp;
pub use player::{Building, Player, Stats};
pub use quest::{Quest, QuestGoal, QuestKind, QuestOrigin, Target};
pub use resource::{ResourceBundle, ResourceKind};
pub use rng::GameRng;
pub use state::{BuildingView, StateView};
pub use time::{Clock, FixedClock, Timestamp};
pub use zone::{Direction, Rect, Zone, ZoneCandidate};
