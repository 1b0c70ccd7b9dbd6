//! Townlet DB - player persistence using native_db
//!
//! Each player aggregate is stored as one bincode document keyed by player
//! id, with the display name as a secondary key. Saves carry the
//! aggregate's version and a save older than the stored one is refused.

mod error;
mod models;
mod queries;
mod store;

pub use error::{Error, Result};
pub use models::StoredPlayer;
pub use store::Store;
