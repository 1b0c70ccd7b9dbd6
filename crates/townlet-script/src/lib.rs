//! Townlet Script - RON content loader
//!
//! Loads catalog content from RON files:
//! - Building type definitions
//! - Story quests and random quest pools
//! - Rule overrides
//!
//! Content may be split across any number of files; `Loader::finish`
//! checks the combined result for consistency.

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::Loader;
pub use schema::ContentFile;
