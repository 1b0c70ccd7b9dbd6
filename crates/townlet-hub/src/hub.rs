//! Hub - Session coordinator for many players
//!
//! The Hub owns the shared catalog and a cache of live player sessions.
//! Every request for a player runs under that player's lock, so two actions
//! against the same player never both pass an affordability check on the
//! same balance. Requests for different players proceed in parallel.
//!
//! ## Request flow
//!
//! ```text
//! Hub::execute(player, action)
//!  │
//!  ├── shard lock → session (load from store or create)
//!  ├── session lock
//!  │    ├── clone aggregate, apply action with Engine
//!  │    ├── save clone to PlayerStore
//!  │    └── swap clone into the session
//!  └── Outcome / Error
//! ```
//!
//! A rejected action or a failed save leaves the cached session untouched.

use crate::config::{player_seed, HubConfig};
use crate::error::Result;
use crate::store::PlayerStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use townlet_core::{Action, Catalog, Clock, Engine, Outcome, Player, PlayerId, StateView};
use tracing::{debug, info};

type Session = Arc<Mutex<Player>>;

/// Central coordinator that owns the catalog and the player sessions
pub struct Hub {
    catalog: Arc<Catalog>,
    store: Arc<dyn PlayerStore>,
    clock: Arc<dyn Clock>,
    /// Session cache, sharded by player id
    shards: Vec<Mutex<HashMap<PlayerId, Session>>>,
    config: HubConfig,
}

impl Hub {
    /// Create a hub with the default configuration
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn PlayerStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(catalog, store, clock, HubConfig::default())
    }

    /// Create a hub with a specific configuration
    pub fn with_config(
        catalog: Arc<Catalog>,
        store: Arc<dyn PlayerStore>,
        clock: Arc<dyn Clock>,
        config: HubConfig,
    ) -> Self {
        // A config deserialized directly skips the clamp in `HubConfig`
        let shards = (0..config.shard_count().max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self {
            catalog,
            store,
            clock,
            shards,
            config,
        }
    }

    /// Get the shared catalog
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Get a reference to the hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Number of cached sessions
    pub fn session_count(&self) -> usize {
        self.shards.iter().map(|shard| lock(shard).len()).sum()
    }

    /// Load a player's state, creating the player with the default name
    ///
    /// Returning players get offline production credited first.
    pub fn state(&self, id: PlayerId) -> Result<StateView> {
        self.join(id, &self.config.default_name)
    }

    /// Like `state`, but a newly created player gets `name`
    pub fn join(&self, id: PlayerId, name: &str) -> Result<StateView> {
        let now = self.clock.now();
        let engine = Engine::new(&self.catalog);
        let (session, created) = self.session(id, name)?;
        let mut player = lock(&session);

        if created {
            return Ok(engine.state(&player, now, None));
        }

        let mut next = player.clone();
        let catch_up = engine.welcome_back(&mut next, now);
        self.store.save(id, &next)?;
        *player = next;

        debug!(
            target: "townlet::hub",
            player = %id,
            offline_secs = catch_up.elapsed_secs,
            reward = %catch_up.reward,
            "state loaded"
        );
        Ok(engine.state(&player, now, Some(catch_up)))
    }

    /// Apply one action to a player and persist the result
    pub fn execute(&self, id: PlayerId, action: Action) -> Result<Outcome> {
        let now = self.clock.now();
        let engine = Engine::new(&self.catalog);
        let (session, _) = self.session(id, &self.config.default_name)?;
        let mut player = lock(&session);

        let name = action.name();
        let mut next = player.clone();
        let outcome = match engine.apply(&mut next, action, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(
                    target: "townlet::hub",
                    player = %id,
                    action = name,
                    reason = err.kind(),
                    "action rejected"
                );
                return Err(err.into());
            }
        };
        self.store.save(id, &next)?;
        *player = next;

        debug!(
            target: "townlet::hub",
            player = %id,
            action = name,
            version = player.version,
            "action applied"
        );
        Ok(outcome)
    }

    /// Read a player's state without crediting offline production
    pub fn peek(&self, id: PlayerId) -> Result<Option<StateView>> {
        let Some(session) = self.cached(id) else {
            return Ok(self
                .store
                .load(id)?
                .map(|player| Engine::new(&self.catalog).state(&player, self.clock.now(), None)));
        };
        let player = lock(&session);
        Ok(Some(Engine::new(&self.catalog).state(&player, self.clock.now(), None)))
    }

    /// Drop a cached session; the stored copy is kept
    pub fn evict(&self, id: PlayerId) -> bool {
        lock(self.shard(id)).remove(&id).is_some()
    }

    /// Delete a player from the cache and the store
    pub fn remove(&self, id: PlayerId) -> Result<()> {
        let mut shard = lock(self.shard(id));
        self.store.delete(id)?;
        shard.remove(&id);
        info!(target: "townlet::hub", player = %id, "player removed");
        Ok(())
    }

    fn shard(&self, id: PlayerId) -> &Mutex<HashMap<PlayerId, Session>> {
        &self.shards[(id.raw() % self.shards.len() as u64) as usize]
    }

    fn cached(&self, id: PlayerId) -> Option<Session> {
        lock(self.shard(id)).get(&id).cloned()
    }

    /// Find or create the session for a player
    ///
    /// The shard stays locked while loading so a player is never loaded twice.
    fn session(&self, id: PlayerId, name: &str) -> Result<(Session, bool)> {
        let mut shard = lock(self.shard(id));
        if let Some(session) = shard.get(&id) {
            return Ok((session.clone(), false));
        }

        let (player, created) = match self.store.load(id)? {
            Some(player) => (player, false),
            None => {
                let seed = player_seed(self.config.base_seed, id.raw());
                let player = Player::new(name, self.clock.now(), &self.catalog, seed);
                self.store.save(id, &player)?;
                info!(target: "townlet::hub", player = %id, name, "player created");
                (player, true)
            }
        };
        let session = Arc::new(Mutex::new(player));
        shard.insert(id, session.clone());
        Ok((session, created))
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked
///
/// Sessions are only replaced after a successful save, so the data behind
/// a poisoned lock is still a consistent aggregate.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("sessions", &self.session_count())
            .field("shards", &self.shards.len())
            .field("buildings", &self.catalog.buildings.len())
            .finish()
    }
}
