//! Idle Town Demo
//!
//! Plays a short scripted session through the hub: a new mayor builds a
//! few buildings, claims quests, collects, expands the town and comes back
//! after a few hours away.
//!
//! Usage: `idle_town [content_dir] [db_path]`
//!
//! Without a database path the session is kept in memory. Set `RUST_LOG`
//! (e.g. `RUST_LOG=townlet=debug`) to see engine logs.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use townlet_core::{
    Action, Catalog, DefId, Direction, FixedClock, Outcome, PlayerId, QuestId, StateView,
    Timestamp,
};
use townlet_hub::{Hub, HubConfig, MemoryStore, PlayerStore};
use townlet_script::Loader;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    println!("=== Townlet Idle Town Demo ===\n");

    let mut args = std::env::args().skip(1);
    let content_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("content"));

    // Standard catalog plus whatever the content directory adds
    let mut loader = Loader::extending(Catalog::standard());
    loader.load_directory(&content_dir)?;
    let catalog = Arc::new(loader.finish()?);
    println!(
        "Catalog: {} building types, {} story quests (from {})\n",
        catalog.buildings.len(),
        catalog.story_quests.len(),
        content_dir.display()
    );

    let store: Arc<dyn PlayerStore> = match args.next() {
        Some(path) => {
            info!(target: "idle_town", %path, "using database");
            Arc::new(townlet_db::Store::open(path)?)
        }
        None => Arc::new(MemoryStore::new()),
    };
    let clock = Arc::new(FixedClock::new(Timestamp::from_secs(1_700_000_000)));
    let hub = Hub::with_config(catalog, store, clock.clone(), HubConfig::default());

    let mayor = PlayerId::new(1);
    let state = hub.join(mayor, "Ada")?;
    print_state(&state);

    let script = [
        build("farm", 20, 20),
        build("house", 22, 20),
        build("bakery", 20, 22),
        claim("s1"),
        claim("s2"),
        claim("b1"),
        // Outside the core; stays locked until a zone covers it
        build("farm", 20, 12),
    ];
    run(&hub, mayor, script)?;

    println!("\n... two minutes pass ...\n");
    clock.advance(120);
    run(
        &hub,
        mayor,
        [
            Action::CollectAll,
            Action::Upgrade { index: 0 },
            Action::UnlockZone {
                direction: Direction::North,
            },
            build("farm", 20, 12),
        ],
    )?;

    println!("\n... the mayor logs off for three hours ...\n");
    hub.evict(mayor);
    clock.advance(3 * 60 * 60);

    let state = hub.state(mayor)?;
    if let Some(offline) = &state.offline {
        println!(
            "Welcome back! {}s away, {}s credited from {} buildings: {}",
            offline.elapsed_secs, offline.credited_secs, offline.buildings, offline.reward
        );
    }
    print_state(&state);

    println!("\n=== Demo Complete ===");
    Ok(())
}

fn build(kind: &str, x: i32, y: i32) -> Action {
    Action::Build {
        kind: DefId::new(kind),
        x,
        y,
    }
}

fn claim(id: &str) -> Action {
    Action::ClaimQuest {
        id: QuestId::new(id),
    }
}

/// Execute each action, printing results; rejections do not stop the script
fn run(
    hub: &Hub,
    player: PlayerId,
    actions: impl IntoIterator<Item = Action>,
) -> Result<(), townlet_hub::Error> {
    for action in actions {
        let name = action.name();
        match hub.execute(player, action) {
            Ok(outcome) => {
                let progress = outcome.progress();
                print!("  {:<12} {}", name, describe(&outcome));
                if progress.levels_gained > 0 {
                    print!("  (+{} level)", progress.levels_gained);
                }
                println!();
            }
            Err(err) => match err.rejection() {
                Some(reason) => println!("  {:<12} rejected: {}", name, reason),
                None => return Err(err),
            },
        }
    }
    Ok(())
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Built(o) => format!("building #{} for {}", o.index, o.cost),
        Outcome::Collected(o) => format!("{} from {} buildings", o.reward, o.count),
        Outcome::Upgraded(o) => {
            format!("building #{} to level {} for {}", o.index, o.level, o.cost)
        }
        Outcome::Demolished(o) => format!("{} refunded {}", o.kind, o.refund),
        Outcome::Moved { index, x, y } => format!("building #{} to ({}, {})", index, x, y),
        Outcome::ZoneUnlocked(o) => format!("{} for {} coins", o.zone.direction, o.cost),
        Outcome::QuestClaimed(o) => format!("{} paid {}", o.id, o.reward),
        Outcome::Reset => "town reset".to_string(),
    }
}

fn print_state(state: &StateView) {
    println!(
        "{} - level {} ({}/{} xp), version {}",
        state.name, state.level, state.experience, state.xp_to_next_level, state.version
    );
    println!("  resources: {}", state.resources);
    println!(
        "  storage cap {}, energy {}/{}, population {}",
        state.totals.max_storage,
        state.totals.energy_used,
        state.totals.energy_total,
        state.totals.population
    );
    for building in &state.buildings {
        let status = match building.ready_in_secs {
            Some(0) => "ready".to_string(),
            Some(secs) => format!("ready in {}s", secs),
            None => "passive".to_string(),
        };
        println!(
            "  #{} {} L{} at ({}, {}) - {}",
            building.index, building.name, building.level, building.x, building.y, status
        );
    }
    println!("  active quests:");
    for quest in &state.quests {
        println!("    [{}/{}] {}", quest.progress, quest.count, quest.description);
    }
}
