//! Fauna Sim - demo driver
//!
//! Builds a small demo field, spawns a mixed population around the player
//! and runs the creature engine for a number of ticks, printing the message
//! log (or one JSON outcome per tick).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::runtime::Runtime;

use fauna_sim::core::config::SimulationConfig;
use fauna_sim::core::error::Result;
use fauna_sim::core::types::PackId;
use fauna_sim::creature::{CreatureState, CreatureTraits, Disposition, TrophicLevel};
use fauna_sim::narrative::{should_display_event, Catalog, Locale};
use fauna_sim::pathfinding::PathCapability;
use fauna_sim::simulation::{CreatureEngine, SimulationSession, TickOutcome};
use fauna_sim::spatial::GridPos;
use fauna_sim::world::{ChunkMap, PlayerSnapshot};

const WORLD_SIZE: i32 = 64;
const CHUNK_SIZE: i32 = 4;

/// Run the creature simulation on a demo field
#[derive(Parser, Debug)]
#[command(name = "fauna-sim")]
#[command(about = "Run the creature simulation on a demo field")]
struct Args {
    /// TOML file overriding simulation settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// TOML file with extra or replacement message texts
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Message language (en or vi)
    #[arg(long, default_value = "en")]
    locale: String,

    /// Number of ticks to run
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Overrides the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Creatures to spawn
    #[arg(long, default_value_t = 40)]
    creatures: usize,

    /// Real-time pacing between ticks in milliseconds (0 = as fast as possible)
    #[arg(long, default_value_t = 0)]
    tick_ms: u64,

    /// Print each tick outcome as a JSON line
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.engine.seed = seed;
    }
    let locale: Locale = args.locale.parse()?;
    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };

    tracing::info!(seed = config.engine.seed, ticks = args.ticks, "Fauna Sim starting");

    let mut rng = ChaCha8Rng::seed_from_u64(config.engine.seed);
    let mut world = demo_world();
    let view_radius = config.engine.narrative_radius * 2;
    let pathfinding = PathCapability::from_config(&config.pathfinding);
    let mut player = PlayerSnapshot::new(GridPos::new(WORLD_SIZE / 2, WORLD_SIZE / 2), 100.0);

    let mut engine = CreatureEngine::new(config)?
        .with_translator(Arc::new(catalog))
        .with_locale(locale);
    let mut session = engine.start_simulation();
    spawn_population(&mut session, args.creatures, player.position, &pathfinding, &mut rng)?;

    // Pacing only needs a timer, not a full async game loop
    let rt = Runtime::new()?;
    let mut interval = (args.tick_ms > 0).then(|| {
        let _guard = rt.enter();
        tokio::time::interval(Duration::from_millis(args.tick_ms))
    });

    for _ in 0..args.ticks {
        if let Some(interval) = interval.as_mut() {
            rt.block_on(interval.tick());
        }

        let outcome = session.step(&mut world, &player)?;
        player.health = (player.health - outcome.player_damage).max(0.0);
        report(&outcome, &player, view_radius, locale, args.json)?;

        if !player.is_alive() {
            println!("You have been overwhelmed by the wild.");
            break;
        }
        // The player drifts slowly east so the update radius sweeps the field
        if outcome.tick % 20 == 0 {
            player.position = GridPos::new((player.position.x + 1).min(WORLD_SIZE - 1), player.position.y);
        }
    }

    let engine = session.engine();
    tracing::info!(
        survivors = engine.len(),
        vegetation = world.total_vegetation(),
        player_health = player.health,
        "Simulation finished"
    );
    Ok(())
}

fn report(outcome: &TickOutcome, player: &PlayerSnapshot, view_radius: i32, locale: Locale, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(outcome)?);
        return Ok(());
    }
    for message in &outcome.messages {
        println!("[{:>4}] {}", outcome.tick, message.text);
    }
    for event in outcome
        .events
        .iter()
        .filter(|e| should_display_event(e, player, view_radius))
    {
        println!("[{:>4}] * {}", outcome.tick, event.text.get(locale));
    }
    Ok(())
}

/// Uniform grassland with a rocky ridge, a marsh and a lush meadow
fn demo_world() -> ChunkMap {
    let mut world = ChunkMap::filled(WORLD_SIZE, WORLD_SIZE, CHUNK_SIZE, 1.0, 8.0);
    for y in (8..40).step_by(CHUNK_SIZE as usize) {
        world.set(GridPos::new(20, y), 100.0, 0.0);
    }
    for x in (40..56).step_by(CHUNK_SIZE as usize) {
        for y in (44..56).step_by(CHUNK_SIZE as usize) {
            world.set(GridPos::new(x, y), 6.0, 3.0);
        }
    }
    for x in (24..40).step_by(CHUNK_SIZE as usize) {
        for y in (36..48).step_by(CHUNK_SIZE as usize) {
            world.set(GridPos::new(x, y), 1.0, 40.0);
        }
    }
    world
}

struct Species {
    name: &'static str,
    disposition: Disposition,
    trophic: TrophicLevel,
    traits: CreatureTraits,
    pack: Option<PackId>,
    pathfinding: bool,
}

fn roster() -> Vec<Species> {
    vec![
        Species {
            name: "wolf",
            disposition: Disposition::Aggressive,
            trophic: TrophicLevel::Carnivore,
            traits: CreatureTraits {
                speed: 4.0,
                attack: 8.0,
                aggression: 70.0,
                sociability: 75.0,
                greediness: 60.0,
                ..CreatureTraits::default()
            },
            pack: Some(PackId(1)),
            pathfinding: true,
        },
        Species {
            name: "deer",
            disposition: Disposition::Passive,
            trophic: TrophicLevel::Herbivore,
            traits: CreatureTraits {
                speed: 3.0,
                fearfulness: 70.0,
                sociability: 60.0,
                size: 1.5,
                ..CreatureTraits::default()
            },
            pack: Some(PackId(2)),
            pathfinding: true,
        },
        Species {
            name: "boar",
            disposition: Disposition::Defensive,
            trophic: TrophicLevel::Omnivore,
            traits: CreatureTraits {
                attack: 6.0,
                aggression: 45.0,
                size: 1.2,
                ..CreatureTraits::default()
            },
            pack: None,
            pathfinding: false,
        },
        Species {
            name: "hare",
            disposition: Disposition::Passive,
            trophic: TrophicLevel::Herbivore,
            traits: CreatureTraits {
                speed: 5.0,
                size: 0.4,
                fearfulness: 85.0,
                ..CreatureTraits::default()
            },
            pack: None,
            pathfinding: false,
        },
        Species {
            name: "spider",
            disposition: Disposition::Ambush,
            trophic: TrophicLevel::Carnivore,
            traits: CreatureTraits {
                speed: 1.0,
                attack: 4.0,
                size: 0.3,
                ..CreatureTraits::default()
            },
            pack: None,
            pathfinding: false,
        },
    ]
}

fn spawn_population(
    session: &mut SimulationSession<'_>,
    count: usize,
    around: GridPos,
    pathfinding: &PathCapability,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    let roster = roster();
    let spread = 14;
    for i in 0..count {
        let species = &roster[i % roster.len()];
        // Pack animals start bunched together, the rest scatter
        let position = match species.pack {
            Some(PackId(p)) => {
                let anchor = around.offset(if p == 1 { -8 } else { 8 }, -6);
                anchor.offset(rng.gen_range(-2..=2), rng.gen_range(-2..=2))
            }
            None => around.offset(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread)),
        };
        let position = GridPos::new(
            position.x.clamp(0, WORLD_SIZE - 1),
            position.y.clamp(0, WORLD_SIZE - 1),
        );

        let mut creature = CreatureState::new(species.name, position, species.disposition)
            .with_trophic(species.trophic)
            .with_traits(species.traits.clone())
            .with_satiation(rng.gen_range(25.0..100.0), 100.0)
            .with_trophic_range(4);
        if let Some(pack) = species.pack {
            creature = creature.with_pack(pack);
        }
        if species.pathfinding {
            creature = creature.with_pathfinding(pathfinding.clone());
        }
        session.register(creature)?;
    }
    tracing::info!(count, "Population spawned");
    Ok(())
}
