//! Simulation configuration with documented constants
//!
//! All tuning numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every section deserializes with
//! defaults, so a TOML file only needs to name the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for the creature simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub engine: EngineConfig,
    pub hunger: HungerConfig,
    pub feeding: FeedingConfig,
    pub pathfinding: PathfindingConfig,
    pub movement: MovementConfig,
    pub herd: HerdConfig,
}

/// Orchestration and scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Creatures farther than this from the player (Chebyshev) are not updated
    pub update_radius: i32,

    /// Creatures within this radius emit movement narration
    ///
    /// Keeps the message log readable when many creatures are in view.
    pub narrative_radius: i32,

    /// Upper distance bound of each dispatch delay band, nearest first
    ///
    /// Creatures beyond the last bound fall into the final band.
    pub delay_band_limits: [i32; 3],

    /// Delay range in milliseconds for each of the four bands
    ///
    /// The first band is normally `(0, 0)`: creatures next to the player
    /// react without perceptual lag.
    pub delay_band_ms: [(u32, u32); 4],

    /// Minimum scheduled creature count before using parallel evaluation
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    pub parallel_threshold: usize,

    /// Chance per tick that an idle, unattached creature starts wandering
    pub wander_chance: f32,

    /// Ticks a creature may spend at zero satiation before it starves
    pub starvation_grace_ticks: u64,

    /// Seed for the engine's deterministic random stream
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_radius: 10,
            narrative_radius: 5,
            delay_band_limits: [5, 10, 15],
            delay_band_ms: [(0, 0), (50, 150), (150, 300), (300, 500)],
            parallel_threshold: 256,
            wander_chance: 0.3,
            starvation_grace_ticks: 200,
            seed: 12345,
        }
    }
}

/// Satiation decay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HungerConfig {
    /// Satiation decays once every this many ticks
    pub decay_interval: u64,

    /// Satiation lost at each decay step
    pub decay_per_tick: f32,

    /// Fraction of max satiation below which a creature counts as hungry
    ///
    /// Hungry creatures of aggressive temperament hunt regardless of range.
    pub hungry_fraction: f32,

    /// Fraction of max satiation below which passive creatures turn territorial
    pub escalation_fraction: f32,
}

impl Default for HungerConfig {
    fn default() -> Self {
        Self {
            decay_interval: 10,
            decay_per_tick: 0.5,
            hungry_fraction: 0.3,
            escalation_fraction: 0.2,
        }
    }
}

/// Plant eating
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedingConfig {
    /// Creatures only try to eat below this fraction of max satiation
    ///
    /// Also the point at which hunger-escalated temperament relaxes.
    pub eat_threshold_fraction: f32,

    /// Probability that an eligible creature eats this tick
    pub eat_chance: f32,

    /// Maximum vegetation units removed from a chunk per meal
    pub consumption_per_eat: f32,

    /// Satiation gained per vegetation unit eaten
    pub plant_nutrition: f32,

    /// Chunk radius scanned when foraging without an explicit trophic range
    pub forage_radius: i32,
}

impl Default for FeedingConfig {
    fn default() -> Self {
        Self {
            eat_threshold_fraction: 0.6,
            eat_chance: 0.6,
            consumption_per_eat: 5.0,
            plant_nutrition: 0.5,
            forage_radius: 4,
        }
    }
}

/// Path search and staleness
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Paths older than this many ticks are recomputed
    pub max_path_age: u32,

    /// Consecutive failed steps before the path is abandoned
    pub max_failures: u32,

    /// Search radius (Chebyshev, from start) of a single A* query
    pub max_search_range: i32,

    /// Travel cost at or above which a cell is impassable
    pub blocking_cost: f32,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            max_path_age: 10,
            max_failures: 3,
            max_search_range: 20,
            blocking_cost: 100.0,
        }
    }
}

/// Movement pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Non-idle creatures move at most once every this many ticks
    pub move_interval: u64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self { move_interval: 5 }
    }
}

/// Pack coordination
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HerdConfig {
    /// Members closer than this to the pack center steer away (separation)
    pub separation_radius: f32,

    /// Spread at which cohesion starts to fall below 1.0
    pub max_spread: f32,

    /// Distance from center beyond which a member is lost
    pub lost_distance: f32,

    /// Speed multiplier for a lost member seeking its pack
    pub urgent_speed_multiplier: f32,

    /// Cohesion required before a pack hunts together
    pub pack_hunt_cohesion: f32,

    /// Mean aggression (0-100) required before a pack hunts together
    pub pack_hunt_aggression: f32,
}

impl Default for HerdConfig {
    fn default() -> Self {
        Self {
            separation_radius: 3.0,
            max_spread: 15.0,
            lost_distance: 20.0,
            urgent_speed_multiplier: 1.5,
            pack_hunt_cohesion: 0.6,
            pack_hunt_aggression: 40.0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let engine = &self.engine;
        if engine.update_radius <= 0 {
            return Err(SimError::InvalidConfig(format!(
                "update_radius ({}) must be positive",
                engine.update_radius
            )));
        }

        let limits = engine.delay_band_limits;
        if limits[0] >= limits[1] || limits[1] >= limits[2] {
            return Err(SimError::InvalidConfig(format!(
                "delay_band_limits {:?} must be strictly increasing",
                limits
            )));
        }

        if let Some((lo, hi)) = engine.delay_band_ms.iter().find(|(lo, hi)| lo > hi) {
            return Err(SimError::InvalidConfig(format!(
                "delay band ({}, {}) has min above max",
                lo, hi
            )));
        }

        if self.hunger.decay_interval == 0 {
            return Err(SimError::InvalidConfig("hunger.decay_interval must be at least 1".into()));
        }

        // Thresholds should be ordered: escalation < hungry < eat
        if self.hunger.escalation_fraction >= self.hunger.hungry_fraction
            || self.hunger.hungry_fraction >= self.feeding.eat_threshold_fraction
        {
            return Err(SimError::InvalidConfig(format!(
                "hunger thresholds must be ordered: escalation ({}) < hungry ({}) < eat ({})",
                self.hunger.escalation_fraction,
                self.hunger.hungry_fraction,
                self.feeding.eat_threshold_fraction
            )));
        }

        for (name, p) in [
            ("feeding.eat_chance", self.feeding.eat_chance),
            ("engine.wander_chance", engine.wander_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::InvalidConfig(format!("{} ({}) must be in [0, 1]", name, p)));
            }
        }

        if self.pathfinding.max_failures == 0 {
            return Err(SimError::InvalidConfig("pathfinding.max_failures must be at least 1".into()));
        }

        if self.movement.move_interval == 0 {
            return Err(SimError::InvalidConfig("movement.move_interval must be at least 1".into()));
        }

        if self.herd.max_spread <= 0.0 || self.herd.lost_distance <= self.herd.separation_radius {
            return Err(SimError::InvalidConfig(
                "herd distances must satisfy max_spread > 0 and lost_distance > separation_radius"
                    .into(),
            ));
        }

        Ok(())
    }
}
