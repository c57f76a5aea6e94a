//! Hunger decay and plant eating
//!
//! Satiation falls on a fixed tick interval. Plant eaters refill it by grazing
//! the chunk they stand on, which is the one place the simulation writes
//! shared world state. Eating is split into a pure plan step (eligibility and
//! the chance roll) and a commit step that mutates the chunk, so the engine can
//! plan against its snapshot and serialize the writes per chunk.

use rand::Rng;

use crate::core::config::{FeedingConfig, HungerConfig};
use crate::core::types::Tick;
use crate::creature::state::CreatureState;
use crate::creature::temperament::Disposition;
use crate::world::chunk::Chunk;

/// What hunger decay did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HungerChange {
    pub decayed: bool,
    /// Passive temperament turned territorial
    pub escalated: bool,
}

/// Result of a completed meal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedingOutcome {
    pub eaten: f32,
    pub satiation_gained: f32,
}

/// Apply periodic satiation decay
///
/// Starving passive creatures turn territorial. The change sticks until the
/// creature has eaten back up to the feeding threshold.
pub fn decay_satiation(creature: &mut CreatureState, tick: Tick, config: &HungerConfig) -> HungerChange {
    let mut change = HungerChange::default();

    if tick % config.decay_interval.max(1) == 0 {
        creature.satiation = (creature.satiation - config.decay_per_tick).max(0.0);
        change.decayed = true;
    }

    if creature.disposition == Disposition::Passive
        && creature.satiation < creature.max_satiation * config.escalation_fraction
    {
        creature.base_disposition = Some(creature.disposition);
        creature.disposition = Disposition::Territorial;
        change.escalated = true;
    }

    change
}

/// Restore the pre-hunger temperament once well fed; returns true if restored
pub fn relax_temperament(creature: &mut CreatureState, config: &FeedingConfig) -> bool {
    if creature.satiation < creature.max_satiation * config.eat_threshold_fraction {
        return false;
    }
    match creature.base_disposition.take() {
        Some(original) => {
            creature.disposition = original;
            true
        }
        None => false,
    }
}

/// Track time at zero satiation; returns true once the grace period has run out
pub fn update_starvation(creature: &mut CreatureState, tick: Tick, grace_ticks: u64) -> bool {
    if creature.satiation > 0.0 {
        creature.starving_since = None;
        return false;
    }
    let since = *creature.starving_since.get_or_insert(tick);
    tick.saturating_sub(since) >= grace_ticks
}

/// Decide whether the creature eats here this tick and how much it wants
///
/// Returns the requested vegetation amount, or None when the creature cannot
/// or does not eat.
pub fn plan_plant_meal<R: Rng + ?Sized>(
    creature: &CreatureState,
    vegetation_density: f32,
    config: &FeedingConfig,
    rng: &mut R,
) -> Option<f32> {
    if !creature.can_eat_plants() {
        return None;
    }
    if creature.satiation >= creature.max_satiation * config.eat_threshold_fraction {
        return None;
    }
    if vegetation_density <= 0.0 {
        return None;
    }
    if rng.gen::<f32>() >= config.eat_chance {
        return None;
    }
    Some(config.consumption_per_eat.min(vegetation_density))
}

/// Remove up to `requested` vegetation from the chunk and feed the creature
pub fn consume_vegetation(
    creature: &mut CreatureState,
    chunk: &mut Chunk,
    requested: f32,
    config: &FeedingConfig,
) -> Option<FeedingOutcome> {
    let eaten = requested.min(chunk.vegetation_density).max(0.0);
    if eaten <= 0.0 {
        return None;
    }
    chunk.vegetation_density -= eaten;
    let satiation_gained = creature.gain_satiation(eaten * config.plant_nutrition);
    Some(FeedingOutcome {
        eaten,
        satiation_gained,
    })
}

/// Try to graze the given chunk in one step
pub fn attempt_eat_plants<R: Rng + ?Sized>(
    creature: &mut CreatureState,
    chunk: &mut Chunk,
    config: &FeedingConfig,
    rng: &mut R,
) -> Option<FeedingOutcome> {
    let requested = plan_plant_meal(creature, chunk.vegetation_density, config, rng)?;
    consume_vegetation(creature, chunk, requested, config)
}
