//! Hunting and foraging evaluation
//!
//! Personality drives when a creature starts looking for food and how far it
//! will go; candidate food sources are ranked by a weighted score; predation
//! is a single roll whose odds favour faster, fiercer hunters but never reach
//! certainty.

use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::CreatureId;
use crate::creature::state::CreatureState;
use crate::creature::traits::CreatureTraits;
use crate::spatial::grid::GridPos;
use crate::world::chunk::Chunk;

/// Hunger (0-100) at which an average creature starts hunting
pub const BASE_HUNT_THRESHOLD: f32 = 70.0;

/// Upper bound on any predation attempt
pub const MAX_HUNT_SUCCESS: f32 = 0.95;

/// Satiation provided per unit of prey size
pub const PREY_NUTRITION_PER_SIZE: f32 = 40.0;

const DISTANCE_WEIGHT: f32 = 0.4;
const QUALITY_WEIGHT: f32 = 0.3;
const NUTRITION_WEIGHT: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    Plant,
    Animal,
    Item,
    Carcass,
}

/// A candidate meal found by a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSource {
    pub position: GridPos,
    pub kind: FoodKind,
    pub prey: Option<CreatureId>,
    /// 0-100
    pub quality: f32,
    /// 0-100
    pub nutrition: f32,
}

impl FoodSource {
    /// Grazing opportunity on a chunk
    pub fn plant(position: GridPos, chunk: &Chunk) -> Self {
        Self {
            position,
            kind: FoodKind::Plant,
            prey: None,
            // Hard terrain makes for poorer grazing
            quality: (60.0 - chunk.travel_cost).clamp(0.0, 100.0),
            nutrition: (chunk.vegetation_density * 10.0).clamp(0.0, 100.0),
        }
    }

    /// Another creature as prey
    pub fn prey(creature: &CreatureState) -> Self {
        Self {
            position: creature.position,
            kind: FoodKind::Animal,
            prey: Some(creature.id),
            // Slow, fearful prey is easier pickings
            quality: (100.0 - creature.traits.speed * 10.0 + creature.traits.fearfulness * 0.2)
                .clamp(0.0, 100.0),
            nutrition: (creature.traits.size * PREY_NUTRITION_PER_SIZE).clamp(0.0, 100.0),
        }
    }
}

/// Hunger level at which this creature starts to hunt
///
/// Greedy creatures hunt sooner, lazy ones later.
pub fn hunt_threshold(traits: &CreatureTraits) -> f32 {
    BASE_HUNT_THRESHOLD - traits.greediness / 10.0 + traits.laziness / 15.0
}

/// `hunger` is on the 0-100 scale of [`CreatureState::hunger_level`]
pub fn should_hunt(hunger: f32, traits: &CreatureTraits) -> bool {
    hunger >= hunt_threshold(traits)
}

/// How far (in cells) the creature will look for food
pub fn hunting_range(traits: &CreatureTraits) -> f32 {
    15.0 + traits.speed * 2.0 + (traits.greediness / 100.0).clamp(0.0, 1.0) * 10.0
}

/// Weighted score of a food source, 0-100
pub fn evaluate_food_source(source: &FoodSource, from: GridPos, hunting_range: f32) -> f32 {
    let distance = from.chebyshev(&source.position) as f32;
    let distance_factor = if hunting_range > 0.0 {
        (1.0 - distance / hunting_range).max(0.0)
    } else {
        0.0
    };
    let quality_factor = (source.quality / 100.0).clamp(0.0, 1.0);
    let nutrition_factor = (source.nutrition / 100.0).clamp(0.0, 1.0);

    (DISTANCE_WEIGHT * distance_factor + QUALITY_WEIGHT * quality_factor + NUTRITION_WEIGHT * nutrition_factor)
        * 100.0
}

/// Highest-scoring source within range, with its score
pub fn best_food_source(
    sources: impl IntoIterator<Item = FoodSource>,
    from: GridPos,
    hunting_range: f32,
) -> Option<(FoodSource, f32)> {
    sources
        .into_iter()
        .filter(|s| from.chebyshev(&s.position) as f32 <= hunting_range)
        .map(|s| {
            let score = evaluate_food_source(&s, from, hunting_range);
            (s, score)
        })
        .max_by_key(|(s, score)| (OrderedFloat(*score), std::cmp::Reverse(s.position)))
}

/// Probability that a predation attempt succeeds
pub fn hunt_success_chance(predator: &CreatureTraits, prey: &CreatureTraits, pack_bonus: f32) -> f32 {
    let speed_advantage = predator.speed - prey.speed;
    let chance = 0.5
        + (speed_advantage / 10.0) * 0.05
        + (predator.aggression / 100.0) * 0.1
        + (prey.fearfulness / 100.0) * 0.1
        + pack_bonus.max(0.0);
    chance.clamp(0.0, MAX_HUNT_SUCCESS)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HuntOutcome {
    pub chance: f32,
    pub success: bool,
}

/// Roll a predation attempt
pub fn attempt_hunt<R: Rng + ?Sized>(
    predator: &CreatureTraits,
    prey: &CreatureTraits,
    pack_bonus: f32,
    rng: &mut R,
) -> HuntOutcome {
    let chance = hunt_success_chance(predator, prey, pack_bonus);
    HuntOutcome {
        chance,
        success: rng.gen::<f32>() < chance,
    }
}

/// Satiation gained from a kill
///
/// Bigger predators get less out of the same carcass; a starving predator
/// (hunger above 80) wolfs it down for a 20% bonus. Never exceeds what the
/// predator has room for.
pub fn calculate_hunger_satisfaction(
    nutrition: f32,
    predator_size: f32,
    hunger: f32,
    remaining_capacity: f32,
) -> f32 {
    let mut satisfaction = nutrition / predator_size.max(0.1);
    if hunger > 80.0 {
        satisfaction *= 1.2;
    }
    satisfaction.min(remaining_capacity.max(0.0))
}
