//! Per-creature evaluation
//!
//! Each scheduled creature is evaluated against the tick snapshot in
//! isolation: hunger, target selection, the decision table, path upkeep,
//! attacks, movement and meal planning. Nothing here writes shared state.
//! Effects on other creatures or on terrain are returned as intents for the
//! commit step to apply in schedule order.
//!
//! All randomness comes from the update's own seed, so an evaluation gives
//! the same result on any thread.

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::behavior::state_machine::{decide, DecisionInput, FLEE_DISTANCE};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{CreatureId, PackId, Tick};
use crate::creature::diet::TrophicLevel;
use crate::creature::state::CreatureState;
use crate::creature::temperament::{BehaviorState, Disposition};
use crate::narrative::events::ImmersiveEvent;
use crate::narrative::message::NarrativeMessage;
use crate::narrative::translator::{Locale, Translator};
use crate::pathfinding::search::find_path;
use crate::pathfinding::tracker::{PathMode, PathTarget};
use crate::simulation::feeding::{decay_satiation, plan_plant_meal, relax_temperament, update_starvation};
use crate::simulation::herd::{
    calculate_flocking_movement, pack_hunting_bonus, prefers_pack, regroup_steps, should_pack_hunt,
    steer_direction, PackState,
};
use crate::simulation::hunting::{
    attempt_hunt, best_food_source, calculate_hunger_satisfaction, hunting_range, should_hunt, FoodSource,
};
use crate::simulation::movement::{execute_move, MoveDirective, MoveResult, MoveRules};
use crate::simulation::scheduler::ScheduledUpdate;
use crate::spatial::grid::GridPos;
use crate::spatial::sparse_hash::SparseHashGrid;
use crate::world::chunk::{ChunkId, TerrainView};
use crate::world::player::PlayerSnapshot;

/// Read-only inputs shared by every evaluation in a tick
pub struct TickContext<'a, W: ?Sized> {
    pub tick: Tick,
    pub player: PlayerSnapshot,
    pub creatures: &'a AHashMap<CreatureId, CreatureState>,
    pub spatial: &'a SparseHashGrid,
    pub packs: &'a AHashMap<PackId, PackState>,
    pub world: &'a W,
    pub config: &'a SimulationConfig,
    pub translator: &'a dyn Translator,
    pub locale: Locale,
}

/// Request to eat from a chunk, clamped to what is left at commit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedingIntent {
    pub chunk: ChunkId,
    pub requested: f32,
}

/// A successful kill, honored only if the prey is still alive at commit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredationIntent {
    pub prey: CreatureId,
    pub satiation_gain: f32,
}

/// Buffered result of one creature's evaluation
#[derive(Debug, Clone)]
pub struct CreatureUpdate {
    pub creature: CreatureId,
    pub delay_ms: u32,
    pub state: CreatureState,
    pub movement: MoveResult,
    pub feeding: Option<FeedingIntent>,
    pub predation: Option<PredationIntent>,
    pub starved: bool,
    pub messages: Vec<NarrativeMessage>,
    pub events: Vec<ImmersiveEvent>,
}

impl CreatureUpdate {
    fn new(scheduled: &ScheduledUpdate, state: CreatureState) -> Self {
        Self {
            creature: scheduled.creature,
            delay_ms: scheduled.delay_ms,
            state,
            movement: MoveResult::Held,
            feeding: None,
            predation: None,
            starved: false,
            messages: Vec::new(),
            events: Vec::new(),
        }
    }
}

/// What the creature is oriented toward this tick
#[derive(Debug, Clone, Copy)]
struct Target {
    position: GridPos,
    prey: Option<CreatureId>,
}

/// Path the creature should hold for its current behavior
#[derive(Debug, Clone, Copy)]
struct PathGoal {
    target: PathTarget,
    position: GridPos,
    mode: PathMode,
    recalculate: bool,
}

#[derive(Debug, Clone, Copy)]
struct MovePlan {
    directive: MoveDirective,
    path: Option<PathGoal>,
}

impl MovePlan {
    fn hold() -> Self {
        Self {
            directive: MoveDirective::Hold,
            path: None,
        }
    }

    fn direct(directive: MoveDirective) -> Self {
        Self { directive, path: None }
    }
}

/// Log key for a creature seen moving in a given state
pub fn narrative_key(behavior: BehaviorState) -> Option<&'static str> {
    match behavior {
        BehaviorState::Wandering => Some("narrative.wandering"),
        BehaviorState::Hunting => Some("narrative.hunting"),
        BehaviorState::Fleeing => Some("narrative.fleeing"),
        BehaviorState::Foraging => Some("narrative.foraging"),
        BehaviorState::Regrouping => Some("narrative.regrouping"),
        BehaviorState::Defending => Some("narrative.defending"),
        BehaviorState::Idle | BehaviorState::Stuck => None,
    }
}

/// Evaluate one scheduled creature against the snapshot
pub fn evaluate_creature<W: TerrainView + ?Sized>(
    ctx: &TickContext<'_, W>,
    scheduled: &ScheduledUpdate,
) -> Result<CreatureUpdate> {
    let config = ctx.config;
    let original = ctx
        .creatures
        .get(&scheduled.creature)
        .ok_or(SimError::CreatureNotFound(scheduled.creature))?;
    let mut creature = original.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(scheduled.seed);
    let mut events = Vec::new();
    let mut messages = Vec::new();

    // Hunger
    decay_satiation(&mut creature, ctx.tick, &config.hunger);
    relax_temperament(&mut creature, &config.feeding);
    if update_starvation(&mut creature, ctx.tick, config.engine.starvation_grace_ticks) {
        events.push(ImmersiveEvent::starvation(
            creature.id,
            &creature.species,
            creature.position,
            ctx.tick,
            ctx.translator,
        ));
        let mut update = CreatureUpdate::new(scheduled, creature);
        update.starved = true;
        update.events = events;
        return Ok(update);
    }

    let chunk = ctx
        .world
        .chunk_at(creature.position)
        .ok_or(SimError::MissingChunk(creature.position))?;
    creature.chunk = chunk.id;

    // Decision
    let target = select_target(&creature, ctx);
    let previous = creature.behavior;
    let distance = creature.position.chebyshev(&target.position);
    let decision = decide(&DecisionInput {
        disposition: creature.disposition,
        current: previous,
        distance,
        target: target.position,
        // Having picked out prey is reason enough to give chase
        is_hungry: creature.is_hungry(config.hunger.hungry_fraction) || target.prey.is_some(),
        has_valid_path: creature.has_valid_path(),
        search_range: creature.search_range(),
    });
    creature.behavior = decision.state;
    creature.target = decision.path_target;

    if creature.behavior == BehaviorState::Hunting && previous != BehaviorState::Hunting {
        events.push(ImmersiveEvent::chase_started(
            creature.id,
            &creature.species,
            creature.position,
            ctx.tick,
            ctx.translator,
        ));
    }

    let plan = match creature.behavior {
        BehaviorState::Hunting => MovePlan {
            directive: MoveDirective::Approach {
                to: target.position,
                steps: 1,
            },
            path: Some(PathGoal {
                target: target
                    .prey
                    .map(PathTarget::Creature)
                    .unwrap_or(PathTarget::Position(target.position)),
                position: target.position,
                mode: PathMode::Pursuing,
                recalculate: decision.recalculate_path,
            }),
        },
        BehaviorState::Fleeing => MovePlan::direct(MoveDirective::Flee { from: target.position }),
        // A stuck creature sits out one tick; immobile ones never leave idle
        BehaviorState::Idle
            if previous == BehaviorState::Stuck || creature.disposition == Disposition::Immobile =>
        {
            MovePlan::hold()
        }
        BehaviorState::Idle => refine_idle(&mut creature, previous, ctx, &mut rng, &mut events),
        _ => MovePlan::hold(),
    };

    update_path(&mut creature, plan.path, ctx);

    // Close-quarters: strike instead of moving
    let mut engaged = false;
    let mut predation = None;
    if creature.behavior == BehaviorState::Hunting && distance <= 1 {
        engaged = true;
        match target.prey {
            None => {
                if let Some(message) = melee_attack(&creature, ctx) {
                    messages.push(message);
                }
            }
            Some(prey_id) => {
                predation = hunt_prey(&creature, prey_id, ctx, &mut rng);
            }
        }
    }

    let movement = if engaged {
        MoveResult::Held
    } else {
        let rules = MoveRules {
            move_interval: config.movement.move_interval,
            blocking_cost: config.pathfinding.blocking_cost,
        };
        execute_move(&mut creature, plan.directive, ctx.world, ctx.tick, &rules, &mut rng)
    };
    if movement == MoveResult::Stuck {
        creature.behavior = BehaviorState::Stuck;
    }

    let in_view = creature.position.chebyshev(&ctx.player.position) <= config.engine.narrative_radius;
    let announce = movement.moved()
        || (creature.behavior == BehaviorState::Defending && previous != BehaviorState::Defending);
    if in_view && announce {
        if let Some(key) = narrative_key(creature.behavior) {
            let text = ctx
                .translator
                .translate(ctx.locale, key, &[("species", creature.species.as_str())]);
            messages.push(NarrativeMessage::narrative(text));
        }
    }

    // Meal planning against the snapshot; the commit clamps to what is left
    let feeding = if matches!(creature.behavior, BehaviorState::Fleeing | BehaviorState::Hunting) {
        None
    } else {
        ctx.world.chunk_at(creature.position).and_then(|chunk| {
            plan_plant_meal(&creature, chunk.vegetation_density, &config.feeding, &mut rng).map(|requested| {
                FeedingIntent {
                    chunk: chunk.id,
                    requested,
                }
            })
        })
    };

    let mut update = CreatureUpdate::new(scheduled, creature);
    update.movement = movement;
    update.feeding = feeding;
    update.predation = predation;
    update.messages = messages;
    update.events = events;
    Ok(update)
}

fn is_prey_for(hunter: &CreatureState, other: &CreatureState) -> bool {
    other.id != hunter.id && other.species != hunter.species && other.trophic != Some(TrophicLevel::Carnivore)
}

fn is_threat_to(creature: &CreatureState, other: &CreatureState) -> bool {
    other.id != creature.id
        && other.species != creature.species
        && other.disposition.is_predatory()
        && other.can_eat_meat()
}

/// Predators that want to hunt pick the best prey in range; everyone else
/// watches the player, or a closer hunter if one is breathing down their neck
fn select_target<W: TerrainView + ?Sized>(creature: &CreatureState, ctx: &TickContext<'_, W>) -> Target {
    let player = Target {
        position: ctx.player.position,
        prey: None,
    };

    if creature.disposition.is_predatory() {
        if !(creature.can_eat_meat() && should_hunt(creature.hunger_level(), &creature.traits)) {
            return player;
        }
        let range = hunting_range(&creature.traits);
        let mut candidates: Vec<&CreatureState> = ctx
            .spatial
            .query_radius(creature.position, range.floor() as i32)
            .into_iter()
            .filter_map(|(id, _)| ctx.creatures.get(&id))
            .filter(|other| is_prey_for(creature, other))
            .collect();
        candidates.sort_by_key(|c| c.id);

        return best_food_source(
            candidates.into_iter().map(FoodSource::prey),
            creature.position,
            range,
        )
        .map(|(food, _)| Target {
            position: food.position,
            prey: food.prey,
        })
        .unwrap_or(player);
    }

    let player_distance = creature.position.chebyshev(&ctx.player.position);
    ctx.spatial
        .query_radius(creature.position, FLEE_DISTANCE)
        .into_iter()
        .filter_map(|(id, _)| ctx.creatures.get(&id))
        .filter(|other| is_threat_to(creature, other))
        .min_by_key(|other| (other.position.chebyshev(&creature.position), other.id))
        .filter(|hunter| hunter.position.chebyshev(&creature.position) < player_distance)
        .map(|hunter| Target {
            position: hunter.position,
            prey: None,
        })
        .unwrap_or(player)
}

/// Give an idle creature something to do: regroup, forage, flock or wander
fn refine_idle<W: TerrainView + ?Sized>(
    creature: &mut CreatureState,
    previous: BehaviorState,
    ctx: &TickContext<'_, W>,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<ImmersiveEvent>,
) -> MovePlan {
    let config = ctx.config;
    let herd = &config.herd;
    let pack = creature
        .pack
        .and_then(|id| ctx.packs.get(&id))
        .filter(|pack| pack.size() > 1);

    if let Some(pack) = pack {
        if pack.is_lost(creature.position, herd) {
            if previous != BehaviorState::Regrouping {
                events.push(ImmersiveEvent::member_lost(
                    creature.id,
                    &creature.species,
                    creature.position,
                    ctx.tick,
                    ctx.translator,
                ));
            }
            let center = pack.center_cell();
            creature.behavior = BehaviorState::Regrouping;
            creature.target = Some(center);
            return MovePlan::direct(MoveDirective::Approach {
                to: center,
                steps: regroup_steps(herd),
            });
        }
    }

    if creature.can_eat_plants() && creature.is_hungry(config.hunger.hungry_fraction) {
        if let Some(food) = best_forage(creature, ctx) {
            creature.behavior = BehaviorState::Foraging;
            creature.target = Some(food);
            if food == creature.position {
                return MovePlan::hold();
            }
            return MovePlan {
                directive: MoveDirective::Approach { to: food, steps: 1 },
                path: Some(PathGoal {
                    target: PathTarget::Position(food),
                    position: food,
                    mode: PathMode::SeekingTarget,
                    recalculate: false,
                }),
            };
        }
    }

    if let Some(pack) = pack.filter(|_| prefers_pack(&creature.traits)) {
        let steer = calculate_flocking_movement(creature.position, &creature.traits, pack.center, herd);
        if let Some(direction) = steer_direction(steer) {
            creature.behavior = BehaviorState::Wandering;
            return MovePlan::direct(MoveDirective::Approach {
                to: creature.position.step(direction),
                steps: 1,
            });
        }
    }

    if rng.gen::<f32>() < config.engine.wander_chance {
        creature.behavior = BehaviorState::Wandering;
        return MovePlan::direct(MoveDirective::Random);
    }

    MovePlan::hold()
}

/// Best grazing cell within the creature's trophic range
fn best_forage<W: TerrainView + ?Sized>(creature: &CreatureState, ctx: &TickContext<'_, W>) -> Option<GridPos> {
    let radius = creature
        .trophic_range
        .unwrap_or(ctx.config.feeding.forage_radius)
        .max(0);
    let blocking = ctx.config.pathfinding.blocking_cost;

    // One candidate per chunk: its cell nearest the creature
    let mut nearest: AHashMap<ChunkId, GridPos> = AHashMap::new();
    for cell in creature.position.cells_within(radius) {
        let Some(chunk) = ctx.world.chunk_at(cell) else {
            continue;
        };
        if chunk.vegetation_density <= 0.0 || !chunk.is_passable(blocking) {
            continue;
        }
        let distance = creature.position.chebyshev(&cell);
        nearest
            .entry(chunk.id)
            .and_modify(|best| {
                if (distance, cell) < (creature.position.chebyshev(best), *best) {
                    *best = cell;
                }
            })
            .or_insert(cell);
    }

    let mut cells: Vec<GridPos> = nearest.values().copied().collect();
    cells.sort();
    let sources = cells
        .into_iter()
        .filter_map(|cell| ctx.world.chunk_at(cell).map(|chunk| FoodSource::plant(cell, chunk)));

    best_food_source(sources, creature.position, radius.max(1) as f32).map(|(food, _)| food.position)
}

/// Keep the creature's path in line with its current goal
fn update_path<W: TerrainView + ?Sized>(creature: &mut CreatureState, goal: Option<PathGoal>, ctx: &TickContext<'_, W>) {
    let start = creature.position;
    let Some(pathfinding) = creature.pathfinding.as_mut() else {
        return;
    };

    let Some(goal) = goal else {
        if pathfinding.state.has_path() || pathfinding.state.target.is_some() {
            pathfinding.state.clear();
        }
        return;
    };

    let retarget = pathfinding.state.target != Some(goal.target);
    if goal.recalculate || retarget || pathfinding.is_path_stale() {
        let blocking = ctx.config.pathfinding.blocking_cost;
        let world = ctx.world;
        let path = find_path(
            start,
            goal.position,
            &pathfinding.capability.search_options(),
            |pos| world.chunk_at(pos).map(|c| c.travel_cost).unwrap_or(blocking),
            |pos| world.chunk_at(pos).map(|c| c.is_passable(blocking)).unwrap_or(false),
        );
        tracing::trace!(creature = %creature.id, waypoints = path.len(), "Path recalculated");
        pathfinding.state.set_path(path, goal.target, goal.mode);
    } else {
        pathfinding.state.tick_age();
    }
}

/// Melee hit on an adjacent player, reported as a damage intent
fn melee_attack<W: TerrainView + ?Sized>(creature: &CreatureState, ctx: &TickContext<'_, W>) -> Option<NarrativeMessage> {
    let fierce = creature.trophic == Some(TrophicLevel::Carnivore) || creature.disposition == Disposition::Aggressive;
    if !fierce || !ctx.player.is_alive() {
        return None;
    }
    let damage = creature.traits.attack;
    let damage_text = format!("{:.0}", damage);
    let text = ctx.translator.translate(
        ctx.locale,
        "narrative.attack",
        &[("species", creature.species.as_str()), ("damage", damage_text.as_str())],
    );
    Some(NarrativeMessage::narrative(text).with_player_damage(damage))
}

/// Roll a kill against adjacent prey
fn hunt_prey<W: TerrainView + ?Sized>(
    creature: &CreatureState,
    prey_id: CreatureId,
    ctx: &TickContext<'_, W>,
    rng: &mut ChaCha8Rng,
) -> Option<PredationIntent> {
    let prey = ctx.creatures.get(&prey_id)?;
    let herd = &ctx.config.herd;
    let pack_bonus = creature
        .pack
        .and_then(|id| ctx.packs.get(&id))
        .filter(|pack| should_pack_hunt(pack, herd))
        .map(|pack| pack_hunting_bonus(pack.size(), pack.cohesion))
        .unwrap_or(0.0);

    let outcome = attempt_hunt(&creature.traits, &prey.traits, pack_bonus, rng);
    tracing::trace!(
        predator = %creature.id,
        prey = %prey_id,
        chance = outcome.chance,
        success = outcome.success,
        "Hunt attempt"
    );
    if !outcome.success {
        return None;
    }

    let food = FoodSource::prey(prey);
    Some(PredationIntent {
        prey: prey_id,
        satiation_gain: calculate_hunger_satisfaction(
            food.nutrition,
            creature.traits.size,
            creature.hunger_level(),
            creature.remaining_capacity(),
        ),
    })
}
