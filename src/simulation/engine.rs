//! Creature engine - owns the registry and drives ticks
//!
//! A tick runs in two phases:
//! 1. `begin_tick`: pick creatures near the player, schedule them by
//!    perceptual delay, and evaluate each against a frozen snapshot
//!    (in parallel for large batches). Results are buffered.
//! 2. `apply_pending`: commit the buffered results in schedule order,
//!    resolving contention over vegetation and prey.
//!
//! Only a [`SimulationSession`] can run ticks. It holds the engine's
//! exclusive borrow, so there is exactly one driver at a time.

use std::sync::Arc;

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{CreatureId, PackId, Tick};
use crate::creature::state::CreatureState;
use crate::narrative::events::ImmersiveEvent;
use crate::narrative::message::NarrativeMessage;
use crate::narrative::translator::{Catalog, Locale, Translator};
use crate::simulation::evaluate::{evaluate_creature, CreatureUpdate, TickContext};
use crate::simulation::feeding::consume_vegetation;
use crate::simulation::herd::PackState;
use crate::simulation::scheduler::{dispatch_delay_ms, UpdateQueue};
use crate::spatial::sparse_hash::SparseHashGrid;
use crate::world::chunk::{TerrainMut, TerrainView};
use crate::world::player::PlayerSnapshot;

/// Cell size of the per-tick spatial index
const SPATIAL_CELL_SIZE: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Starvation,
    Predation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Death {
    pub creature: CreatureId,
    pub cause: DeathCause,
}

/// Everything a committed tick produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickOutcome {
    pub tick: Tick,
    /// Updates applied to the registry
    pub committed: usize,
    pub moved: usize,
    pub messages: Vec<NarrativeMessage>,
    pub events: Vec<ImmersiveEvent>,
    pub deaths: Vec<Death>,
    pub vegetation_eaten: f32,
    /// Total damage intents against the player
    pub player_damage: f32,
}

pub struct CreatureEngine {
    config: SimulationConfig,
    creatures: AHashMap<CreatureId, CreatureState>,
    queue: UpdateQueue,
    pending: Vec<CreatureUpdate>,
    /// Tick whose results await commit
    pending_tick: Option<Tick>,
    /// Events raised outside evaluation, released at the next commit
    outbox: Vec<ImmersiveEvent>,
    pack_cohesion: AHashMap<PackId, f32>,
    translator: Arc<dyn Translator>,
    locale: Locale,
    rng: ChaCha8Rng,
    tick: Tick,
}

impl CreatureEngine {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.engine.seed);
        Ok(Self {
            config,
            creatures: AHashMap::new(),
            queue: UpdateQueue::new(),
            pending: Vec::new(),
            pending_tick: None,
            outbox: Vec::new(),
            pack_cohesion: AHashMap::new(),
            translator: Arc::new(Catalog::builtin()),
            locale: Locale::default(),
            rng,
            tick: 0,
        })
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Take the single driving handle for this engine
    pub fn start_simulation(&mut self) -> SimulationSession<'_> {
        tracing::info!(creatures = self.creatures.len(), tick = self.tick, "Simulation session started");
        SimulationSession { engine: self }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn get(&self, id: CreatureId) -> Option<&CreatureState> {
        self.creatures.get(&id)
    }

    pub fn creatures(&self) -> impl Iterator<Item = &CreatureState> {
        self.creatures.values()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_tick.is_some()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the creature has an update queued or buffered
    pub fn is_scheduled(&self, id: CreatureId) -> bool {
        self.queue.contains(id) || self.pending.iter().any(|u| u.creature == id)
    }

    fn register(&mut self, creature: CreatureState) -> Result<CreatureId> {
        creature.validate()?;
        let id = creature.id;
        if self.creatures.contains_key(&id) {
            return Err(SimError::DuplicateCreature(id));
        }
        self.outbox.push(ImmersiveEvent::birth(
            id,
            &creature.species,
            creature.position,
            self.tick,
            self.translator.as_ref(),
        ));
        tracing::debug!(creature = %id, species = %creature.species, "Creature registered");
        self.creatures.insert(id, creature);
        Ok(id)
    }

    fn unregister(&mut self, id: CreatureId) -> Result<CreatureState> {
        let creature = self.creatures.remove(&id).ok_or(SimError::CreatureNotFound(id))?;
        let cancelled = self.queue.cancel(id);
        self.pending.retain(|u| u.creature != id);
        tracing::debug!(creature = %id, cancelled, "Creature unregistered");
        Ok(creature)
    }

    /// Pack snapshots for every pack with at least one registered member
    fn pack_states(&self) -> AHashMap<PackId, PackState> {
        let mut members: AHashMap<PackId, Vec<&CreatureState>> = AHashMap::new();
        for creature in self.creatures.values() {
            if let Some(pack) = creature.pack {
                members.entry(pack).or_default().push(creature);
            }
        }
        members
            .into_iter()
            .filter_map(|(pack, mut group)| {
                group.sort_by_key(|c| c.id);
                PackState::from_members(pack, &group, &self.config.herd).map(|state| (pack, state))
            })
            .collect()
    }

    /// Raise separation events for packs whose cohesion just fell below the
    /// pack-hunting threshold
    fn track_pack_cohesion(&mut self, packs: &AHashMap<PackId, PackState>, tick: Tick) {
        let threshold = self.config.herd.pack_hunt_cohesion;
        let mut ids: Vec<PackId> = packs.keys().copied().collect();
        ids.sort();

        for id in ids {
            let pack = &packs[&id];
            let previous = self.pack_cohesion.insert(id, pack.cohesion);
            if previous.is_some_and(|p| p >= threshold) && pack.cohesion < threshold {
                self.outbox.push(ImmersiveEvent::pack_separation(
                    pack.members.clone(),
                    pack.center_cell(),
                    tick,
                    self.translator.as_ref(),
                ));
            }
        }
        self.pack_cohesion.retain(|id, _| packs.contains_key(id));
    }

    fn begin_tick<W: TerrainView + Sync + ?Sized>(&mut self, world: &W, player: &PlayerSnapshot) -> Result<usize> {
        if let Some(tick) = self.pending_tick {
            return Err(SimError::UncommittedTick(tick));
        }
        self.tick += 1;
        let tick = self.tick;

        // Schedule in id order so the RNG stream is independent of map order
        let radius = self.config.engine.update_radius;
        let mut in_range: Vec<(CreatureId, i32)> = self
            .creatures
            .values()
            .map(|c| (c.id, c.position.chebyshev(&player.position)))
            .filter(|(_, distance)| *distance <= radius)
            .collect();
        in_range.sort();
        for (id, distance) in in_range {
            let delay = dispatch_delay_ms(distance, &self.config.engine, &mut self.rng);
            let seed = self.rng.gen();
            self.queue.push(id, delay, seed);
        }
        let scheduled = self.queue.drain_ordered();

        let packs = self.pack_states();
        self.track_pack_cohesion(&packs, tick);

        let mut spatial = SparseHashGrid::new(SPATIAL_CELL_SIZE);
        spatial.rebuild(self.creatures.values().map(|c| (c.id, c.position)));

        let ctx = TickContext {
            tick,
            player: *player,
            creatures: &self.creatures,
            spatial: &spatial,
            packs: &packs,
            world,
            config: &self.config,
            translator: self.translator.as_ref(),
            locale: self.locale,
        };

        // Use parallel for large batches, sequential for small
        let results: Vec<Result<CreatureUpdate>> = if scheduled.len() >= self.config.engine.parallel_threshold {
            scheduled.par_iter().map(|s| evaluate_creature(&ctx, s)).collect()
        } else {
            scheduled.iter().map(|s| evaluate_creature(&ctx, s)).collect()
        };

        let mut pending = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(update) => pending.push(update),
                Err(error) => tracing::debug!(tick, %error, "Creature update skipped"),
            }
        }

        tracing::debug!(tick, scheduled = scheduled.len(), computed = pending.len(), "Tick evaluated");
        let count = pending.len();
        self.pending = pending;
        self.pending_tick = Some(tick);
        Ok(count)
    }

    fn apply_pending<W: TerrainMut + ?Sized>(&mut self, world: &mut W) -> TickOutcome {
        let tick = self.pending_tick.take().unwrap_or(self.tick);
        let mut outcome = TickOutcome {
            tick,
            events: std::mem::take(&mut self.outbox),
            ..TickOutcome::default()
        };

        for update in std::mem::take(&mut self.pending) {
            // Eaten earlier in this commit
            if !self.creatures.contains_key(&update.creature) {
                continue;
            }
            let CreatureUpdate {
                creature: id,
                mut state,
                movement,
                feeding,
                predation,
                starved,
                messages,
                events,
                ..
            } = update;

            if let Some(kill) = predation {
                match self.creatures.remove(&kill.prey) {
                    Some(prey) => {
                        self.queue.cancel(prey.id);
                        state.gain_satiation(kill.satiation_gain);
                        outcome.events.push(ImmersiveEvent::predation(
                            prey.id,
                            &prey.species,
                            id,
                            &state.species,
                            prey.position,
                            tick,
                            self.translator.as_ref(),
                        ));
                        outcome.deaths.push(Death {
                            creature: prey.id,
                            cause: DeathCause::Predation,
                        });
                    }
                    None => tracing::debug!(predator = %id, prey = %kill.prey, "Prey already gone, kill discarded"),
                }
            }

            if let Some(intent) = feeding {
                match world.chunk_by_id_mut(intent.chunk) {
                    Some(chunk) => {
                        if let Some(meal) = consume_vegetation(&mut state, chunk, intent.requested, &self.config.feeding) {
                            outcome.vegetation_eaten += meal.eaten;
                        }
                    }
                    None => tracing::debug!(creature = %id, chunk = ?intent.chunk, "Meal chunk vanished"),
                }
            }

            outcome.player_damage += messages.iter().map(NarrativeMessage::player_damage).sum::<f32>();
            outcome.messages.extend(messages);
            outcome.events.extend(events);
            if movement.moved() {
                outcome.moved += 1;
            }
            outcome.committed += 1;

            if starved {
                self.creatures.remove(&id);
                outcome.deaths.push(Death {
                    creature: id,
                    cause: DeathCause::Starvation,
                });
            } else {
                self.creatures.insert(id, state);
            }
        }

        tracing::debug!(
            tick,
            committed = outcome.committed,
            deaths = outcome.deaths.len(),
            "Tick committed"
        );
        outcome
    }
}

/// Exclusive driver of a [`CreatureEngine`]
pub struct SimulationSession<'e> {
    engine: &'e mut CreatureEngine,
}

impl<'e> SimulationSession<'e> {
    pub fn engine(&self) -> &CreatureEngine {
        &*self.engine
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.engine.locale = locale;
    }

    /// Add a creature; its birth event is released with the next commit
    pub fn register(&mut self, creature: CreatureState) -> Result<CreatureId> {
        self.engine.register(creature)
    }

    /// Remove a creature and cancel any update queued or buffered for it
    pub fn unregister(&mut self, id: CreatureId) -> Result<CreatureState> {
        self.engine.unregister(id)
    }

    /// Schedule and evaluate the next tick; returns the number of buffered updates
    ///
    /// Fails with [`SimError::UncommittedTick`] while the previous tick's
    /// results have not been applied.
    pub fn begin_tick<W: TerrainView + Sync + ?Sized>(&mut self, world: &W, player: &PlayerSnapshot) -> Result<usize> {
        self.engine.begin_tick(world, player)
    }

    /// Commit buffered results to the registry and terrain
    pub fn apply_pending<W: TerrainMut + ?Sized>(&mut self, world: &mut W) -> TickOutcome {
        self.engine.apply_pending(world)
    }

    /// `begin_tick` followed by `apply_pending`
    pub fn step<W: TerrainMut + Sync + ?Sized>(&mut self, world: &mut W, player: &PlayerSnapshot) -> Result<TickOutcome> {
        self.engine.begin_tick(&*world, player)?;
        Ok(self.engine.apply_pending(world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::diet::TrophicLevel;
    use crate::creature::temperament::{BehaviorState, Disposition};
    use crate::narrative::events::EventKind;
    use crate::spatial::grid::GridPos;
    use crate::world::chunk::ChunkMap;

    fn engine() -> CreatureEngine {
        CreatureEngine::new(SimulationConfig::default()).unwrap()
    }

    fn field() -> ChunkMap {
        ChunkMap::filled(40, 40, 4, 1.0, 10.0)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = SimulationConfig::default();
        config.movement.move_interval = 0;
        assert!(CreatureEngine::new(config).is_err());
    }

    #[test]
    fn test_register_unregister_leaves_nothing_behind() {
        let mut engine = engine();
        let world = field();
        let player = PlayerSnapshot::new(GridPos::new(10, 10), 100.0);
        let mut session = engine.start_simulation();

        let id = session
            .register(CreatureState::new("deer", GridPos::new(12, 12), Disposition::Passive))
            .unwrap();
        session.begin_tick(&world, &player).unwrap();
        assert!(session.engine().is_scheduled(id));

        session.unregister(id).unwrap();
        assert!(session.engine().get(id).is_none());
        assert!(!session.engine().is_scheduled(id));
        assert!(matches!(session.unregister(id), Err(SimError::CreatureNotFound(_))));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut engine = engine();
        let mut session = engine.start_simulation();
        let creature = CreatureState::new("deer", GridPos::new(1, 1), Disposition::Passive);
        session.register(creature.clone()).unwrap();
        assert!(matches!(session.register(creature), Err(SimError::DuplicateCreature(_))));
    }

    #[test]
    fn test_begin_twice_without_commit_fails() {
        let mut engine = engine();
        let mut world = field();
        let player = PlayerSnapshot::new(GridPos::new(10, 10), 100.0);
        let mut session = engine.start_simulation();

        session.begin_tick(&world, &player).unwrap();
        assert!(matches!(session.begin_tick(&world, &player), Err(SimError::UncommittedTick(1))));

        session.apply_pending(&mut world);
        assert!(session.begin_tick(&world, &player).is_ok());
    }

    #[test]
    fn test_results_invisible_until_commit() {
        let mut engine = engine();
        let mut world = field();
        let player = PlayerSnapshot::new(GridPos::new(10, 10), 100.0);
        let mut session = engine.start_simulation();
        let id = session
            .register(CreatureState::new("deer", GridPos::new(11, 11), Disposition::Passive))
            .unwrap();

        // Reach a tick on which the move gate opens
        for _ in 0..4 {
            session.step(&mut world, &player).unwrap();
        }
        session.begin_tick(&world, &player).unwrap();
        assert_eq!(session.engine().get(id).unwrap().position, GridPos::new(11, 11));

        session.apply_pending(&mut world);
        let deer = session.engine().get(id).unwrap();
        assert_eq!(deer.behavior, BehaviorState::Fleeing);
        assert_ne!(deer.position, GridPos::new(11, 11));
    }

    #[test]
    fn test_out_of_range_creatures_are_not_updated() {
        let mut engine = engine();
        let mut world = field();
        let player = PlayerSnapshot::new(GridPos::new(0, 0), 100.0);
        let mut session = engine.start_simulation();
        session
            .register(CreatureState::new("deer", GridPos::new(30, 30), Disposition::Passive))
            .unwrap();

        assert_eq!(session.begin_tick(&world, &player).unwrap(), 0);
        let outcome = session.apply_pending(&mut world);
        assert_eq!(outcome.committed, 0);
    }

    #[test]
    fn test_birth_event_released_on_commit() {
        let mut engine = engine();
        let mut world = field();
        let player = PlayerSnapshot::new(GridPos::new(0, 0), 100.0);
        let mut session = engine.start_simulation();
        session
            .register(CreatureState::new("hare", GridPos::new(2, 2), Disposition::Passive))
            .unwrap();

        let outcome = session.step(&mut world, &player).unwrap();
        assert!(outcome.events.iter().any(|e| e.kind == EventKind::Birth));

        let outcome = session.step(&mut world, &player).unwrap();
        assert!(outcome.events.iter().all(|e| e.kind != EventKind::Birth));
    }

    #[test]
    fn test_shared_chunk_never_goes_negative() {
        let mut config = SimulationConfig::default();
        config.feeding.eat_chance = 1.0;
        let mut engine = CreatureEngine::new(config).unwrap();
        // One large chunk with barely enough food for a single meal
        let mut world = ChunkMap::filled(40, 40, 40, 1.0, 6.0);
        let player = PlayerSnapshot::new(GridPos::new(30, 30), 100.0);
        let mut session = engine.start_simulation();

        for x in 0..3 {
            let deer = CreatureState::new("deer", GridPos::new(20 + x * 4, 30), Disposition::Defensive)
                .with_trophic(TrophicLevel::Herbivore)
                .with_satiation(10.0, 100.0);
            session.register(deer).unwrap();
        }

        let outcome = session.step(&mut world, &player).unwrap();

        assert!(outcome.vegetation_eaten <= 6.0 + 1e-4);
        let chunk = world.get(world.id_at(GridPos::new(0, 0))).unwrap();
        assert!(chunk.vegetation_density >= 0.0);
        assert!((chunk.vegetation_density + outcome.vegetation_eaten - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_starved_creature_dies_at_commit() {
        let mut config = SimulationConfig::default();
        config.engine.starvation_grace_ticks = 0;
        let mut engine = CreatureEngine::new(config).unwrap();
        let mut world = field();
        let player = PlayerSnapshot::new(GridPos::new(5, 5), 100.0);
        let mut session = engine.start_simulation();
        let id = session
            .register(
                CreatureState::new("wolf", GridPos::new(6, 6), Disposition::Defensive)
                    .with_trophic(TrophicLevel::Carnivore)
                    .with_satiation(0.0, 100.0),
            )
            .unwrap();

        let outcome = session.step(&mut world, &player).unwrap();

        assert!(session.engine().get(id).is_none());
        assert!(outcome.deaths.contains(&Death {
            creature: id,
            cause: DeathCause::Starvation
        }));
        assert!(outcome.events.iter().any(|e| e.kind == EventKind::DeathStarvation));
    }
}
