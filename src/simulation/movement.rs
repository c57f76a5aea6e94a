//! Movement execution
//!
//! A creature with an active path always follows it. Without one it falls
//! back to the directive chosen by the engine for its behavior. Every step is
//! validated against terrain before the creature is mutated.

use rand::Rng;

use crate::core::types::Tick;
use crate::creature::state::CreatureState;
use crate::spatial::grid::{Direction, GridPos};
use crate::world::chunk::{Chunk, TerrainView};

/// Fallback movement when no path is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirective {
    /// Only move along an existing path
    FollowPath,
    /// Step directly away from a threat
    Flee { from: GridPos },
    /// Step directly toward a cell, up to `steps` cells this move
    Approach { to: GridPos, steps: u32 },
    Random,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Moved { from: GridPos, to: GridPos, chunk_changed: bool },
    /// Destination rejected; the creature was not touched
    Blocked { at: GridPos },
    /// Path failures exhausted; the creature is now stuck
    Stuck,
    Held,
    /// Moved too recently
    NotDue,
}

impl MoveResult {
    pub fn moved(&self) -> bool {
        matches!(self, MoveResult::Moved { .. })
    }
}

/// Per-tick movement parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRules {
    pub move_interval: u64,
    pub blocking_cost: f32,
}

/// The destination chunk, if the destination can be entered
pub fn is_valid_move<W: TerrainView + ?Sized>(world: &W, dest: GridPos, blocking_cost: f32) -> Option<&Chunk> {
    world.chunk_at(dest).filter(|chunk| chunk.is_passable(blocking_cost))
}

pub fn is_move_due(creature: &CreatureState, tick: Tick, move_interval: u64) -> bool {
    tick >= creature.last_move_tick.saturating_add(move_interval)
}

/// One step away from `threat`
///
/// An axis with no separation is broken randomly so a creature standing in
/// line with its threat still veers off.
pub fn flee_step<R: Rng + ?Sized>(position: GridPos, threat: GridPos, rng: &mut R) -> GridPos {
    let (tx, ty) = position.sign_toward(&threat);
    let mut pick = |toward: i32| {
        if toward == 0 {
            if rng.gen_bool(0.5) {
                1
            } else {
                -1
            }
        } else {
            -toward
        }
    };
    let dx = pick(tx);
    let dy = pick(ty);
    position.offset(dx, dy)
}

/// One step toward `target` (or `position` itself if already there)
pub fn approach_step(position: GridPos, target: GridPos) -> GridPos {
    let (dx, dy) = position.sign_toward(&target);
    position.offset(dx, dy)
}

pub fn random_step<R: Rng + ?Sized>(position: GridPos, rng: &mut R) -> GridPos {
    let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
    position.step(direction)
}

/// Move the creature to `dest` if terrain allows
pub fn try_step<W: TerrainView + ?Sized>(
    creature: &mut CreatureState,
    dest: GridPos,
    world: &W,
    tick: Tick,
    blocking_cost: f32,
) -> MoveResult {
    let Some(chunk) = is_valid_move(world, dest, blocking_cost) else {
        return MoveResult::Blocked { at: dest };
    };
    let from = creature.position;
    let chunk_changed = chunk.id != creature.chunk;
    creature.position = dest;
    if chunk_changed {
        creature.chunk = chunk.id;
    }
    creature.last_move_tick = tick;
    MoveResult::Moved {
        from,
        to: dest,
        chunk_changed,
    }
}

/// Advance one waypoint, recording a failure if the step is refused
fn follow_path<W: TerrainView + ?Sized>(
    creature: &mut CreatureState,
    waypoint: GridPos,
    world: &W,
    tick: Tick,
    rules: &MoveRules,
) -> MoveResult {
    let reachable = creature.position.chebyshev(&waypoint) <= 1;
    let result = if reachable {
        try_step(creature, waypoint, world, tick, rules.blocking_cost)
    } else {
        MoveResult::Blocked { at: waypoint }
    };

    let Some(pathfinding) = creature.pathfinding.as_mut() else {
        return result;
    };
    if result.moved() {
        pathfinding.state.advance_along_path();
        result
    } else if pathfinding.mark_path_failure() {
        MoveResult::Stuck
    } else {
        result
    }
}

/// Move once, honoring the move gate and path priority
pub fn execute_move<W: TerrainView + ?Sized, R: Rng + ?Sized>(
    creature: &mut CreatureState,
    directive: MoveDirective,
    world: &W,
    tick: Tick,
    rules: &MoveRules,
    rng: &mut R,
) -> MoveResult {
    if creature.behavior.is_stationary() || directive == MoveDirective::Hold {
        return MoveResult::Held;
    }
    if !is_move_due(creature, tick, rules.move_interval) {
        return MoveResult::NotDue;
    }

    let waypoint = creature
        .pathfinding
        .as_ref()
        .and_then(|p| p.state.next_waypoint());
    if let Some(waypoint) = waypoint {
        return follow_path(creature, waypoint, world, tick, rules);
    }

    match directive {
        MoveDirective::FollowPath | MoveDirective::Hold => MoveResult::Held,
        MoveDirective::Flee { from } => {
            let dest = flee_step(creature.position, from, rng);
            try_step(creature, dest, world, tick, rules.blocking_cost)
        }
        MoveDirective::Random => {
            let dest = random_step(creature.position, rng);
            try_step(creature, dest, world, tick, rules.blocking_cost)
        }
        MoveDirective::Approach { to, steps } => {
            let start = creature.position;
            let start_chunk = creature.chunk;
            let mut last = MoveResult::Held;
            for _ in 0..steps.max(1) {
                if creature.position == to {
                    break;
                }
                let dest = approach_step(creature.position, to);
                last = try_step(creature, dest, world, tick, rules.blocking_cost);
                if !last.moved() {
                    break;
                }
            }
            // A partial approach still counts as one move
            if creature.position != start {
                MoveResult::Moved {
                    from: start,
                    to: creature.position,
                    chunk_changed: creature.chunk != start_chunk,
                }
            } else {
                last
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::temperament::{BehaviorState, Disposition};
    use crate::pathfinding::tracker::{PathCapability, PathMode, PathTarget};
    use crate::world::chunk::ChunkMap;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const RULES: MoveRules = MoveRules {
        move_interval: 5,
        blocking_cost: 100.0,
    };

    fn walker(x: i32, y: i32) -> CreatureState {
        let mut creature = CreatureState::new("deer", GridPos::new(x, y), Disposition::Passive);
        creature.behavior = BehaviorState::Wandering;
        creature
    }

    fn field() -> ChunkMap {
        ChunkMap::filled(20, 20, 1, 1.0, 5.0)
    }

    #[test]
    fn test_blocked_move_leaves_creature_untouched() {
        let mut world = field();
        world.set(GridPos::new(6, 5), 100.0, 0.0);
        let mut creature = walker(5, 5);
        let before = creature.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = execute_move(
            &mut creature,
            MoveDirective::Approach {
                to: GridPos::new(9, 5),
                steps: 1,
            },
            &world,
            10,
            &RULES,
            &mut rng,
        );

        assert_eq!(result, MoveResult::Blocked { at: GridPos::new(6, 5) });
        assert_eq!(creature, before);
    }

    #[test]
    fn test_valid_move_updates_position_chunk_and_tick() {
        let world = field();
        let mut creature = walker(5, 5);
        creature.chunk = world.id_at(creature.position);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = execute_move(
            &mut creature,
            MoveDirective::Approach {
                to: GridPos::new(9, 9),
                steps: 1,
            },
            &world,
            10,
            &RULES,
            &mut rng,
        );

        assert!(result.moved());
        assert_eq!(creature.position, GridPos::new(6, 6));
        assert_eq!(creature.chunk, world.id_at(GridPos::new(6, 6)));
        assert_eq!(creature.last_move_tick, 10);
    }

    #[test]
    fn test_move_gate() {
        let world = field();
        let mut creature = walker(5, 5);
        creature.last_move_tick = 8;
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = execute_move(&mut creature, MoveDirective::Random, &world, 10, &RULES, &mut rng);
        assert_eq!(result, MoveResult::NotDue);
        assert_eq!(creature.position, GridPos::new(5, 5));

        let result = execute_move(&mut creature, MoveDirective::Random, &world, 13, &RULES, &mut rng);
        assert!(result.moved());
    }

    #[test]
    fn test_stationary_behaviors_hold() {
        let world = field();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for behavior in [BehaviorState::Idle, BehaviorState::Defending, BehaviorState::Stuck] {
            let mut creature = walker(5, 5);
            creature.behavior = behavior;
            let result = execute_move(&mut creature, MoveDirective::Random, &world, 10, &RULES, &mut rng);
            assert_eq!(result, MoveResult::Held, "{} should not move", behavior);
        }
    }

    #[test]
    fn test_flee_moves_away_and_breaks_ties() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let pos = GridPos::new(5, 5);

        let dest = flee_step(pos, GridPos::new(4, 4), &mut rng);
        assert_eq!(dest, GridPos::new(6, 6));

        for _ in 0..20 {
            let dest = flee_step(pos, GridPos::new(5, 2), &mut rng);
            assert_eq!(dest.y, 6);
            assert!(dest.x == 4 || dest.x == 6);
        }
    }

    #[test]
    fn test_urgent_approach_takes_two_steps() {
        let world = field();
        let mut creature = walker(0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = execute_move(
            &mut creature,
            MoveDirective::Approach {
                to: GridPos::new(10, 0),
                steps: 2,
            },
            &world,
            10,
            &RULES,
            &mut rng,
        );

        assert!(result.moved());
        assert_eq!(creature.position, GridPos::new(2, 0));
    }

    #[test]
    fn test_path_takes_priority_and_advances() {
        let world = field();
        let mut creature = walker(0, 0).with_pathfinding(PathCapability::default());
        if let Some(pf) = creature.pathfinding.as_mut() {
            pf.state.set_path(
                vec![GridPos::new(0, 1), GridPos::new(0, 2)],
                PathTarget::Position(GridPos::new(0, 2)),
                PathMode::SeekingTarget,
            );
        }
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = execute_move(
            &mut creature,
            MoveDirective::Approach {
                to: GridPos::new(5, 0),
                steps: 1,
            },
            &world,
            10,
            &RULES,
            &mut rng,
        );

        assert!(result.moved());
        assert_eq!(creature.position, GridPos::new(0, 1));
        let pf = creature.pathfinding.as_ref().unwrap();
        assert_eq!(pf.state.next_waypoint(), Some(GridPos::new(0, 2)));
    }

    #[test]
    fn test_repeated_path_failures_leave_creature_stuck() {
        let mut world = field();
        world.set(GridPos::new(0, 1), 150.0, 0.0);
        let mut creature = walker(0, 0).with_pathfinding(PathCapability::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut last = MoveResult::Held;
        for attempt in 0..3 {
            if let Some(pf) = creature.pathfinding.as_mut() {
                if !pf.state.has_path() {
                    pf.state.set_path(
                        vec![GridPos::new(0, 1)],
                        PathTarget::Position(GridPos::new(0, 1)),
                        PathMode::SeekingTarget,
                    );
                }
            }
            last = execute_move(
                &mut creature,
                MoveDirective::FollowPath,
                &world,
                10 + attempt * 5,
                &RULES,
                &mut rng,
            );
        }

        assert_eq!(last, MoveResult::Stuck);
        assert_eq!(creature.position, GridPos::new(0, 0));
        assert_eq!(creature.pathfinding.as_ref().unwrap().state.mode, PathMode::Stuck);
    }

    #[test]
    fn test_missing_chunk_is_invalid() {
        let world = field();
        assert!(is_valid_move(&world, GridPos::new(-1, 0), 100.0).is_none());
        assert!(is_valid_move(&world, GridPos::new(3, 3), 100.0).is_some());
    }
}
