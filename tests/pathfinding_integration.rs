//! Integration tests for pathfinding over chunked terrain
//!
//! Paths are searched against a ChunkMap and then walked with the movement
//! rules the engine uses, checking detours, approximate results and the
//! tracker's staleness bookkeeping.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fauna_sim::core::config::PathfindingConfig;
use fauna_sim::creature::{BehaviorState, CreatureState, Disposition};
use fauna_sim::pathfinding::{find_path, path_cost, PathCapability, PathMode, PathTarget};
use fauna_sim::simulation::{execute_move, MoveDirective, MoveResult, MoveRules};
use fauna_sim::spatial::GridPos;
use fauna_sim::world::{ChunkMap, TerrainView};

const BLOCKING: f32 = 100.0;

/// 16x16 one-cell chunks with a ridge at x = 5 from y = 0 up to `ridge_end`
fn ridge_world(ridge_end: i32) -> ChunkMap {
    let mut world = ChunkMap::filled(16, 16, 1, 1.0, 5.0);
    for y in 0..ridge_end {
        world.set(GridPos::new(5, y), BLOCKING, 0.0);
    }
    world
}

fn search(world: &ChunkMap, start: GridPos, goal: GridPos, capability: &PathCapability) -> Vec<GridPos> {
    find_path(
        start,
        goal,
        &capability.search_options(),
        |pos| world.chunk_at(pos).map_or(f32::INFINITY, |c| c.travel_cost),
        |pos| world.chunk_at(pos).map_or(false, |c| c.is_passable(BLOCKING)),
    )
}

fn walker(start: GridPos, capability: PathCapability) -> CreatureState {
    let mut creature =
        CreatureState::new("wolf", start, Disposition::Aggressive).with_pathfinding(capability);
    creature.behavior = BehaviorState::Hunting;
    creature
}

#[test]
fn test_detour_around_ridge_is_walkable() {
    let world = ridge_world(12);
    let capability = PathCapability::default();
    let start = GridPos::new(2, 2);
    let goal = GridPos::new(8, 2);

    let path = search(&world, start, goal, &capability);

    assert_eq!(path.last(), Some(&goal), "goal should be reachable around the ridge");
    assert!(path.iter().all(|p| p.x != 5 || p.y >= 12), "path crosses the ridge: {:?}", path);
    let mut previous = start;
    for step in &path {
        assert!(previous.is_adjacent(step), "gap between {:?} and {:?}", previous, step);
        previous = *step;
    }

    let straight = (start.x..=goal.x).skip(1).map(|x| GridPos::new(x, 2)).collect::<Vec<_>>();
    let flat = |_: GridPos| 1.0;
    assert!(path_cost(&path, flat) > path_cost(&straight, flat));
}

#[test]
fn test_sealed_goal_gives_closest_approach() {
    let world = ridge_world(16);
    let capability = PathCapability::default();

    let path = search(&world, GridPos::new(2, 2), GridPos::new(8, 2), &capability);

    let last = path.last().copied().expect("approximate search should return a partial path");
    assert_eq!(last, GridPos::new(4, 2));
}

#[test]
fn test_sealed_goal_without_approximation_is_empty() {
    let world = ridge_world(16);
    let capability = PathCapability {
        approximate: false,
        ..PathCapability::default()
    };

    let path = search(&world, GridPos::new(2, 2), GridPos::new(8, 2), &capability);
    assert!(path.is_empty());
}

#[test]
fn test_creature_walks_path_to_goal() {
    let world = ridge_world(12);
    let capability = PathCapability::default();
    let start = GridPos::new(2, 2);
    let goal = GridPos::new(8, 2);
    let mut creature = walker(start, capability.clone());
    creature.chunk = world.id_at(start);

    let path = search(&world, start, goal, &capability);
    let steps = path.len();
    creature
        .pathfinding
        .as_mut()
        .unwrap()
        .state
        .set_path(path, PathTarget::Position(goal), PathMode::SeekingTarget);

    let rules = MoveRules {
        move_interval: 1,
        blocking_cost: BLOCKING,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut moves = 0;
    for tick in 1..=100 {
        if creature.position == goal {
            break;
        }
        let result = execute_move(&mut creature, MoveDirective::FollowPath, &world, tick, &rules, &mut rng);
        assert!(result.moved(), "step {} failed with {:?}", tick, result);
        moves += 1;
    }

    assert_eq!(creature.position, goal);
    assert_eq!(moves, steps, "one waypoint per move");
    let tracker = &creature.pathfinding.as_ref().unwrap().state;
    assert!(!tracker.has_path());
    assert_eq!(tracker.mode, PathMode::Idle);
}

#[test]
fn test_path_through_changed_terrain_gets_stuck() {
    let mut world = ridge_world(0);
    let capability = PathCapability::from_config(&PathfindingConfig::default());
    let start = GridPos::new(2, 2);
    let goal = GridPos::new(8, 2);
    let mut creature = walker(start, capability.clone());
    creature.chunk = world.id_at(start);

    let path = search(&world, start, goal, &capability);
    assert_eq!(path.first(), Some(&GridPos::new(3, 2)));
    creature
        .pathfinding
        .as_mut()
        .unwrap()
        .state
        .set_path(path, PathTarget::Position(goal), PathMode::SeekingTarget);

    // A landslide blocks the first waypoint after the path was planned
    world.set(GridPos::new(3, 2), BLOCKING, 0.0);

    let rules = MoveRules {
        move_interval: 1,
        blocking_cost: BLOCKING,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut results = Vec::new();
    for tick in 1..=capability.max_failures as u64 {
        results.push(execute_move(&mut creature, MoveDirective::FollowPath, &world, tick, &rules, &mut rng));
    }

    assert_eq!(results.last(), Some(&MoveResult::Stuck));
    assert_eq!(creature.position, start);
    let tracker = &creature.pathfinding.as_ref().unwrap().state;
    assert_eq!(tracker.mode, PathMode::Stuck);
    assert!(tracker.is_path_stale(&capability));
}

#[test]
fn test_position_path_goes_stale_with_age() {
    let world = ridge_world(0);
    let capability = PathCapability::default();
    let goal = GridPos::new(10, 10);
    let mut pathfinding = walker(GridPos::new(0, 0), capability.clone()).pathfinding.unwrap();

    let path = search(&world, GridPos::new(0, 0), goal, &capability);
    pathfinding
        .state
        .set_path(path, PathTarget::Position(goal), PathMode::SeekingTarget);
    assert!(!pathfinding.is_path_stale());

    for _ in 0..=capability.max_path_age {
        pathfinding.state.tick_age();
    }
    assert!(pathfinding.is_path_stale(), "paths older than the limit are recomputed");
}
