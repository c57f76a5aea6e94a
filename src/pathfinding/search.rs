//! A* pathfinding over the terrain grid
//!
//! Respects per-cell travel cost, 4- or 8-directional movement, and a search
//! radius. With approximation enabled an unreachable goal still yields the
//! best partial path toward it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::spatial::grid::{Direction, GridPos};

/// Parameters for a single search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Cells farther than this (Chebyshev) from the start are never expanded
    pub max_range: i32,
    pub allow_diagonal: bool,
    /// Return a partial path toward an unreachable goal
    pub approximate: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_range: 20,
            allow_diagonal: true,
            approximate: false,
        }
    }
}

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    pos: GridPos,
    f_cost: f32, // g_cost + heuristic
    h_cost: f32,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; prefer nodes nearer the goal on ties
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.h_cost.partial_cmp(&self.h_cost).unwrap_or(Ordering::Equal))
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Admissible distance estimate assuming the cheapest (1.0) cell cost
fn heuristic(a: GridPos, b: GridPos, allow_diagonal: bool) -> f32 {
    let dx = (a.x - b.x).abs() as f32;
    let dy = (a.y - b.y).abs() as f32;
    if allow_diagonal {
        // Octile distance
        let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
        hi + (std::f32::consts::SQRT_2 - 1.0) * lo
    } else {
        dx + dy
    }
}

/// Find a path from `start` to `goal`
///
/// The returned waypoints exclude `start` and end at `goal` (or, when
/// approximating, at the explored cell closest to it). An empty list means
/// "no movement": start equals goal, or the goal is unreachable and
/// approximation is off.
///
/// `terrain_cost` is the cost of entering a cell and is floored at 1.0 so
/// the heuristic stays admissible. `is_walkable` gates entry entirely.
pub fn find_path<C, W>(
    start: GridPos,
    goal: GridPos,
    options: &SearchOptions,
    terrain_cost: C,
    is_walkable: W,
) -> Vec<GridPos>
where
    C: Fn(GridPos) -> f32,
    W: Fn(GridPos) -> bool,
{
    if start == goal {
        return Vec::new();
    }

    let diagonal = options.allow_diagonal;
    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<GridPos, GridPos> = AHashMap::new();
    let mut g_scores: AHashMap<GridPos, f32> = AHashMap::new();

    let start_h = heuristic(start, goal, diagonal);
    g_scores.insert(start, 0.0);
    open_set.push(PathNode {
        pos: start,
        f_cost: start_h,
        h_cost: start_h,
    });

    // Closest explored cell to the goal, for approximate results
    let mut best = (start, start_h, 0.0_f32);

    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            return reconstruct_path(&came_from, start, goal);
        }

        let current_g = *g_scores.get(&current.pos).unwrap_or(&f32::INFINITY);

        // Skip stale heap entries
        if current.f_cost > current_g + current.h_cost + f32::EPSILON {
            continue;
        }

        if current.h_cost < best.1 || (current.h_cost == best.1 && current_g < best.2) {
            best = (current.pos, current.h_cost, current_g);
        }

        let directions: &[Direction] = if diagonal {
            &Direction::ALL
        } else {
            &Direction::CARDINAL
        };

        for direction in directions {
            let neighbor = current.pos.step(*direction);

            if neighbor.chebyshev(&start) > options.max_range {
                continue;
            }
            if !is_walkable(neighbor) {
                continue;
            }

            // No cutting corners around blocked cells
            if direction.is_diagonal() {
                let (dx, dy) = direction.delta();
                if !is_walkable(current.pos.offset(dx, 0)) || !is_walkable(current.pos.offset(0, dy)) {
                    continue;
                }
            }

            let cell_cost = terrain_cost(neighbor).max(1.0);
            if !cell_cost.is_finite() {
                continue;
            }
            let step_cost = if direction.is_diagonal() {
                cell_cost * std::f32::consts::SQRT_2
            } else {
                cell_cost
            };

            let tentative_g = current_g + step_cost;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.pos);
                g_scores.insert(neighbor, tentative_g);

                let h_cost = heuristic(neighbor, goal, diagonal);
                open_set.push(PathNode {
                    pos: neighbor,
                    f_cost: tentative_g + h_cost,
                    h_cost,
                });
            }
        }
    }

    if options.approximate && best.0 != start {
        return reconstruct_path(&came_from, start, best.0);
    }

    Vec::new()
}

/// Reconstruct path from came_from map, excluding the start cell
fn reconstruct_path(
    came_from: &AHashMap<GridPos, GridPos>,
    start: GridPos,
    mut current: GridPos,
) -> Vec<GridPos> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Sum of entry costs along a path
pub fn path_cost<C>(path: &[GridPos], terrain_cost: C) -> f32
where
    C: Fn(GridPos) -> f32,
{
    path.iter().map(|pos| terrain_cost(*pos).max(1.0)).sum()
}
