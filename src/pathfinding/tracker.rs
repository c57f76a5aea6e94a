//! Per-creature path bookkeeping
//!
//! Tracks the current waypoint list, what it leads to, how old it is, and how
//! many consecutive steps along it have failed. The engine consults this to
//! decide when a path must be recomputed.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::config::PathfindingConfig;
use crate::core::types::CreatureId;
use crate::pathfinding::search::SearchOptions;
use crate::spatial::grid::GridPos;

/// What the creature is using its path for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PathMode {
    #[default]
    Idle,
    SeekingTarget,
    Patrolling,
    Fleeing,
    Pursuing,
    Stuck,
}

/// Destination of a path
///
/// A creature target is a lookup key, not a reference: it is resolved against
/// the tick snapshot every evaluation because the other creature may have
/// moved or died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathTarget {
    Position(GridPos),
    Creature(CreatureId),
}

/// Fixed movement abilities of a path-capable creature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathCapability {
    pub allow_diagonal: bool,
    pub max_search_range: i32,
    pub approximate: bool,
    pub max_path_age: u32,
    pub max_failures: u32,
    /// Cells a creature target may move before its path counts as stale
    ///
    /// Creature targets are currently always treated as stale regardless.
    pub recalculate_on_target_move: i32,
}

impl PathCapability {
    pub fn from_config(config: &PathfindingConfig) -> Self {
        Self {
            allow_diagonal: true,
            max_search_range: config.max_search_range,
            approximate: true,
            max_path_age: config.max_path_age,
            max_failures: config.max_failures,
            recalculate_on_target_move: 2,
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_range: self.max_search_range,
            allow_diagonal: self.allow_diagonal,
            approximate: self.approximate,
        }
    }
}

impl Default for PathCapability {
    fn default() -> Self {
        Self::from_config(&PathfindingConfig::default())
    }
}

/// Mutable path state owned by its creature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathfindingState {
    pub mode: PathMode,
    pub target: Option<PathTarget>,
    current_path: VecDeque<GridPos>,
    path_age: u32,
    failures: u32,
}

impl PathfindingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_path(&self) -> &VecDeque<GridPos> {
        &self.current_path
    }

    pub fn next_waypoint(&self) -> Option<GridPos> {
        self.current_path.front().copied()
    }

    pub fn has_path(&self) -> bool {
        !self.current_path.is_empty()
    }

    pub fn path_age(&self) -> u32 {
        self.path_age
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Replace the path; an empty path returns the tracker to idle
    pub fn set_path(&mut self, path: Vec<GridPos>, target: PathTarget, mode: PathMode) {
        self.target = Some(target);
        self.current_path = path.into();
        self.path_age = 0;
        self.mode = if self.current_path.is_empty() {
            PathMode::Idle
        } else {
            mode
        };
    }

    /// Drop the path and target
    pub fn clear(&mut self) {
        self.current_path.clear();
        self.target = None;
        self.path_age = 0;
        self.mode = PathMode::Idle;
    }

    /// Whether the path must be recomputed before use
    pub fn is_path_stale(&self, capability: &PathCapability) -> bool {
        if self.current_path.is_empty() {
            return true;
        }
        if self.path_age > capability.max_path_age {
            return true;
        }
        match self.target {
            None => true,
            // Conservatively assume a creature target has moved
            Some(PathTarget::Creature(_)) => true,
            Some(PathTarget::Position(_)) => false,
        }
    }

    /// Consume the first waypoint after stepping onto it
    ///
    /// Popping the last waypoint means the destination was reached: the path
    /// is cleared and the mode returns to idle.
    pub fn advance_along_path(&mut self) {
        if self.current_path.len() <= 1 {
            self.current_path.clear();
            self.mode = PathMode::Idle;
        } else {
            self.current_path.pop_front();
        }
        self.path_age = 0;
        self.failures = 0;
    }

    /// Age the path by one evaluation
    pub fn tick_age(&mut self) {
        self.path_age = self.path_age.saturating_add(1);
    }

    /// Record a failed step; returns true once the failure budget is spent
    ///
    /// On true the path has already been dropped and the mode is `Stuck`.
    pub fn mark_path_failure(&mut self, capability: &PathCapability) -> bool {
        self.failures += 1;
        if self.failures >= capability.max_failures {
            self.current_path.clear();
            self.path_age = 0;
            self.failures = 0;
            self.mode = PathMode::Stuck;
            true
        } else {
            false
        }
    }
}

/// Typed pathfinding capability: abilities plus live state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pathfinding {
    pub capability: PathCapability,
    pub state: PathfindingState,
}

impl Pathfinding {
    pub fn new(capability: PathCapability) -> Self {
        Self {
            capability,
            state: PathfindingState::new(),
        }
    }

    pub fn is_path_stale(&self) -> bool {
        self.state.is_path_stale(&self.capability)
    }

    pub fn mark_path_failure(&mut self) -> bool {
        self.state.mark_path_failure(&self.capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_path(points: &[(i32, i32)]) -> PathfindingState {
        let mut state = PathfindingState::new();
        let path = points.iter().map(|&(x, y)| GridPos::new(x, y)).collect();
        state.set_path(path, PathTarget::Position(GridPos::new(9, 9)), PathMode::SeekingTarget);
        state
    }

    #[test]
    fn test_empty_path_is_always_stale() {
        let capability = PathCapability::default();
        let mut state = PathfindingState::new();
        state.target = Some(PathTarget::Position(GridPos::new(1, 1)));
        assert!(state.is_path_stale(&capability));
    }

    #[test]
    fn test_fresh_position_path_is_not_stale() {
        let capability = PathCapability::default();
        let state = with_path(&[(1, 0), (2, 0)]);
        assert!(!state.is_path_stale(&capability));
    }

    #[test]
    fn test_path_goes_stale_with_age() {
        let capability = PathCapability {
            max_path_age: 2,
            ..PathCapability::default()
        };
        let mut state = with_path(&[(1, 0), (2, 0)]);
        state.tick_age();
        state.tick_age();
        assert!(!state.is_path_stale(&capability));
        state.tick_age();
        assert!(state.is_path_stale(&capability));
    }

    #[test]
    fn test_creature_target_is_always_stale() {
        let capability = PathCapability::default();
        let mut state = PathfindingState::new();
        state.set_path(
            vec![GridPos::new(1, 0)],
            PathTarget::Creature(CreatureId::new()),
            PathMode::Pursuing,
        );
        assert!(state.is_path_stale(&capability));
    }

    #[test]
    fn test_advance_multi_waypoint() {
        let mut state = with_path(&[(1, 0), (2, 0), (3, 0)]);
        state.tick_age();
        state.advance_along_path();

        assert_eq!(state.current_path().len(), 2);
        assert_eq!(state.next_waypoint(), Some(GridPos::new(2, 0)));
        assert_eq!(state.path_age(), 0);
        assert_eq!(state.mode, PathMode::SeekingTarget);
    }

    #[test]
    fn test_advance_single_waypoint_reaches_destination() {
        let mut state = with_path(&[(1, 0)]);
        state.advance_along_path();
        assert!(state.current_path().is_empty());
        assert_eq!(state.mode, PathMode::Idle);
    }

    #[test]
    fn test_failures_exhaust_into_stuck() {
        let capability = PathCapability::default();
        let mut state = with_path(&[(1, 0), (2, 0)]);

        assert!(!state.mark_path_failure(&capability));
        assert!(!state.mark_path_failure(&capability));
        assert!(state.mark_path_failure(&capability));
        assert_eq!(state.mode, PathMode::Stuck);
        assert!(!state.has_path());
    }

    #[test]
    fn test_set_empty_path_is_idle() {
        let mut state = PathfindingState::new();
        state.set_path(Vec::new(), PathTarget::Position(GridPos::new(3, 3)), PathMode::Pursuing);
        assert_eq!(state.mode, PathMode::Idle);
        assert!(!state.has_path());
    }
}
