//! Behavior decision table
//!
//! Maps a creature's temperament and situation to its next behavior state.
//! Pure and deterministic: everything random or world-dependent is resolved
//! by the caller before building a [`DecisionInput`].

use crate::creature::temperament::{BehaviorState, Disposition};
use crate::spatial::grid::GridPos;

/// Flee trigger distance for passive creatures
pub const FLEE_DISTANCE: i32 = 2;

/// Reach for defending and ambushing (adjacent)
pub const ADJACENT_DISTANCE: i32 = 1;

/// Everything the decision depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInput {
    pub disposition: Disposition,
    pub current: BehaviorState,
    /// Chebyshev distance to the target
    pub distance: i32,
    pub target: GridPos,
    pub is_hungry: bool,
    pub has_valid_path: bool,
    pub search_range: i32,
}

/// The chosen state plus an optional path directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub state: BehaviorState,
    pub path_target: Option<GridPos>,
    pub recalculate_path: bool,
}

impl Decision {
    pub fn idle() -> Self {
        Self {
            state: BehaviorState::Idle,
            path_target: None,
            recalculate_path: false,
        }
    }

    fn hold(state: BehaviorState) -> Self {
        Self {
            state,
            path_target: None,
            recalculate_path: false,
        }
    }

    fn pursue(target: GridPos, recalculate_path: bool) -> Self {
        Self {
            state: BehaviorState::Hunting,
            path_target: Some(target),
            recalculate_path,
        }
    }
}

/// Decide the next behavior state
pub fn decide(input: &DecisionInput) -> Decision {
    // One tick of cool-down after a pathfinding failure
    if input.current == BehaviorState::Stuck {
        return Decision::idle();
    }

    let distance = input.distance;
    match input.disposition {
        Disposition::Aggressive => {
            if distance <= input.search_range || input.is_hungry {
                let state_changed = input.current != BehaviorState::Hunting;
                Decision::pursue(input.target, !input.has_valid_path || state_changed)
            } else {
                Decision::idle()
            }
        }
        Disposition::Passive => {
            if distance <= FLEE_DISTANCE {
                // Flight is steered directly, never pathed
                Decision::hold(BehaviorState::Fleeing)
            } else {
                Decision::idle()
            }
        }
        Disposition::Defensive => {
            if distance <= ADJACENT_DISTANCE {
                Decision::hold(BehaviorState::Defending)
            } else {
                Decision::idle()
            }
        }
        Disposition::Territorial => {
            if distance <= input.search_range {
                Decision::pursue(input.target, !input.has_valid_path)
            } else {
                Decision::idle()
            }
        }
        Disposition::Ambush => {
            if distance <= ADJACENT_DISTANCE {
                // Already adjacent, nothing to path
                Decision::pursue(input.target, false)
            } else {
                Decision::idle()
            }
        }
        Disposition::Immobile => Decision::idle(),
    }
}
