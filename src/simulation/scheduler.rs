//! Per-creature update dispatch
//!
//! Creatures close to the player react first. Each scheduled update carries
//! a perceptual delay chosen from a distance band and its own RNG seed, so
//! the evaluation order and every random choice are fixed at schedule time.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::Rng;

use crate::core::config::EngineConfig;
use crate::core::types::CreatureId;

/// One creature's slot in the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledUpdate {
    pub creature: CreatureId,
    pub delay_ms: u32,
    /// Insertion order, breaks delay ties
    pub seq: u64,
    pub seed: u64,
}

// Reverse ordering so BinaryHeap pops the shortest delay first
impl Ord for ScheduledUpdate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .delay_ms
            .cmp(&self.delay_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledUpdate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Delay-ordered queue of pending creature evaluations
#[derive(Debug, Default)]
pub struct UpdateQueue {
    heap: BinaryHeap<ScheduledUpdate>,
    next_seq: u64,
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, creature: CreatureId, delay_ms: u32, seed: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledUpdate {
            creature,
            delay_ms,
            seq,
            seed,
        });
    }

    pub fn pop(&mut self) -> Option<ScheduledUpdate> {
        self.heap.pop()
    }

    /// Empty the queue in dispatch order
    pub fn drain_ordered(&mut self) -> Vec<ScheduledUpdate> {
        let mut ordered = Vec::with_capacity(self.heap.len());
        while let Some(update) = self.heap.pop() {
            ordered.push(update);
        }
        ordered
    }

    /// Drop every queued update for a creature; returns how many were removed
    pub fn cancel(&mut self, creature: CreatureId) -> usize {
        let before = self.heap.len();
        self.heap.retain(|u| u.creature != creature);
        before - self.heap.len()
    }

    pub fn contains(&self, creature: CreatureId) -> bool {
        self.heap.iter().any(|u| u.creature == creature)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Index of the delay band for a player distance
pub fn delay_band(distance: i32, limits: &[i32; 3]) -> usize {
    limits
        .iter()
        .position(|&limit| distance <= limit)
        .unwrap_or(limits.len())
}

/// Perceptual delay for a creature at `distance` from the player
pub fn dispatch_delay_ms<R: Rng + ?Sized>(distance: i32, config: &EngineConfig, rng: &mut R) -> u32 {
    let (lo, hi) = config.delay_band_ms[delay_band(distance, &config.delay_band_limits)];
    if lo >= hi {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}
