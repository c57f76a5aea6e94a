//! Fauna Sim - creature behavior core for a tile-based open world
//!
//! Creatures near the player are evaluated each tick: hunger and
//! temperament, a decision table, A* paths over chunked terrain, predation,
//! grazing and pack cohesion. Results are buffered and committed together,
//! producing narrative messages and world events for the host game.

pub mod behavior;
pub mod core;
pub mod creature;
pub mod narrative;
pub mod pathfinding;
pub mod simulation;
pub mod spatial;
pub mod world;
