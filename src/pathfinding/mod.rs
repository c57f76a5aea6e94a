//! Grid pathfinding: stateless A* search plus per-creature staleness tracking

pub mod search;
pub mod tracker;

pub use search::{find_path, path_cost, SearchOptions};
pub use tracker::{PathCapability, PathMode, PathTarget, Pathfinding, PathfindingState};
