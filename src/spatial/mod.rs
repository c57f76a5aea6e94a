//! Grid geometry and spatial indexing

pub mod grid;
pub mod sparse_hash;

pub use grid::{Direction, GridPos};
pub use sparse_hash::SparseHashGrid;
