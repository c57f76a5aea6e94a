//! Interfaces to the host game's world and player state

pub mod chunk;
pub mod player;

pub use chunk::{Chunk, ChunkId, ChunkMap, TerrainMut, TerrainView};
pub use player::PlayerSnapshot;
