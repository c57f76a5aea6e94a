//! Terrain chunks as seen by the creature simulation
//!
//! Storage and loading belong to the host game. The simulation only needs
//! to look a chunk up by grid position, read its travel cost, and (when a
//! creature eats) reduce its vegetation.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::spatial::grid::GridPos;

/// Chunk coordinate (grid position divided by chunk size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct ChunkId {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkId {
    pub fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    /// Chunk containing `pos` for square chunks of side `chunk_size`
    pub fn containing(pos: GridPos, chunk_size: i32) -> Self {
        let size = chunk_size.max(1);
        Self::new(pos.x.div_euclid(size), pos.y.div_euclid(size))
    }
}

/// One unit of terrain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    /// Cost to enter; at or above the blocking cost the chunk is impassable
    pub travel_cost: f32,
    /// Edible plant matter, reduced by grazing
    pub vegetation_density: f32,
}

impl Chunk {
    pub fn new(id: ChunkId, travel_cost: f32, vegetation_density: f32) -> Self {
        Self {
            id,
            travel_cost,
            vegetation_density,
        }
    }

    pub fn is_passable(&self, blocking_cost: f32) -> bool {
        self.travel_cost < blocking_cost
    }
}

/// Read access to terrain
pub trait TerrainView {
    fn chunk_at(&self, pos: GridPos) -> Option<&Chunk>;
}

/// Write access to terrain, used only when committing feeding
pub trait TerrainMut: TerrainView {
    fn chunk_at_mut(&mut self, pos: GridPos) -> Option<&mut Chunk>;

    fn chunk_by_id_mut(&mut self, id: ChunkId) -> Option<&mut Chunk>;
}

/// Sparse chunk storage with square chunks
#[derive(Debug, Clone)]
pub struct ChunkMap {
    chunk_size: i32,
    chunks: AHashMap<ChunkId, Chunk>,
}

impl ChunkMap {
    pub fn new(chunk_size: i32) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunks: AHashMap::new(),
        }
    }

    /// Rectangle of uniform chunks covering grid cells `[0, width) x [0, height)`
    pub fn filled(width: i32, height: i32, chunk_size: i32, travel_cost: f32, vegetation: f32) -> Self {
        let mut map = Self::new(chunk_size);
        let size = map.chunk_size;
        let cols = (width + size - 1) / size;
        let rows = (height + size - 1) / size;
        for cy in 0..rows {
            for cx in 0..cols {
                let id = ChunkId::new(cx, cy);
                map.chunks.insert(id, Chunk::new(id, travel_cost, vegetation));
            }
        }
        map
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    pub fn id_at(&self, pos: GridPos) -> ChunkId {
        ChunkId::containing(pos, self.chunk_size)
    }

    /// Insert or replace the chunk containing `pos`
    pub fn set(&mut self, pos: GridPos, travel_cost: f32, vegetation: f32) {
        let id = self.id_at(pos);
        self.chunks.insert(id, Chunk::new(id, travel_cost, vegetation));
    }

    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(&id)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_vegetation(&self) -> f32 {
        self.chunks.values().map(|c| c.vegetation_density).sum()
    }
}

impl TerrainView for ChunkMap {
    fn chunk_at(&self, pos: GridPos) -> Option<&Chunk> {
        self.chunks.get(&self.id_at(pos))
    }
}

impl TerrainMut for ChunkMap {
    fn chunk_at_mut(&mut self, pos: GridPos) -> Option<&mut Chunk> {
        let id = self.id_at(pos);
        self.chunks.get_mut(&id)
    }

    fn chunk_by_id_mut(&mut self, id: ChunkId) -> Option<&mut Chunk> {
        self.chunks.get_mut(&id)
    }
}
