//! Sparse hash grid for efficient spatial queries

use ahash::AHashMap;

use crate::core::types::CreatureId;
use crate::spatial::grid::GridPos;

/// Sparse hash grid bucketing creatures by coarse cell
pub struct SparseHashGrid {
    cell_size: i32,
    cells: AHashMap<(i32, i32), Vec<(CreatureId, GridPos)>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: i32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: GridPos) -> (i32, i32) {
        (pos.x.div_euclid(self.cell_size), pos.y.div_euclid(self.cell_size))
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, creature: CreatureId, pos: GridPos) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push((creature, pos));
    }

    pub fn remove(&mut self, creature: CreatureId, pos: GridPos) {
        let coord = self.cell_coord(pos);
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.retain(|&(c, _)| c != creature);
        }
    }

    /// All creatures within `radius` (Chebyshev) of `center`
    pub fn query_radius(&self, center: GridPos, radius: i32) -> Vec<(CreatureId, GridPos)> {
        let (min_cx, min_cy) = self.cell_coord(center.offset(-radius, -radius));
        let (max_cx, max_cy) = self.cell_coord(center.offset(radius, radius));

        let mut found = Vec::new();
        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                let Some(cell) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                found.extend(
                    cell.iter()
                        .filter(|(_, pos)| pos.chebyshev(&center) <= radius)
                        .copied(),
                );
            }
        }
        found
    }

    /// Rebuild grid from positions
    pub fn rebuild(&mut self, creatures: impl Iterator<Item = (CreatureId, GridPos)>) {
        self.clear();
        for (creature, pos) in creatures {
            self.insert(creature, pos);
        }
    }
}
