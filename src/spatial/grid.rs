//! Integer grid coordinates and distance metrics
//!
//! Every adjacency and range check in the simulation uses the Chebyshev
//! metric, so perception and reach are square rather than circular.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

/// A cell on the world grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// max(|dx|, |dy|)
    pub fn chebyshev(&self, other: &Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// |dx| + |dy|
    pub fn manhattan(&self, other: &Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn euclidean(&self, other: &Self) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Adjacent in any of the 8 directions (not the same cell)
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.chebyshev(other) == 1
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Per-axis sign of the vector from self to other
    pub fn sign_toward(&self, other: &Self) -> (i32, i32) {
        ((other.x - self.x).signum(), (other.y - self.y).signum())
    }

    /// 4- or 8-connected neighbors
    pub fn neighbors(&self, allow_diagonal: bool) -> impl Iterator<Item = GridPos> + '_ {
        let dirs: &'static [Direction] = if allow_diagonal {
            &Direction::ALL
        } else {
            &Direction::CARDINAL
        };
        dirs.iter().map(move |d| self.step(*d))
    }

    /// Every cell within `radius` (Chebyshev), including self
    pub fn cells_within(&self, radius: i32) -> impl Iterator<Item = GridPos> + '_ {
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| self.offset(dx, dy)))
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// The eight compass directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const CARDINAL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    /// Grid offset; north is negative y
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Direction for a sign vector, None for (0, 0)
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        Direction::ALL
            .into_iter()
            .find(|d| d.delta() == (dx.signum(), dy.signum()))
    }

    pub fn is_diagonal(&self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }

    pub fn opposite(&self) -> Self {
        let (dx, dy) = self.delta();
        // Every delta has a negation in ALL
        Direction::from_delta(-dx, -dy).unwrap_or(*self)
    }
}
