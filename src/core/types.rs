//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for creatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub Uuid);

impl CreatureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CreatureId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CreatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a pack of social creatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackId(pub u32);

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Continuous 2D position, used for pack centers and steering vectors
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Chebyshev distance (square perception)
    pub fn chebyshev(&self, other: &Self) -> f32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self { x: self.x / len, y: self.y / len }
        } else {
            Self::default()
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creature_id_uniqueness() {
        let a = CreatureId::new();
        let b = CreatureId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_creature_id_hash() {
        use std::collections::HashMap;
        let id = CreatureId::new();
        let mut map: HashMap<CreatureId, &str> = HashMap::new();
        map.insert(id, "wolf");
        assert_eq!(map.get(&id), Some(&"wolf"));
    }

    #[test]
    fn test_vec2_chebyshev() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, -7.5);
        assert_eq!(a.chebyshev(&b), 7.5);
    }

    #[test]
    fn test_vec2_normalize_zero() {
        assert_eq!(Vec2::default().normalize(), Vec2::default());
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-5);
    }
}
