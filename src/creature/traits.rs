//! Physical and personality traits

use serde::{Deserialize, Serialize};

/// Per-creature stats consulted by hunting and pack logic
///
/// Personality traits (aggression, fearfulness, greediness, laziness,
/// sociability) are on a 0-100 scale. Speed is cells-per-move scaled so that
/// a typical animal sits around 1-5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureTraits {
    pub speed: f32,
    pub size: f32,
    pub health: f32,
    /// Damage intent produced by a melee hit on the player
    pub attack: f32,
    pub aggression: f32,
    pub fearfulness: f32,
    pub greediness: f32,
    pub laziness: f32,
    pub sociability: f32,
}

impl Default for CreatureTraits {
    fn default() -> Self {
        Self {
            speed: 2.0,
            size: 1.0,
            health: 50.0,
            attack: 5.0,
            aggression: 30.0,
            fearfulness: 30.0,
            greediness: 50.0,
            laziness: 50.0,
            sociability: 20.0,
        }
    }
}

impl CreatureTraits {
    /// Clamp personality traits into 0-100 and physical stats to sane minimums
    pub fn normalized(mut self) -> Self {
        for value in [
            &mut self.aggression,
            &mut self.fearfulness,
            &mut self.greediness,
            &mut self.laziness,
            &mut self.sociability,
        ] {
            *value = value.clamp(0.0, 100.0);
        }
        self.speed = self.speed.max(0.0);
        self.size = self.size.max(0.1);
        self.health = self.health.max(0.0);
        self.attack = self.attack.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps() {
        let traits = CreatureTraits {
            aggression: 140.0,
            sociability: -5.0,
            size: 0.0,
            ..CreatureTraits::default()
        }
        .normalized();

        assert_eq!(traits.aggression, 100.0);
        assert_eq!(traits.sociability, 0.0);
        assert_eq!(traits.size, 0.1);
    }
}
