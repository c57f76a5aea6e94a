use serde::{Deserialize, Serialize};

use crate::spatial::grid::GridPos;

/// Read-only view of the player taken at tick start
///
/// The simulation never writes player state. Melee hits are reported back
/// as damage intents on narrative messages for the host to apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: GridPos,
    pub health: f32,
}

impl PlayerSnapshot {
    pub fn new(position: GridPos, health: f32) -> Self {
        Self { position, health }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}
