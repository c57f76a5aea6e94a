//! The simulated creature record

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{CreatureId, PackId, Tick};
use crate::creature::diet::{self, TrophicLevel};
use crate::creature::temperament::{BehaviorState, Disposition};
use crate::creature::traits::CreatureTraits;
use crate::pathfinding::tracker::{PathCapability, Pathfinding};
use crate::spatial::grid::GridPos;
use crate::world::chunk::ChunkId;

/// Search range used when a creature has no explicit trophic range
pub const DEFAULT_SEARCH_RANGE: i32 = 2;

/// One simulated creature
///
/// Owned by the engine registry; everything else refers to it by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureState {
    pub id: CreatureId,
    pub species: String,
    pub position: GridPos,
    pub chunk: ChunkId,
    pub disposition: Disposition,
    /// Temperament before hunger escalation, restored once fed
    pub base_disposition: Option<Disposition>,
    pub behavior: BehaviorState,
    pub target: Option<GridPos>,
    pub last_move_tick: Tick,
    pub satiation: f32,
    pub max_satiation: f32,
    /// None when the species data carries no recognised tag
    pub trophic: Option<TrophicLevel>,
    pub diet: Vec<String>,
    pub trophic_range: Option<i32>,
    pub pathfinding: Option<Pathfinding>,
    pub traits: CreatureTraits,
    pub pack: Option<PackId>,
    /// First tick the creature was seen at zero satiation
    pub starving_since: Option<Tick>,
}

impl CreatureState {
    pub fn new(species: impl Into<String>, position: GridPos, disposition: Disposition) -> Self {
        Self {
            id: CreatureId::new(),
            species: species.into(),
            position,
            chunk: ChunkId::default(),
            disposition,
            base_disposition: None,
            behavior: BehaviorState::Idle,
            target: None,
            last_move_tick: 0,
            satiation: 100.0,
            max_satiation: 100.0,
            trophic: None,
            diet: Vec::new(),
            trophic_range: None,
            pathfinding: None,
            traits: CreatureTraits::default(),
            pack: None,
            starving_since: None,
        }
    }

    pub fn with_trophic(mut self, trophic: TrophicLevel) -> Self {
        self.trophic = Some(trophic);
        self
    }

    pub fn with_diet(mut self, diet: &[&str]) -> Self {
        self.diet = diet.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_satiation(mut self, satiation: f32, max_satiation: f32) -> Self {
        self.max_satiation = max_satiation;
        self.satiation = satiation;
        self
    }

    pub fn with_traits(mut self, traits: CreatureTraits) -> Self {
        self.traits = traits.normalized();
        self
    }

    pub fn with_trophic_range(mut self, range: i32) -> Self {
        self.trophic_range = Some(range);
        self
    }

    pub fn with_pathfinding(mut self, capability: PathCapability) -> Self {
        self.pathfinding = Some(Pathfinding::new(capability));
        self
    }

    pub fn with_pack(mut self, pack: PackId) -> Self {
        self.pack = Some(pack);
        self
    }

    /// Reject records that would break satiation or position invariants
    pub fn validate(&self) -> Result<()> {
        if !(self.max_satiation.is_finite() && self.max_satiation > 0.0) {
            return Err(SimError::InvalidCreature(format!(
                "{}: max_satiation must be positive, got {}",
                self.id, self.max_satiation
            )));
        }
        if !self.satiation.is_finite() || self.satiation < 0.0 || self.satiation > self.max_satiation {
            return Err(SimError::InvalidCreature(format!(
                "{}: satiation {} outside [0, {}]",
                self.id, self.satiation, self.max_satiation
            )));
        }
        if self.species.trim().is_empty() {
            return Err(SimError::InvalidCreature(format!("{}: empty species", self.id)));
        }
        Ok(())
    }

    pub fn satiation_fraction(&self) -> f32 {
        self.satiation / self.max_satiation
    }

    /// Hungry means below `hungry_fraction` of max satiation
    pub fn is_hungry(&self, hungry_fraction: f32) -> bool {
        self.satiation < self.max_satiation * hungry_fraction
    }

    /// Hunger on a 0-100 scale (0 = full, 100 = starving)
    pub fn hunger_level(&self) -> f32 {
        (100.0 * (1.0 - self.satiation_fraction())).clamp(0.0, 100.0)
    }

    pub fn remaining_capacity(&self) -> f32 {
        (self.max_satiation - self.satiation).max(0.0)
    }

    /// Add satiation, clamped to max; returns the amount actually gained
    pub fn gain_satiation(&mut self, amount: f32) -> f32 {
        let before = self.satiation;
        self.satiation = (self.satiation + amount.max(0.0)).min(self.max_satiation);
        self.satiation - before
    }

    pub fn search_range(&self) -> i32 {
        self.trophic_range.unwrap_or(DEFAULT_SEARCH_RANGE)
    }

    pub fn can_eat_plants(&self) -> bool {
        diet::can_eat_plants(self.trophic, &self.diet)
    }

    pub fn can_eat_meat(&self) -> bool {
        diet::can_eat_meat(self.trophic, &self.diet)
    }

    pub fn has_valid_path(&self) -> bool {
        self.pathfinding
            .as_ref()
            .map(|p| !p.is_path_stale())
            .unwrap_or(false)
    }
}
