//! Fixed temperament and dynamic behavior labels
//!
//! Both are closed enumerations. Text labels (from data files or the host)
//! are parsed here and unknown values are rejected, never defaulted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::SimError;

/// A creature's fixed temperament trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Aggressive,
    Passive,
    Defensive,
    Territorial,
    Ambush,
    Immobile,
}

impl Disposition {
    pub const ALL: [Disposition; 6] = [
        Disposition::Aggressive,
        Disposition::Passive,
        Disposition::Defensive,
        Disposition::Territorial,
        Disposition::Ambush,
        Disposition::Immobile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Aggressive => "aggressive",
            Disposition::Passive => "passive",
            Disposition::Defensive => "defensive",
            Disposition::Territorial => "territorial",
            Disposition::Ambush => "ambush",
            Disposition::Immobile => "immobile",
        }
    }

    /// Temperaments that go looking for prey rather than waiting for the player
    pub fn is_predatory(&self) -> bool {
        matches!(
            self,
            Disposition::Aggressive | Disposition::Territorial | Disposition::Ambush
        )
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Disposition {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        Disposition::ALL
            .into_iter()
            .find(|d| d.as_str() == label)
            .ok_or_else(|| SimError::UnknownDisposition(s.to_string()))
    }
}

/// What a creature is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    #[default]
    Idle,
    Wandering,
    Hunting,
    Fleeing,
    Defending,
    Foraging,
    Regrouping,
    /// Cool-down after the path budget ran out
    Stuck,
}

impl BehaviorState {
    pub const ALL: [BehaviorState; 8] = [
        BehaviorState::Idle,
        BehaviorState::Wandering,
        BehaviorState::Hunting,
        BehaviorState::Fleeing,
        BehaviorState::Defending,
        BehaviorState::Foraging,
        BehaviorState::Regrouping,
        BehaviorState::Stuck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorState::Idle => "idle",
            BehaviorState::Wandering => "wandering",
            BehaviorState::Hunting => "hunting",
            BehaviorState::Fleeing => "fleeing",
            BehaviorState::Defending => "defending",
            BehaviorState::Foraging => "foraging",
            BehaviorState::Regrouping => "regrouping",
            BehaviorState::Stuck => "stuck",
        }
    }

    /// States in which the creature never leaves its cell
    pub fn is_stationary(&self) -> bool {
        matches!(
            self,
            BehaviorState::Idle | BehaviorState::Defending | BehaviorState::Stuck
        )
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BehaviorState {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        BehaviorState::ALL
            .into_iter()
            .find(|b| b.as_str() == label)
            .ok_or_else(|| SimError::UnknownBehavior(s.to_string()))
    }
}
