//! Dietary classification

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::SimError;

/// Trophic level of a species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrophicLevel {
    Herbivore,
    Carnivore,
    Omnivore,
}

impl TrophicLevel {
    pub fn eats_plants(&self) -> bool {
        matches!(self, TrophicLevel::Herbivore | TrophicLevel::Omnivore)
    }

    pub fn eats_meat(&self) -> bool {
        matches!(self, TrophicLevel::Carnivore | TrophicLevel::Omnivore)
    }
}

impl FromStr for TrophicLevel {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "herbivore" => Ok(TrophicLevel::Herbivore),
            "carnivore" => Ok(TrophicLevel::Carnivore),
            "omnivore" => Ok(TrophicLevel::Omnivore),
            _ => Err(SimError::UnknownTrophic(s.to_string())),
        }
    }
}

/// Diet entries that mark a species as a plant eater
const PLANT_KEYWORDS: &[&str] = &[
    "plant", "grass", "leaf", "leaves", "berry", "berries", "fruit", "seed", "herb", "root",
    "vegetation", "moss", "bark",
];

/// Whether a diet list mentions any plant food
pub fn diet_mentions_plants(diet: &[String]) -> bool {
    diet.iter().any(|item| {
        let item = item.to_ascii_lowercase();
        PLANT_KEYWORDS.iter().any(|kw| item.contains(kw))
    })
}

/// Plant eligibility: the trophic tag decides when present, otherwise the diet list
pub fn can_eat_plants(trophic: Option<TrophicLevel>, diet: &[String]) -> bool {
    match trophic {
        Some(level) => level.eats_plants(),
        None => diet_mentions_plants(diet),
    }
}

/// Meat eligibility, mirroring [`can_eat_plants`]
pub fn can_eat_meat(trophic: Option<TrophicLevel>, diet: &[String]) -> bool {
    match trophic {
        Some(level) => level.eats_meat(),
        None => diet.iter().any(|item| {
            let item = item.to_ascii_lowercase();
            ["meat", "flesh", "prey", "carrion", "fish"]
                .iter()
                .any(|kw| item.contains(kw))
        }),
    }
}
