use thiserror::Error;

use crate::core::types::Tick;
use crate::spatial::grid::GridPos;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Creature not found: {0}")]
    CreatureNotFound(crate::core::types::CreatureId),

    #[error("Creature already registered: {0}")]
    DuplicateCreature(crate::core::types::CreatureId),

    #[error("Unknown behavior state: {0}")]
    UnknownBehavior(String),

    #[error("Unknown disposition: {0}")]
    UnknownDisposition(String),

    #[error("Unknown trophic level: {0}")]
    UnknownTrophic(String),

    #[error("Invalid creature data: {0}")]
    InvalidCreature(String),

    #[error("No chunk at ({}, {})", .0.x, .0.y)]
    MissingChunk(GridPos),

    #[error("Tick {0} still has uncommitted updates")]
    UncommittedTick(Tick),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
