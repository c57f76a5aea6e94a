//! Creature data model

pub mod diet;
pub mod state;
pub mod temperament;
pub mod traits;

pub use diet::TrophicLevel;
pub use state::CreatureState;
pub use temperament::{BehaviorState, Disposition};
pub use traits::CreatureTraits;
