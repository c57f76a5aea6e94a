//! Creature simulation: hunger, hunting, packs, movement and the tick engine

pub mod engine;
pub mod evaluate;
pub mod feeding;
pub mod herd;
pub mod hunting;
pub mod movement;
pub mod scheduler;

pub use engine::{CreatureEngine, Death, DeathCause, SimulationSession, TickOutcome};
pub use evaluate::{CreatureUpdate, FeedingIntent, PredationIntent};
pub use feeding::{attempt_eat_plants, decay_satiation, FeedingOutcome};
pub use herd::{
    calculate_flocking_movement, elect_alpha, evaluate_pack_cohesion, is_lost_from_pack, pack_hunting_bonus,
    prefers_pack, should_pack_hunt, PackState,
};
pub use hunting::{
    attempt_hunt, calculate_hunger_satisfaction, evaluate_food_source, hunt_success_chance, hunting_range,
    should_hunt, FoodKind, FoodSource,
};
pub use movement::{execute_move, is_valid_move, MoveDirective, MoveResult, MoveRules};
pub use scheduler::{dispatch_delay_ms, ScheduledUpdate, UpdateQueue};
