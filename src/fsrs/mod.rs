//! FSRS-6 spaced-repetition scheduling.
//!
//! - [`algorithm`] - memory model formulas (stability, difficulty, retrievability)
//! - [`card`] - ratings, card states, scheduling state and logs
//! - [`steps`] - learning / relearning step strategy
//! - [`fuzz`] - deterministic interval fuzz
//! - [`persisted`] - record exchanged with the card store
//! - [`scheduler`] - the transition function and its companions

pub mod algorithm;
pub mod card;
pub mod fuzz;
pub mod params;
pub mod persisted;
pub mod scheduler;
pub mod steps;

pub use card::{CardState, LogRating, Rating, ReviewResult, SchedulingLog, SchedulingState};
pub use params::{LearningStep, SchedulerConfig};
pub use persisted::PersistedFields;
pub use scheduler::Scheduler;
