//! # fsrs-scheduler
//!
//! FSRS-6 spaced-repetition scheduling for flashcards: given a card's stored
//! scheduling state, a rating and the review time, compute the next due date,
//! the updated stability/difficulty estimates and the state transition.
//!
//! ## Modules
//!
//! - [`fsrs`] - memory model, card state machine and persistence record
//! - [`review`] - review submission contract used by card stores
//! - [`config`] - environment configuration
//! - [`logging`] - tracing setup
//!
//! ## Example
//!
//! ```rust
//! use fsrs_scheduler::fsrs::{CardState, Rating, Scheduler};
//!
//! let scheduler = Scheduler::default();
//! let at = "2026-02-09T10:00:00Z".parse().unwrap();
//! let card = scheduler.create_new_at(at);
//! let result = scheduler.review(&card, Rating::Good, at);
//! assert_eq!(result.state.state, CardState::Learning);
//! assert!(result.state.due > at);
//! ```

pub mod config;
pub mod error;
pub mod fsrs;
pub mod logging;
pub mod response;
pub mod review;

pub use error::{Result, SchedulerError};
pub use fsrs::{
    CardState, LearningStep, LogRating, PersistedFields, Rating, ReviewResult, Scheduler,
    SchedulerConfig, SchedulingLog, SchedulingState,
};
pub use review::{submit_review, submit_review_json, ReviewOutcome, ReviewSubmission};
