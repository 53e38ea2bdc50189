//! Wire record exchanged with the card store.
//!
//! Every field is written back after each review; `reconstruct` needs all of
//! them on the next call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::{CardState, SchedulingState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedFields {
    pub due: DateTime<Utc>,
    pub stability: f64,
    pub difficulty: f64,
    /// `"new" | "learning" | "review" | "relearning"`
    pub state: String,
    pub reps: u32,
    pub lapses: u32,
    pub elapsed_days: u32,
    pub scheduled_days: u32,
    /// Absent on records written before step tracking existed.
    #[serde(default)]
    pub learning_steps: u32,
    #[serde(default)]
    pub last_review: Option<DateTime<Utc>>,
}

impl PersistedFields {
    /// Whether the record carries review history that must be reconstructed.
    ///
    /// A blank record is `state == "new" && reps == 0 && stability == 0`. A
    /// recorded `lastReview` also counts as history, so imported cards with a
    /// review date but no reps are not reset.
    pub fn has_history(&self) -> bool {
        let blank = CardState::parse(&self.state) == Some(CardState::New)
            && self.reps == 0
            && self.stability == 0.0;
        !blank || self.last_review.is_some()
    }

    /// Field-for-field conversion; only the state string is interpreted.
    pub fn to_state(&self) -> SchedulingState {
        SchedulingState {
            due: self.due,
            stability: self.stability,
            difficulty: self.difficulty,
            state: CardState::from_persisted(&self.state),
            reps: self.reps,
            lapses: self.lapses,
            elapsed_days: self.elapsed_days,
            scheduled_days: self.scheduled_days,
            learning_steps: self.learning_steps,
            last_review: self.last_review,
        }
    }
}

impl From<&SchedulingState> for PersistedFields {
    fn from(card: &SchedulingState) -> Self {
        Self {
            due: card.due,
            stability: card.stability,
            difficulty: card.difficulty,
            state: card.state.as_str().to_string(),
            reps: card.reps,
            lapses: card.lapses,
            elapsed_days: card.elapsed_days,
            scheduled_days: card.scheduled_days,
            learning_steps: card.learning_steps,
            last_review: card.last_review,
        }
    }
}
