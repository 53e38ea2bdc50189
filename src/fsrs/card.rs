use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

// ==================== Rating ====================

/// Review outcome accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn grade(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" => Ok(Self::Again),
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            _ => Err(SchedulerError::InvalidRating(s.to_string())),
        }
    }
}

/// Rating as recorded in a log. `Manual` marks scheduler-initiated changes
/// such as `forget` and is never accepted as review input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRating {
    Manual,
    Again,
    Hard,
    Good,
    Easy,
}

impl From<Rating> for LogRating {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::Again => Self::Again,
            Rating::Hard => Self::Hard,
            Rating::Good => Self::Good,
            Rating::Easy => Self::Easy,
        }
    }
}

// ==================== CardState ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardState {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

impl CardState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Relearning => "relearning",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "learning" => Some(Self::Learning),
            "review" => Some(Self::Review),
            "relearning" => Some(Self::Relearning),
            _ => None,
        }
    }

    /// Maps a stored state string, treating anything unrecognised as `New`.
    ///
    /// This is the only place an unknown state is tolerated; it fails closed
    /// so a corrupt record restarts learning instead of being scheduled with
    /// a guessed interval.
    pub fn from_persisted(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!(state = s, "unrecognised persisted card state, treating as new");
            Self::New
        })
    }
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== SchedulingState ====================

/// Per-card scheduling memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    pub due: DateTime<Utc>,
    /// Days until retrievability decays to 90%.
    pub stability: f64,
    /// 1..=10 once reviewed, 0 for new cards.
    pub difficulty: f64,
    pub state: CardState,
    pub reps: u32,
    pub lapses: u32,
    pub elapsed_days: u32,
    pub scheduled_days: u32,
    /// Index into the learning or relearning step sequence.
    pub learning_steps: u32,
    pub last_review: Option<DateTime<Utc>>,
}

impl SchedulingState {
    /// A never-reviewed card, due at `created_at`.
    pub fn new_card(created_at: DateTime<Utc>) -> Self {
        Self {
            due: created_at,
            stability: 0.0,
            difficulty: 0.0,
            state: CardState::New,
            reps: 0,
            lapses: 0,
            elapsed_days: 0,
            scheduled_days: 0,
            learning_steps: 0,
            last_review: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.state == CardState::New
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due <= now
    }
}

// ==================== SchedulingLog ====================

/// Audit record of one transition, holding the card as it was before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingLog {
    pub rating: LogRating,
    /// State before the transition.
    pub state: CardState,
    pub due: DateTime<Utc>,
    pub stability: f64,
    pub difficulty: f64,
    pub reps: u32,
    pub lapses: u32,
    /// Days since the previous review, as computed for this one.
    pub elapsed_days: u32,
    /// `elapsed_days` stored on the card before this review.
    pub last_elapsed_days: u32,
    /// Interval that had been scheduled for this review.
    pub scheduled_days: u32,
    pub learning_steps: u32,
    pub last_review: Option<DateTime<Utc>>,
    pub reviewed_at: DateTime<Utc>,
}

impl SchedulingLog {
    pub(crate) fn capture(
        before: &SchedulingState,
        rating: LogRating,
        elapsed_days: u32,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            rating,
            state: before.state,
            due: before.due,
            stability: before.stability,
            difficulty: before.difficulty,
            reps: before.reps,
            lapses: before.lapses,
            elapsed_days,
            last_elapsed_days: before.elapsed_days,
            scheduled_days: before.scheduled_days,
            learning_steps: before.learning_steps,
            last_review: before.last_review,
            reviewed_at,
        }
    }

    /// The card exactly as it was before the logged transition.
    pub fn previous_state(&self) -> SchedulingState {
        SchedulingState {
            due: self.due,
            stability: self.stability,
            difficulty: self.difficulty,
            state: self.state,
            reps: self.reps,
            lapses: self.lapses,
            elapsed_days: self.last_elapsed_days,
            scheduled_days: self.scheduled_days,
            learning_steps: self.learning_steps,
            last_review: self.last_review,
        }
    }
}

/// New card state together with the log of the transition that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    pub state: SchedulingState,
    pub log: SchedulingLog,
}
