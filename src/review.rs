//! Review submission: the single entry point a card store calls per accepted review.
//!
//! The caller deduplicates retried requests and serialises reviews of the
//! same card; this layer only validates and schedules.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};
use crate::fsrs::{PersistedFields, Rating, ReviewResult, Scheduler, SchedulingLog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    /// `None` for a card that has never been reviewed.
    #[serde(default)]
    pub prior_persisted_state: Option<PersistedFields>,
    pub rating: String,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    /// Full record to write back; never merged partially.
    pub card: PersistedFields,
    pub log: SchedulingLog,
}

pub fn submit_review(scheduler: &Scheduler, submission: &ReviewSubmission) -> Result<ReviewOutcome> {
    let rating: Rating = submission.rating.parse()?;
    // The shortest step is one minute; without that headroom `due` would saturate to `reviewed_at`.
    if submission.reviewed_at.checked_add_signed(Duration::minutes(1)).is_none() {
        return Err(SchedulerError::InvalidTimestamp(format!(
            "{} leaves no room to schedule a due date",
            submission.reviewed_at
        )));
    }

    let card = scheduler.load(submission.prior_persisted_state.as_ref(), submission.reviewed_at);
    let ReviewResult { state, log } = scheduler.review(&card, rating, submission.reviewed_at);

    Ok(ReviewOutcome {
        card: PersistedFields::from(&state),
        log,
    })
}

pub fn submit_review_json(scheduler: &Scheduler, payload: &str) -> Result<ReviewOutcome> {
    let submission: ReviewSubmission = serde_json::from_str(payload)?;
    submit_review(scheduler, &submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulerError;
    use crate::fsrs::CardState;

    #[test]
    fn test_first_review_from_null_prior() {
        let scheduler = Scheduler::default();
        let outcome = submit_review_json(
            &scheduler,
            r#"{"priorPersistedState":null,"rating":"good","reviewedAt":"2026-02-09T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(outcome.card.state, "learning");
        assert_eq!(outcome.card.reps, 1);
        assert_eq!(outcome.card.last_review, Some("2026-02-09T10:00:00Z".parse::<DateTime<Utc>>().unwrap()));
        assert_eq!(outcome.log.state, CardState::New);
    }

    #[test]
    fn test_invalid_rating_rejected() {
        let scheduler = Scheduler::default();
        for rating in ["manual", "0", "great"] {
            let submission = ReviewSubmission {
                prior_persisted_state: None,
                rating: rating.to_string(),
                reviewed_at: "2026-02-09T10:00:00Z".parse().unwrap(),
            };
            let err = submit_review(&scheduler, &submission).unwrap_err();
            assert!(matches!(err, SchedulerError::InvalidRating(_)));
            assert_eq!(err.code(), "VALIDATION_ERROR");
        }
    }

    #[test]
    fn test_reviewed_at_at_end_of_time_rejected() {
        let scheduler = Scheduler::default();
        let submission = ReviewSubmission {
            prior_persisted_state: None,
            rating: "good".to_string(),
            reviewed_at: DateTime::<Utc>::MAX_UTC,
        };
        let err = submit_review(&scheduler, &submission).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidTimestamp(_)));
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let latest = DateTime::<Utc>::MAX_UTC - Duration::minutes(1);
        let outcome = submit_review(
            &scheduler,
            &ReviewSubmission {
                reviewed_at: latest,
                ..submission
            },
        )
        .unwrap();
        assert!(outcome.card.due > latest);
    }

    #[test]
    fn test_malformed_payload_is_bad_request() {
        let scheduler = Scheduler::default();
        let err = submit_review_json(&scheduler, r#"{"rating":"good"}"#).unwrap_err();
        assert!(matches!(err, SchedulerError::Json(_)));
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[test]
    fn test_outcome_writes_every_field() {
        let scheduler = Scheduler::default();
        let outcome = submit_review_json(
            &scheduler,
            r#"{"rating":"easy","reviewedAt":"2026-02-09T10:00:00Z"}"#,
        )
        .unwrap();
        let value = serde_json::to_value(&outcome.card).unwrap();
        for key in [
            "due",
            "stability",
            "difficulty",
            "state",
            "reps",
            "lapses",
            "elapsedDays",
            "scheduledDays",
            "learningSteps",
            "lastReview",
        ] {
            assert!(!value[key].is_null(), "missing {key}");
        }
    }
}
