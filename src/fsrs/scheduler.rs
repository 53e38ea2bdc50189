use chrono::{DateTime, Duration, Utc};

use super::algorithm::{self, MemoryState};
use super::card::{CardState, LogRating, Rating, ReviewResult, SchedulingLog, SchedulingState};
use super::fuzz;
use super::params::{SchedulerConfig, MINUTES_PER_DAY};
use super::persisted::PersistedFields;
use super::steps;
use crate::error::{Result, SchedulerError};

const SECONDS_PER_DAY: f64 = 86_400.0;

// Both saturate at `MAX_UTC`, so `due > at` holds only while `at + 1 minute`
// is representable. `submit_review` rejects later timestamps.
fn add_minutes(at: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    at.checked_add_signed(Duration::minutes(i64::from(minutes)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn add_days(at: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    at.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// FSRS scheduler bound to one deployment's configuration.
///
/// Stateless between calls: every operation reads only its arguments, so a
/// single instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    // ==================== Card construction ====================

    pub fn create_new(&self) -> SchedulingState {
        SchedulingState::new_card(Utc::now())
    }

    pub fn create_new_at(&self, created_at: DateTime<Utc>) -> SchedulingState {
        SchedulingState::new_card(created_at)
    }

    /// Restores a card with history exactly as stored.
    pub fn reconstruct(&self, persisted: &PersistedFields) -> SchedulingState {
        persisted.to_state()
    }

    /// Picks `reconstruct` or a blank card depending on whether the stored
    /// record has review history. A blank stored record keeps its `due`.
    pub fn load(&self, prior: Option<&PersistedFields>, now: DateTime<Utc>) -> SchedulingState {
        match prior {
            Some(fields) if fields.has_history() => self.reconstruct(fields),
            Some(fields) => self.create_new_at(fields.due),
            None => self.create_new_at(now),
        }
    }

    // ==================== Review ====================

    pub fn review(&self, card: &SchedulingState, rating: Rating, at: DateTime<Utc>) -> ReviewResult {
        let elapsed_days = self.elapsed_days(card, at);
        let seed = fuzz::fuzz_seed(at, card.reps, card.difficulty, card.stability);

        let mut next = card.clone();
        next.elapsed_days = elapsed_days;
        next.last_review = Some(at);
        next.reps = card.reps.saturating_add(1);

        match (card.state, rating) {
            (CardState::New, _) => {
                let memory = algorithm::init_state(&self.config.w, rating);
                self.set_memory(&mut next, memory);
                self.apply_learning_steps(&mut next, card, rating, at, CardState::Learning, seed);
            }
            (CardState::Learning | CardState::Relearning, _) => {
                let memory = self.next_memory(card, elapsed_days, rating);
                self.set_memory(&mut next, memory);
                self.apply_learning_steps(&mut next, card, rating, at, card.state, seed);
            }
            (CardState::Review, Rating::Again) => {
                next.lapses = card.lapses.saturating_add(1);
                let memory = self.next_memory(card, elapsed_days, rating);
                self.set_memory(&mut next, memory);
                self.apply_learning_steps(&mut next, card, rating, at, CardState::Relearning, seed);
            }
            (CardState::Review, Rating::Hard) => {
                let [hard, _, _] = self.review_outcomes(card, elapsed_days, seed);
                self.schedule_review(&mut next, at, hard);
            }
            (CardState::Review, Rating::Good) => {
                let [_, good, _] = self.review_outcomes(card, elapsed_days, seed);
                self.schedule_review(&mut next, at, good);
            }
            (CardState::Review, Rating::Easy) => {
                let [_, _, easy] = self.review_outcomes(card, elapsed_days, seed);
                self.schedule_review(&mut next, at, easy);
            }
        }

        tracing::debug!(
            rating = %rating,
            from = %card.state,
            to = %next.state,
            elapsed_days,
            scheduled_days = next.scheduled_days,
            stability = next.stability,
            difficulty = next.difficulty,
            "card reviewed"
        );

        let log = SchedulingLog::capture(card, LogRating::from(rating), elapsed_days, at);
        ReviewResult { state: next, log }
    }

    /// Outcomes for all four ratings, indexed by `Rating::ALL`. Nothing is committed.
    pub fn preview(&self, card: &SchedulingState, at: DateTime<Utc>) -> [ReviewResult; 4] {
        Rating::ALL.map(|rating| self.review(card, rating, at))
    }

    /// Current probability of recall; zero for cards never reviewed.
    pub fn retrievability(&self, card: &SchedulingState, now: DateTime<Utc>) -> f64 {
        let Some(last_review) = card.last_review else {
            return 0.0;
        };
        if card.is_new() {
            return 0.0;
        }
        let elapsed = (now - last_review).num_seconds().max(0) as f64 / SECONDS_PER_DAY;
        algorithm::retrievability(&self.config.w, elapsed, card.stability)
    }

    /// Undoes the transition recorded in `log`, which must be the log of the
    /// card's most recent review.
    ///
    /// Same-instant reviews share a timestamp, so a review log must also be
    /// exactly one rep behind the card.
    pub fn rollback(&self, card: &SchedulingState, log: &SchedulingLog) -> Result<SchedulingState> {
        let latest = match log.rating {
            LogRating::Manual => card.is_new() && card.last_review.is_none(),
            _ => {
                card.last_review == Some(log.reviewed_at)
                    && card.reps == log.reps.saturating_add(1)
            }
        };
        if !latest {
            return Err(SchedulerError::RollbackMismatch(format!(
                "log of {} at {} is not the card's latest transition",
                match log.rating {
                    LogRating::Manual => "manual reset",
                    _ => "review",
                },
                log.reviewed_at
            )));
        }
        Ok(log.previous_state())
    }

    /// Resets the card to New. The log keeps the full prior state so the reset can be rolled back.
    pub fn forget(&self, card: &SchedulingState, at: DateTime<Utc>) -> ReviewResult {
        let elapsed_days = self.elapsed_days(card, at);
        tracing::debug!(from = %card.state, reps = card.reps, "card reset to new");
        ReviewResult {
            state: SchedulingState::new_card(at),
            log: SchedulingLog::capture(card, LogRating::Manual, elapsed_days, at),
        }
    }

    // ==================== Internals ====================

    fn elapsed_days(&self, card: &SchedulingState, at: DateTime<Utc>) -> u32 {
        let Some(last_review) = card.last_review else {
            return 0;
        };
        let delta = at - last_review;
        if delta < Duration::zero() {
            tracing::warn!(
                %at,
                %last_review,
                "review timestamp precedes last review, clamping elapsed days to zero"
            );
            return 0;
        }
        u32::try_from(delta.num_days()).unwrap_or(u32::MAX)
    }

    fn next_memory(&self, card: &SchedulingState, elapsed_days: u32, rating: Rating) -> MemoryState {
        algorithm::next_state(
            &self.config.w,
            MemoryState {
                stability: card.stability,
                difficulty: card.difficulty,
            },
            f64::from(elapsed_days),
            rating,
            self.config.enable_short_term,
        )
    }

    fn set_memory(&self, next: &mut SchedulingState, memory: MemoryState) {
        next.stability = memory.stability;
        next.difficulty = memory.difficulty;
    }

    /// Whole-day interval for `stability`, fuzzed if enabled, within `[1, maximum_interval]`.
    fn next_interval(&self, stability: f64, elapsed_days: u32, seed: u64) -> u32 {
        let maximum = self.config.maximum_interval;
        let raw = algorithm::raw_interval(&self.config.w, stability, self.config.request_retention);
        let interval = if self.config.enable_fuzz {
            fuzz::apply_fuzz(raw, elapsed_days, maximum, seed)
        } else {
            raw.round()
        };
        interval.clamp(1.0, f64::from(maximum)) as u32
    }

    /// Hard, Good and Easy outcomes from Review. Intervals are ordered
    /// `hard <= good < easy` before the cap is applied.
    fn review_outcomes(
        &self,
        card: &SchedulingState,
        elapsed_days: u32,
        seed: u64,
    ) -> [(MemoryState, u32); 3] {
        let hard = self.next_memory(card, elapsed_days, Rating::Hard);
        let good = self.next_memory(card, elapsed_days, Rating::Good);
        let easy = self.next_memory(card, elapsed_days, Rating::Easy);

        let good_raw = self.next_interval(good.stability, elapsed_days, seed);
        let hard_ivl = self.next_interval(hard.stability, elapsed_days, seed).min(good_raw);
        let good_ivl = good_raw.max(hard_ivl.saturating_add(1));
        let easy_ivl = self
            .next_interval(easy.stability, elapsed_days, seed)
            .max(good_ivl.saturating_add(1));

        let maximum = self.config.maximum_interval;
        [
            (hard, hard_ivl.min(maximum)),
            (good, good_ivl.min(maximum)),
            (easy, easy_ivl.min(maximum)),
        ]
    }

    fn schedule_review(&self, next: &mut SchedulingState, at: DateTime<Utc>, outcome: (MemoryState, u32)) {
        let (memory, interval) = outcome;
        self.set_memory(next, memory);
        next.state = CardState::Review;
        next.learning_steps = 0;
        next.scheduled_days = interval;
        next.due = add_days(at, interval);
    }

    /// Places the card on its next learning step, or graduates it to Review
    /// with a stability-based interval when the step sequence is exhausted.
    fn apply_learning_steps(
        &self,
        next: &mut SchedulingState,
        before: &SchedulingState,
        rating: Rating,
        at: DateTime<Utc>,
        to_state: CardState,
        seed: u64,
    ) {
        match steps::next_step(&self.config, before.state, before.learning_steps, rating) {
            Some(step) => {
                let max_minutes = self.config.maximum_interval.saturating_mul(MINUTES_PER_DAY);
                let minutes = step.minutes.clamp(1, max_minutes);
                next.state = to_state;
                next.learning_steps = step.next_step;
                next.scheduled_days = minutes / MINUTES_PER_DAY;
                next.due = add_minutes(at, minutes);
            }
            None => {
                let interval = self.next_interval(next.stability, next.elapsed_days, seed);
                next.state = CardState::Review;
                next.learning_steps = 0;
                next.scheduled_days = interval;
                next.due = add_days(at, interval);
            }
        }
    }
}
