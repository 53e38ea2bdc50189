//! Learning-step strategy for New, Learning and Relearning cards.
//!
//! Returns `None` when the rating leaves the step sequence, meaning the
//! card graduates to (or stays in) Review with a stability-based interval.

use super::card::{CardState, Rating};
use super::params::{LearningStep, SchedulerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub minutes: u32,
    pub next_step: u32,
}

fn sequence(config: &SchedulerConfig, from: CardState) -> &[LearningStep] {
    match from {
        CardState::New | CardState::Learning => &config.learning_steps,
        CardState::Review | CardState::Relearning => &config.relearning_steps,
    }
}

fn hard_minutes(steps: &[LearningStep], current: usize) -> u32 {
    match (current, steps) {
        (0, [only]) => (f64::from(only.as_minutes()) * 1.5).round() as u32,
        (0, [first, second, ..]) => {
            ((f64::from(first.as_minutes()) + f64::from(second.as_minutes())) / 2.0).round() as u32
        }
        _ => steps[current].as_minutes(),
    }
}

pub fn next_step(
    config: &SchedulerConfig,
    from: CardState,
    current_step: u32,
    rating: Rating,
) -> Option<StepOutcome> {
    let steps = sequence(config, from);
    let first = steps.first()?;

    if from == CardState::Review {
        return (rating == Rating::Again).then(|| StepOutcome {
            minutes: first.as_minutes(),
            next_step: 0,
        });
    }

    // Stale indices (the step list shrank since the card was stored) hold at the last step.
    let current = if from == CardState::New {
        0
    } else {
        (current_step as usize).min(steps.len() - 1)
    };

    match rating {
        Rating::Again => Some(StepOutcome {
            minutes: first.as_minutes(),
            next_step: 0,
        }),
        Rating::Hard => Some(StepOutcome {
            minutes: hard_minutes(steps, current),
            next_step: current as u32,
        }),
        Rating::Good => steps.get(current + 1).map(|step| StepOutcome {
            minutes: step.as_minutes(),
            next_step: current as u32 + 1,
        }),
        Rating::Easy => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(learning: &[u32], relearning: &[u32]) -> SchedulerConfig {
        SchedulerConfig {
            learning_steps: learning.iter().copied().map(LearningStep::minutes).collect(),
            relearning_steps: relearning.iter().copied().map(LearningStep::minutes).collect(),
            ..SchedulerConfig::default()
        }
    }

    #[test]
    fn test_new_card_steps() {
        let c = config(&[1, 10], &[10]);
        let at = |r| next_step(&c, CardState::New, 7, r);
        assert_eq!(at(Rating::Again), Some(StepOutcome { minutes: 1, next_step: 0 }));
        assert_eq!(at(Rating::Hard), Some(StepOutcome { minutes: 6, next_step: 0 }));
        assert_eq!(at(Rating::Good), Some(StepOutcome { minutes: 10, next_step: 1 }));
        assert_eq!(at(Rating::Easy), None);
    }

    #[test]
    fn test_learning_last_step_graduates_on_good() {
        let c = config(&[1, 10], &[10]);
        assert_eq!(next_step(&c, CardState::Learning, 1, Rating::Good), None);
        assert_eq!(
            next_step(&c, CardState::Learning, 1, Rating::Hard),
            Some(StepOutcome { minutes: 10, next_step: 1 })
        );
        assert_eq!(
            next_step(&c, CardState::Learning, 1, Rating::Again),
            Some(StepOutcome { minutes: 1, next_step: 0 })
        );
    }

    #[test]
    fn test_single_step_hard_is_one_and_a_half() {
        let c = config(&[10], &[10]);
        assert_eq!(
            next_step(&c, CardState::Relearning, 0, Rating::Hard),
            Some(StepOutcome { minutes: 15, next_step: 0 })
        );
        assert_eq!(next_step(&c, CardState::Relearning, 0, Rating::Good), None);
    }

    #[test]
    fn test_review_only_again_enters_relearning() {
        let c = config(&[1, 10], &[10, 60]);
        assert_eq!(
            next_step(&c, CardState::Review, 3, Rating::Again),
            Some(StepOutcome { minutes: 10, next_step: 0 })
        );
        for rating in [Rating::Hard, Rating::Good, Rating::Easy] {
            assert_eq!(next_step(&c, CardState::Review, 0, rating), None);
        }
    }

    #[test]
    fn test_empty_sequences_graduate() {
        let c = config(&[], &[]);
        for rating in Rating::ALL {
            assert_eq!(next_step(&c, CardState::New, 0, rating), None);
            assert_eq!(next_step(&c, CardState::Review, 0, rating), None);
        }
    }

    #[test]
    fn test_stale_step_index_holds_last_step() {
        let c = config(&[1, 10], &[10]);
        assert_eq!(
            next_step(&c, CardState::Learning, 9, Rating::Hard),
            Some(StepOutcome { minutes: 10, next_step: 1 })
        );
        assert_eq!(next_step(&c, CardState::Learning, 9, Rating::Good), None);
    }
}
