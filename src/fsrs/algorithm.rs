//! FSRS-6 memory model.
//!
//! Pure numeric functions over stability (S, days), difficulty (D, 1..=10)
//! and retrievability (R, 0..=1). Ratings enter as their grade value 1..=4.

use super::card::Rating;
use super::params::WEIGHT_COUNT;

pub const S_MIN: f64 = 0.001;
pub const S_MAX: f64 = 36500.0;
pub const D_MIN: f64 = 1.0;
pub const D_MAX: f64 = 10.0;

type Weights = [f64; WEIGHT_COUNT];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryState {
    pub stability: f64,
    pub difficulty: f64,
}

fn decay(w: &Weights) -> f64 {
    -w[20]
}

/// Chosen so that R(S, S) = 0.9 for every decay.
fn factor(w: &Weights) -> f64 {
    0.9f64.powf(1.0 / decay(w)) - 1.0
}

fn grade(rating: Rating) -> f64 {
    rating.grade() as f64
}

fn clamp_stability(s: f64) -> f64 {
    s.clamp(S_MIN, S_MAX)
}

fn clamp_difficulty(d: f64) -> f64 {
    d.clamp(D_MIN, D_MAX)
}

pub fn retrievability(w: &Weights, elapsed_days: f64, stability: f64) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    let t = elapsed_days.max(0.0);
    (1.0 + factor(w) * t / stability).powf(decay(w))
}

/// Unrounded interval (days) at which retrievability falls to `request_retention`.
pub fn raw_interval(w: &Weights, stability: f64, request_retention: f64) -> f64 {
    stability / factor(w) * (request_retention.powf(1.0 / decay(w)) - 1.0)
}

pub fn init_stability(w: &Weights, rating: Rating) -> f64 {
    clamp_stability(w[rating.grade() as usize - 1])
}

/// Unclamped; mean reversion targets the raw Easy value.
fn raw_init_difficulty(w: &Weights, rating: Rating) -> f64 {
    w[4] - (w[5] * (grade(rating) - 1.0)).exp() + 1.0
}

pub fn init_difficulty(w: &Weights, rating: Rating) -> f64 {
    clamp_difficulty(raw_init_difficulty(w, rating))
}

pub fn init_state(w: &Weights, rating: Rating) -> MemoryState {
    MemoryState {
        stability: init_stability(w, rating),
        difficulty: init_difficulty(w, rating),
    }
}

fn linear_damping(delta: f64, d: f64) -> f64 {
    delta * (10.0 - d) / 9.0
}

pub fn next_difficulty(w: &Weights, d: f64, rating: Rating) -> f64 {
    let delta = -w[6] * (grade(rating) - 3.0);
    let damped = d + linear_damping(delta, d);
    let reverted = w[7] * raw_init_difficulty(w, Rating::Easy) + (1.0 - w[7]) * damped;
    clamp_difficulty(reverted)
}

pub fn next_recall_stability(w: &Weights, d: f64, s: f64, r: f64, rating: Rating) -> f64 {
    let hard_penalty = if rating == Rating::Hard { w[15] } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { w[16] } else { 1.0 };
    let growth = w[8].exp()
        * (11.0 - d)
        * s.powf(-w[9])
        * ((1.0 - r) * w[10]).exp_m1()
        * hard_penalty
        * easy_bonus;
    clamp_stability(s * (1.0 + growth))
}

pub fn next_forget_stability(w: &Weights, d: f64, s: f64, r: f64) -> f64 {
    let s_new = w[11] * d.powf(-w[12]) * ((s + 1.0).powf(w[13]) - 1.0) * ((1.0 - r) * w[14]).exp();
    clamp_stability(s_new)
}

pub fn next_short_term_stability(w: &Weights, s: f64, rating: Rating) -> f64 {
    let mut increase = (w[17] * (grade(rating) - 3.0 + w[18])).exp() * s.powf(-w[19]);
    if rating >= Rating::Good {
        increase = increase.max(1.0);
    }
    clamp_stability(s * increase)
}

/// Memory state after a review of a card with history.
///
/// `elapsed_days == 0` with short-term enabled uses the same-day formula;
/// otherwise recall or forget stability depending on the rating.
pub fn next_state(
    w: &Weights,
    memory: MemoryState,
    elapsed_days: f64,
    rating: Rating,
    enable_short_term: bool,
) -> MemoryState {
    let MemoryState {
        stability: s,
        difficulty: d,
    } = memory;
    if s <= 0.0 || d <= 0.0 {
        return init_state(w, rating);
    }

    let r = retrievability(w, elapsed_days, s);
    let difficulty = next_difficulty(w, d, rating);

    let stability = if elapsed_days <= 0.0 && enable_short_term {
        next_short_term_stability(w, s, rating)
    } else if rating == Rating::Again {
        let (w17, w18) = if enable_short_term { (w[17], w[18]) } else { (0.0, 0.0) };
        let ceiling = s / (w17 * w18).exp();
        next_forget_stability(w, d, s, r).min(ceiling).min(s).max(S_MIN)
    } else {
        next_recall_stability(w, d, s, r, rating)
    };

    MemoryState {
        stability,
        difficulty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsrs::params::DEFAULT_WEIGHTS;

    const W: Weights = DEFAULT_WEIGHTS;

    #[test]
    fn test_retrievability_decay() {
        let r_0 = retrievability(&W, 0.0, 10.0);
        let r_5 = retrievability(&W, 5.0, 10.0);
        let r_10 = retrievability(&W, 10.0, 10.0);
        assert!((r_0 - 1.0).abs() < 1e-12);
        assert!(r_0 > r_5 && r_5 > r_10);
        assert!((r_10 - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_interval_equals_stability_at_ninety_percent() {
        let i = raw_interval(&W, 7.5, 0.9);
        assert!((i - 7.5).abs() < 1e-9);
        assert!(raw_interval(&W, 7.5, 0.95) < i);
        assert!(raw_interval(&W, 7.5, 0.8) > i);
    }

    #[test]
    fn test_initial_values() {
        assert_eq!(init_stability(&W, Rating::Again), W[0]);
        assert_eq!(init_stability(&W, Rating::Easy), W[3]);
        let d_again = init_difficulty(&W, Rating::Again);
        let d_easy = init_difficulty(&W, Rating::Easy);
        assert!((d_again - W[4]).abs() < 1e-12);
        assert!(d_easy < d_again);
        assert!((D_MIN..=D_MAX).contains(&d_easy));
    }

    #[test]
    fn test_difficulty_stays_clamped() {
        let mut d = init_difficulty(&W, Rating::Again);
        for _ in 0..100 {
            d = next_difficulty(&W, d, Rating::Again);
        }
        assert!(d <= D_MAX && d >= D_MIN);

        let mut d = init_difficulty(&W, Rating::Easy);
        for _ in 0..100 {
            d = next_difficulty(&W, d, Rating::Easy);
        }
        assert!(d <= D_MAX && d >= D_MIN);
    }

    #[test]
    fn test_recall_grows_and_forget_shrinks() {
        let (d, s) = (5.0, 3.0);
        let r = retrievability(&W, s, s);
        let hard = next_recall_stability(&W, d, s, r, Rating::Hard);
        let good = next_recall_stability(&W, d, s, r, Rating::Good);
        let easy = next_recall_stability(&W, d, s, r, Rating::Easy);
        assert!(s < hard && hard < good && good < easy);

        let forgot = next_state(
            &W,
            MemoryState { stability: s, difficulty: d },
            3.0,
            Rating::Again,
            true,
        );
        assert!(forgot.stability < s);
        assert!(forgot.difficulty > d);
    }

    #[test]
    fn test_short_term_good_never_shrinks() {
        for s in [0.1, 1.0, 5.0, 50.0] {
            assert!(next_short_term_stability(&W, s, Rating::Good) >= s);
            assert!(next_short_term_stability(&W, s, Rating::Easy) >= s);
        }
        assert!(next_short_term_stability(&W, 5.0, Rating::Again) < 5.0);
    }

    #[test]
    fn test_next_state_same_day_uses_short_term() {
        let memory = MemoryState { stability: 2.0, difficulty: 5.0 };
        let same_day = next_state(&W, memory, 0.0, Rating::Good, true);
        assert_eq!(same_day.stability, next_short_term_stability(&W, 2.0, Rating::Good));

        let long_term = next_state(&W, memory, 0.0, Rating::Good, false);
        let r = retrievability(&W, 0.0, 2.0);
        assert_eq!(long_term.stability, next_recall_stability(&W, 5.0, 2.0, r, Rating::Good));
    }

    #[test]
    fn test_next_state_blank_memory_initialises() {
        let memory = MemoryState { stability: 0.0, difficulty: 0.0 };
        assert_eq!(next_state(&W, memory, 4.0, Rating::Good, true), init_state(&W, Rating::Good));
    }
}
