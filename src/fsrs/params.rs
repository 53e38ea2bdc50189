use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

pub const WEIGHT_COUNT: usize = 21;

pub const DEFAULT_REQUEST_RETENTION: f64 = 0.9;
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 36500;

pub const MINUTES_PER_DAY: u32 = 1440;

/// FSRS-6 default weights.
pub const DEFAULT_WEIGHTS: [f64; WEIGHT_COUNT] = [
    0.212, 1.2931, 2.3065, 8.2956, // w0-w3: initial stability per rating
    6.4133, 0.8334, // w4-w5: initial difficulty
    3.0194, 0.001, // w6-w7: difficulty delta, mean reversion
    1.8722, 0.1666, 0.796, // w8-w10: recall stability
    1.4835, 0.0614, 0.2629, 1.6483, // w11-w14: forget stability
    0.6014, 1.8729, // w15-w16: hard penalty, easy bonus
    0.5425, 0.0912, 0.0658, // w17-w19: short-term stability
    0.1542, // w20: forgetting curve decay
];

/// One entry of a learning or relearning step sequence, stored in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LearningStep {
    minutes: u32,
}

impl LearningStep {
    pub const fn minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    pub const fn hours(hours: u32) -> Self {
        Self { minutes: hours * 60 }
    }

    pub const fn days(days: u32) -> Self {
        Self {
            minutes: days * MINUTES_PER_DAY,
        }
    }

    pub fn as_minutes(self) -> u32 {
        self.minutes
    }

    pub fn is_sub_day(self) -> bool {
        self.minutes < MINUTES_PER_DAY
    }
}

impl fmt::Display for LearningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.minutes;
        if m != 0 && m % MINUTES_PER_DAY == 0 {
            write!(f, "{}d", m / MINUTES_PER_DAY)
        } else if m != 0 && m % 60 == 0 {
            write!(f, "{}h", m / 60)
        } else {
            write!(f, "{m}m")
        }
    }
}

impl FromStr for LearningStep {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || SchedulerError::InvalidStep(s.to_string());
        let split = s.len().checked_sub(1).ok_or_else(invalid)?;
        if !s.is_char_boundary(split) {
            return Err(invalid());
        }
        let (value, unit) = s.split_at(split);
        let value: u32 = value.trim().parse().map_err(|_| invalid())?;
        let minutes = match unit {
            "m" => Some(value),
            "h" => value.checked_mul(60),
            "d" => value.checked_mul(MINUTES_PER_DAY),
            _ => None,
        }
        .ok_or_else(invalid)?;
        Ok(Self { minutes })
    }
}

impl Serialize for LearningStep {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LearningStep {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a comma-separated step list such as `"1m, 10m"`. An empty string is an empty list.
pub fn parse_steps(raw: &str) -> Result<Vec<LearningStep>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}

/// Deployment-wide scheduler settings. Fixed for the lifetime of a `Scheduler`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    pub request_retention: f64,
    pub maximum_interval: u32,
    pub w: [f64; WEIGHT_COUNT],
    pub learning_steps: Vec<LearningStep>,
    pub relearning_steps: Vec<LearningStep>,
    pub enable_fuzz: bool,
    pub enable_short_term: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            request_retention: DEFAULT_REQUEST_RETENTION,
            maximum_interval: DEFAULT_MAXIMUM_INTERVAL,
            w: DEFAULT_WEIGHTS,
            learning_steps: vec![LearningStep::minutes(1), LearningStep::minutes(10)],
            relearning_steps: vec![LearningStep::minutes(10)],
            enable_fuzz: false,
            enable_short_term: true,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.request_retention > 0.0 && self.request_retention < 1.0) {
            return Err(SchedulerError::InvalidConfig(format!(
                "request retention must lie in (0, 1), got {}",
                self.request_retention
            )));
        }
        if self.maximum_interval < 1 {
            return Err(SchedulerError::InvalidConfig(
                "maximum interval must be at least 1 day".to_string(),
            ));
        }
        if let Some((i, w)) = self.w.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(SchedulerError::InvalidConfig(format!("weight w{i} is not finite: {w}")));
        }
        if self.w[20] <= 0.0 {
            return Err(SchedulerError::InvalidConfig(format!(
                "decay weight w20 must be positive, got {}",
                self.w[20]
            )));
        }
        for w in &self.w[..4] {
            if *w <= 0.0 {
                return Err(SchedulerError::InvalidConfig(format!(
                    "initial stability weights must be positive, got {w}"
                )));
            }
        }

        let max_minutes = u64::from(self.maximum_interval) * u64::from(MINUTES_PER_DAY);
        for step in self.learning_steps.iter().chain(&self.relearning_steps) {
            if step.as_minutes() == 0 {
                return Err(SchedulerError::InvalidConfig("learning steps must be non-zero".to_string()));
            }
            if u64::from(step.as_minutes()) > max_minutes {
                return Err(SchedulerError::InvalidConfig(format!(
                    "learning step {step} exceeds the maximum interval of {} days",
                    self.maximum_interval
                )));
            }
        }
        Ok(())
    }
}
