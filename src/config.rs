use crate::fsrs::params::{parse_steps, LearningStep, SchedulerConfig, WEIGHT_COUNT};

/// Scheduler settings read from the environment. Logging is configured
/// separately by `LogSettings::from_env`, before this runs.
#[derive(Debug, Clone)]
pub struct Config {
    pub scheduler: SchedulerConfig,
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_weights(value: &str) -> Option<[f64; WEIGHT_COUNT]> {
    let parsed: Vec<f64> = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    parsed.try_into().ok()
}

fn parse_step_list(value: &str) -> Option<Vec<LearningStep>> {
    parse_steps(value).ok()
}

/// Reads `key` and parses it, keeping `default` when the variable is unset or unparseable.
fn env_or<T>(key: &str, default: T, parse: impl FnOnce(&str) -> Option<T>) -> T {
    match std::env::var(key) {
        Ok(raw) => parse(&raw).unwrap_or_else(|| {
            tracing::warn!(key, value = %raw, "ignoring unparseable environment value");
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = SchedulerConfig::default();

        let scheduler = SchedulerConfig {
            request_retention: env_or("FSRS_REQUEST_RETENTION", defaults.request_retention, |v| {
                v.trim().parse().ok()
            }),
            maximum_interval: env_or("FSRS_MAXIMUM_INTERVAL", defaults.maximum_interval, |v| {
                v.trim().parse().ok()
            }),
            w: env_or("FSRS_WEIGHTS", defaults.w, parse_weights),
            learning_steps: env_or("FSRS_LEARNING_STEPS", defaults.learning_steps, parse_step_list),
            relearning_steps: env_or(
                "FSRS_RELEARNING_STEPS",
                defaults.relearning_steps,
                parse_step_list,
            ),
            enable_fuzz: env_or("FSRS_ENABLE_FUZZ", defaults.enable_fuzz, parse_bool),
            enable_short_term: env_or(
                "FSRS_ENABLE_SHORT_TERM",
                defaults.enable_short_term,
                parse_bool,
            ),
        };

        Self { scheduler }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsrs::params::DEFAULT_WEIGHTS;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_weights_requires_full_set() {
        let joined = DEFAULT_WEIGHTS
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(parse_weights(&joined), Some(DEFAULT_WEIGHTS));
        assert_eq!(parse_weights("0.4, 0.6, 2.4"), None);
        assert_eq!(parse_weights("a,b"), None);
    }

    #[test]
    fn test_from_env_applies_overrides() {
        std::env::set_var("FSRS_MAXIMUM_INTERVAL", "365");
        std::env::set_var("FSRS_RELEARNING_STEPS", "5m,1h");
        std::env::set_var("FSRS_ENABLE_FUZZ", "nope");
        let config = Config::from_env();
        std::env::remove_var("FSRS_MAXIMUM_INTERVAL");
        std::env::remove_var("FSRS_RELEARNING_STEPS");
        std::env::remove_var("FSRS_ENABLE_FUZZ");

        assert_eq!(config.scheduler.maximum_interval, 365);
        assert_eq!(
            config.scheduler.relearning_steps,
            vec![LearningStep::minutes(5), LearningStep::hours(1)]
        );
        assert!(!config.scheduler.enable_fuzz);
        assert_eq!(config.scheduler.request_retention, SchedulerConfig::default().request_retention);
    }

    #[test]
    fn test_env_or_falls_back() {
        std::env::set_var("FSRS_TEST_ENV_OR_BAD", "not-a-number");
        assert_eq!(env_or("FSRS_TEST_ENV_OR_BAD", 7u32, |v| v.parse().ok()), 7);
        std::env::set_var("FSRS_TEST_ENV_OR_GOOD", "12");
        assert_eq!(env_or("FSRS_TEST_ENV_OR_GOOD", 7u32, |v| v.parse().ok()), 12);
        assert_eq!(env_or("FSRS_TEST_ENV_OR_UNSET", 7u32, |v| v.parse().ok()), 7);
    }
}
