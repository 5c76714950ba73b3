/*!
 * Scheduler Configuration
 *
 * Runtime configuration loaded from defaults, JSON, or SCHEDULER_* environment variables
 */

use super::types::{DelayPolicy, ShutdownMode};
use crate::core::errors::SchedulerError;
use crate::core::limits::{
    DEFAULT_MAX_WAIT, DEFAULT_SLOW_TASK_THRESHOLD, DEFAULT_WORKER_NAME, ENV_PREFIX,
};
use crate::core::types::SchedulerResult;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::str::FromStr;
use std::time::Duration;

/// Scheduler configuration
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Selection rule when delayed work is pending
    pub delay_policy: DelayPolicy,
    /// Treatment of pending work on stop
    pub shutdown_mode: ShutdownMode,
    /// Longest single timed wait of the worker
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "max_wait_ms")]
    pub max_wait: Duration,
    /// Tasks running longer than this are logged as slow
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "slow_task_ms")]
    pub slow_task_threshold: Duration,
    /// Name given to the worker thread
    pub worker_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            delay_policy: DelayPolicy::default(),
            shutdown_mode: ShutdownMode::default(),
            max_wait: DEFAULT_MAX_WAIT,
            slow_task_threshold: DEFAULT_SLOW_TASK_THRESHOLD,
            worker_name: DEFAULT_WORKER_NAME.to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn with_delay_policy(mut self, policy: DelayPolicy) -> Self {
        self.delay_policy = policy;
        self
    }

    pub fn with_shutdown_mode(mut self, mode: ShutdownMode) -> Self {
        self.shutdown_mode = mode;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_slow_task_threshold(mut self, threshold: Duration) -> Self {
        self.slow_task_threshold = threshold;
        self
    }

    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> SchedulerResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SchedulerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by SCHEDULER_* environment variables
    ///
    /// Environment variables:
    /// - SCHEDULER_DELAY_POLICY: head_of_line | eligible_first
    /// - SCHEDULER_SHUTDOWN_MODE: drain_eligible | abandon
    /// - SCHEDULER_MAX_WAIT_MS: longest single worker wait
    /// - SCHEDULER_SLOW_TASK_MS: slow task warning threshold
    /// - SCHEDULER_WORKER_NAME: worker thread name
    pub fn from_env() -> SchedulerResult<Self> {
        let mut config = Self::default();

        if let Some(policy) = env_parse::<DelayPolicy>("DELAY_POLICY")? {
            config.delay_policy = policy;
        }
        if let Some(mode) = env_parse::<ShutdownMode>("SHUTDOWN_MODE")? {
            config.shutdown_mode = mode;
        }
        if let Some(ms) = env_parse::<u64>("MAX_WAIT_MS")? {
            config.max_wait = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("SLOW_TASK_MS")? {
            config.slow_task_threshold = Duration::from_millis(ms);
        }
        if let Some(name) = env_var("WORKER_NAME") {
            config.worker_name = name;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SchedulerResult<()> {
        if self.max_wait.is_zero() {
            return Err(SchedulerError::InvalidConfig(
                "max_wait_ms must be greater than zero".to_string(),
            ));
        }
        if self.worker_name.trim().is_empty() {
            return Err(SchedulerError::InvalidConfig(
                "worker_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, key)).ok()
}

fn env_parse<T>(key: &str) -> SchedulerResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            SchedulerError::InvalidConfig(format!("{}{}={:?}: {}", ENV_PREFIX, key, raw, e))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SchedulerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delay_policy, DelayPolicy::HeadOfLine);
        assert_eq!(config.shutdown_mode, ShutdownMode::DrainEligible);
        assert_eq!(config.max_wait, DEFAULT_MAX_WAIT);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SchedulerConfig::from_json(
            r#"{"delay_policy": "eligible_first", "max_wait_ms": 25}"#,
        )
        .unwrap();
        assert_eq!(config.delay_policy, DelayPolicy::EligibleFirst);
        assert_eq!(config.max_wait, Duration::from_millis(25));
        assert_eq!(config.worker_name, DEFAULT_WORKER_NAME);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            SchedulerConfig::from_json(r#"{"max_wait_ms": 0}"#),
            Err(SchedulerError::InvalidConfig(_))
        ));
        assert!(matches!(
            SchedulerConfig::from_json(r#"{"shutdown_mode": "whenever"}"#),
            Err(SchedulerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builder_round_trips_through_json() {
        let config = SchedulerConfig::default()
            .with_shutdown_mode(ShutdownMode::Abandon)
            .with_slow_task_threshold(Duration::from_millis(7))
            .with_worker_name("bg");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""slow_task_ms":7"#));
        assert_eq!(SchedulerConfig::from_json(&json).unwrap(), config);
    }
}
