//! Scheduler configuration structures.

use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;
use crate::util::serde::LogicalTime;

/// Environment variable for [`SchedulerConfig::start_time`].
pub const ENV_START_TIME: &str = "EVENT_LOOP_START_TIME";
/// Environment variable for [`SchedulerConfig::max_microtasks_per_drain`].
pub const ENV_MAX_MICROTASKS: &str = "EVENT_LOOP_MAX_MICROTASKS";
/// Environment variable for [`SchedulerConfig::trace_capacity`].
pub const ENV_TRACE_CAPACITY: &str = "EVENT_LOOP_TRACE_CAPACITY";

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Initial value of the logical clock.
    #[serde(default)]
    pub start_time: LogicalTime,
    /// Items one microtask checkpoint may run before it is treated as runaway.
    #[serde(default = "default_max_microtasks")]
    pub max_microtasks_per_drain: usize,
    /// Capacity of the in-memory trace attached by the builder. 0 disables it.
    #[serde(default)]
    pub trace_capacity: usize,
}

const fn default_max_microtasks() -> usize {
    100_000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            start_time: 0,
            max_microtasks_per_drain: default_max_microtasks(),
            trace_capacity: 0,
        }
    }
}

impl SchedulerConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    /// `InvalidConfig` describing the first bad value.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.max_microtasks_per_drain == 0 {
            return Err(SchedulerError::InvalidConfig(
                "max_microtasks_per_drain must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    ///
    /// # Errors
    /// `InvalidConfig` on parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| SchedulerError::InvalidConfig(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the environment, reading `.env` first if one
    /// exists. Unset variables keep their defaults.
    ///
    /// # Errors
    /// `InvalidConfig` if a variable does not parse or validation fails.
    pub fn from_env() -> Result<Self, SchedulerError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Same as [`SchedulerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SchedulerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = parse_var(&lookup, ENV_START_TIME)? {
            cfg.start_time = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_MAX_MICROTASKS)? {
            cfg.max_microtasks_per_drain = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_TRACE_CAPACITY)? {
            cfg.trace_capacity = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, SchedulerError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| SchedulerError::InvalidConfig(format!("{name}={raw:?}: {e}")))
        })
        .transpose()
}
