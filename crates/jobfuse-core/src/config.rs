//! Configuration for per-job resilience limits.
//!
//! Settings are supplied by the caller at job start, typically loaded from
//! YAML. Validation enforces the construction contracts of the primitives
//! so a bad config fails at load time rather than mid-job.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating resilience settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Spend ceilings for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Maximum tokens the job may consume
    pub max_tokens: u64,

    /// Maximum cost in USD the job may incur
    pub max_cost_usd: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_tokens: 100_000,
            max_cost_usd: 10.0,
        }
    }
}

/// Circuit breaker settings for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,

    /// Cooldown before a tripped circuit admits a probe attempt (in seconds)
    #[serde(with = "duration_secs")]
    pub reset_timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Resilience settings for one job: budget ceilings plus breaker tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Budget guard ceilings
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Circuit breaker settings
    #[serde(default)]
    pub breaker: BreakerConfig,
}

impl ResilienceConfig {
    /// Parse and validate settings from a YAML string.
    ///
    /// Missing sections fall back to defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the construction contracts of both primitives.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.breaker.failure_threshold == 0 {
            return Err(ConfigError::Invalid(
                "breaker.failure_threshold must be at least 1".to_string(),
            ));
        }
        if self.breaker.reset_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "breaker.reset_timeout must be greater than zero".to_string(),
            ));
        }
        if !self.budget.max_cost_usd.is_finite() || self.budget.max_cost_usd < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "budget.max_cost_usd must be non-negative and finite, got {}",
                self.budget.max_cost_usd
            )));
        }
        Ok(())
    }
}
