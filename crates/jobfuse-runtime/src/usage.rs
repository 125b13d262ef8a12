//! Accumulated usage accounting for one job run.

use serde::{Deserialize, Serialize};

/// Tokens and cost consumed by a single completed attempt, as reported by
/// the metered work itself.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AttemptUsage {
    /// Tokens consumed
    pub tokens: u64,

    /// Cost in USD
    pub cost_usd: f64,
}

impl AttemptUsage {
    /// Create a usage report.
    pub fn new(tokens: u64, cost_usd: f64) -> Self {
        Self { tokens, cost_usd }
    }
}

/// Accumulated usage across a job's attempts.
///
/// Serializable so callers can attach it to their own logs or billing
/// records when the job ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobUsage {
    /// Total tokens committed against the budget
    pub total_tokens: u64,

    /// Total cost in USD committed against the budget
    pub total_cost_usd: f64,

    /// Attempts started (admitted past the breaker and budget)
    pub attempts: u32,

    /// Attempts that completed successfully
    pub successes: u32,

    /// Attempts that failed or timed out
    pub failures: u32,

    /// Attempts refused up front by the breaker or budget
    pub blocked: u32,
}

impl JobUsage {
    pub(crate) fn record_success(&mut self, used: &AttemptUsage) {
        self.attempts += 1;
        self.successes += 1;
        self.total_tokens += used.tokens;
        self.total_cost_usd += used.cost_usd;
    }

    pub(crate) fn record_failure(&mut self) {
        self.attempts += 1;
        self.failures += 1;
    }

    pub(crate) fn record_blocked(&mut self) {
        self.blocked += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let mut usage = JobUsage::default();

        usage.record_success(&AttemptUsage::new(120, 0.05));
        usage.record_failure();
        usage.record_blocked();

        assert_eq!(usage.attempts, 2);
        assert_eq!(usage.successes, 1);
        assert_eq!(usage.failures, 1);
        assert_eq!(usage.blocked, 1);
        assert_eq!(usage.total_tokens, 120);
        assert_eq!(usage.total_cost_usd, 0.05);
    }
}
