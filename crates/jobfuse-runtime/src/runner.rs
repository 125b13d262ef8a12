//! Job runner glue: wraps each metered attempt with the circuit breaker
//! and budget guard.
//!
//! Per-attempt flow:
//! 1. Query the breaker; an open circuit blocks the attempt outright.
//! 2. Check the budget against the caller's estimate (side-effect free).
//! 3. Run the work, under a timeout when one is configured.
//! 4. Record the outcome on the breaker and commit the actual spend.
//!
//! The runner performs no retries, scheduling, or backoff; it runs exactly
//! the one attempt it is given and reports what happened.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use jobfuse_core::{BudgetError, BudgetGuard, CircuitBreaker, CircuitState, ResilienceConfig};

use crate::usage::{AttemptUsage, JobUsage};

/// Errors from running a guarded attempt.
#[derive(Error, Debug)]
pub enum RunnerError<E> {
    /// The circuit is open; the attempt was not started.
    #[error("circuit open: attempt blocked")]
    CircuitOpen,

    /// The budget cannot absorb the estimated or actual spend.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// The attempt ran past the configured timeout.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The attempt itself failed.
    #[error("attempt failed: {0}")]
    Attempt(E),
}

/// Composes one [`BudgetGuard`] and one [`CircuitBreaker`] around a job's
/// metered attempts.
///
/// Construct one runner per job at job start and discard it with the job;
/// never share a runner across jobs. The runner owns its primitives, so the
/// single-owner contract of `jobfuse-core` holds by construction.
pub struct JobRunner {
    guard: BudgetGuard,
    breaker: CircuitBreaker,
    usage: JobUsage,
    attempt_timeout: Option<Duration>,
}

impl JobRunner {
    /// Create a runner from per-job resilience settings.
    pub fn new(config: &ResilienceConfig) -> Self {
        Self {
            guard: BudgetGuard::from_config(&config.budget),
            breaker: CircuitBreaker::from_config(&config.breaker),
            usage: JobUsage::default(),
            attempt_timeout: None,
        }
    }

    /// Apply a wall-clock timeout to each attempt. A timed-out attempt
    /// counts as a breaker failure.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Run one metered attempt through the breaker and budget guard.
    ///
    /// `estimate` is checked against the budget before the work starts; the
    /// actual [`AttemptUsage`] reported by the work is what gets committed.
    /// If the actual spend overruns the remaining budget, the commit error
    /// propagates — the work already happened, and swallowing the overrun
    /// would let the job keep spending.
    pub async fn run_attempt<F, Fut, T, E>(
        &mut self,
        estimate: AttemptUsage,
        work: F,
    ) -> Result<T, RunnerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(T, AttemptUsage), E>>,
        E: std::fmt::Display,
    {
        if self.breaker.is_open() {
            tracing::warn!("Circuit open, attempt blocked");
            self.usage.record_blocked();
            return Err(RunnerError::CircuitOpen);
        }

        if !self.guard.can_spend(estimate.tokens, estimate.cost_usd)? {
            tracing::warn!(
                tokens = estimate.tokens,
                cost_usd = estimate.cost_usd,
                "Budget cannot absorb estimated spend, attempt blocked"
            );
            self.usage.record_blocked();
            return Err(RunnerError::Budget(BudgetError::Exceeded {
                tokens: estimate.tokens,
                cost_usd: estimate.cost_usd,
            }));
        }

        let outcome = match self.attempt_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, work()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(timeout = ?timeout, "Attempt timed out");
                    self.breaker.record_failure();
                    self.usage.record_failure();
                    return Err(RunnerError::Timeout(timeout));
                }
            },
            None => work().await,
        };

        match outcome {
            Ok((value, used)) => {
                self.breaker.record_success();
                self.guard.record_spend(used.tokens, used.cost_usd)?;
                self.usage.record_success(&used);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Attempt failed");
                self.breaker.record_failure();
                self.usage.record_failure();
                Err(RunnerError::Attempt(e))
            }
        }
    }

    /// Get accumulated usage for the job so far.
    pub fn usage(&self) -> &JobUsage {
        &self.usage
    }

    /// Get the budget guard (read-only).
    pub fn budget(&self) -> &BudgetGuard {
        &self.guard
    }

    /// Get the breaker state without triggering the lazy probe.
    pub fn breaker_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Get the breaker's consecutive failure count.
    pub fn consecutive_failures(&self) -> u32 {
        self.breaker.consecutive_failures()
    }
}
