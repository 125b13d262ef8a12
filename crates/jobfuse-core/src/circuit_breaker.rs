//! Circuit breaker for repeatedly failing job attempts.
//!
//! After enough consecutive failures the circuit opens and blocks further
//! attempts. Once the reset timeout has elapsed, the next open-query clears
//! the trip and admits a single probe attempt; there is no background timer,
//! the transition is computed from the current time at query time.

use std::time::{Duration, Instant};

use crate::config::BreakerConfig;

/// State of the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, attempts admitted
    Closed,

    /// Tripped; attempts blocked until the reset timeout elapses
    Open { opened_at: Instant },
}

/// Consecutive-failure circuit breaker for one job's attempts.
///
/// The caller records the outcome of every attempt and consults
/// [`is_open`](CircuitBreaker::is_open) before starting the next one;
/// skipping the query is a caller defect the breaker cannot detect.
///
/// One instance per job, owned by its runner. No locking, no I/O; all
/// operations are synchronous comparisons against a monotonic clock.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    /// Consecutive failures before the circuit opens
    failure_threshold: u32,

    /// Cooldown before a tripped circuit admits a probe attempt
    reset_timeout: Duration,

    /// Failures since the last success or cooldown reset
    consecutive_failures: u32,

    state: CircuitState,
}

impl CircuitBreaker {
    /// Create a breaker. A threshold of zero is treated as one.
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
            consecutive_failures: 0,
            state: CircuitState::Closed,
        }
    }

    /// Create a breaker from a [`BreakerConfig`].
    pub fn from_config(config: &BreakerConfig) -> Self {
        Self::new(config.failure_threshold, config.reset_timeout)
    }

    /// Check whether attempts are currently blocked.
    ///
    /// If the circuit is open and the reset timeout has elapsed, this
    /// clears the trip and zeroes the failure counter before answering,
    /// granting exactly the next attempt a probe slot. Re-tripping after
    /// a probe takes a fresh full run of threshold failures.
    pub fn is_open(&mut self) -> bool {
        match self.state {
            CircuitState::Closed => false,
            CircuitState::Open { opened_at } => {
                if opened_at.elapsed() >= self.reset_timeout {
                    self.state = CircuitState::Closed;
                    self.consecutive_failures = 0;
                    tracing::info!("Circuit reset after cooldown, admitting probe attempt");
                    false
                } else {
                    true
                }
            }
        }
    }

    /// Record a successful attempt. Closes the circuit unconditionally.
    pub fn record_success(&mut self) {
        if matches!(self.state, CircuitState::Open { .. }) {
            tracing::info!("Circuit closed after successful attempt");
        }
        self.consecutive_failures = 0;
        self.state = CircuitState::Closed;
    }

    /// Record a failed attempt. Trips the circuit when the threshold is
    /// reached; failures while already open do not move the trip timestamp.
    pub fn record_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        if self.state == CircuitState::Closed && self.consecutive_failures >= self.failure_threshold
        {
            self.state = CircuitState::Open {
                opened_at: Instant::now(),
            };
            tracing::warn!(
                failures = self.consecutive_failures,
                "Circuit opened after repeated failures"
            );
        }
    }

    /// Get the current state without triggering the lazy probe.
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Get the consecutive failure count.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_starts_closed() {
        let mut cb = CircuitBreaker::new(3, Duration::from_secs(60));
        assert!(!cb.is_open());
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_opens_at_threshold() {
        let mut cb = CircuitBreaker::new(3, Duration::from_secs(60));

        cb.record_failure();
        cb.record_failure();
        assert!(!cb.is_open());

        cb.record_failure();
        assert!(cb.is_open());
        assert!(matches!(cb.state(), CircuitState::Open { .. }));
    }

    #[test]
    fn test_success_resets_failures() {
        let mut cb = CircuitBreaker::new(3, Duration::from_secs(60));

        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        assert_eq!(cb.consecutive_failures(), 0);

        // A fresh full run is needed to open
        cb.record_failure();
        cb.record_failure();
        assert!(!cb.is_open());
    }

    #[test]
    fn test_success_closes_open_circuit() {
        let mut cb = CircuitBreaker::new(1, Duration::from_secs(60));

        cb.record_failure();
        assert!(cb.is_open());

        cb.record_success();
        assert!(!cb.is_open());
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_query_before_timeout_changes_nothing() {
        let mut cb = CircuitBreaker::new(2, Duration::from_secs(60));

        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_open());
        assert!(cb.is_open());
        assert_eq!(cb.consecutive_failures(), 2);
    }

    #[test]
    fn test_resets_after_timeout() {
        let mut cb = CircuitBreaker::new(2, Duration::from_millis(20));

        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_open());

        sleep(Duration::from_millis(25));
        assert!(!cb.is_open());
        assert_eq!(cb.consecutive_failures(), 0);

        // Immediate re-query stays closed
        assert!(!cb.is_open());
    }

    #[test]
    fn test_failures_while_open_do_not_move_timestamp() {
        let mut cb = CircuitBreaker::new(1, Duration::from_millis(40));

        cb.record_failure();
        assert!(cb.is_open());

        sleep(Duration::from_millis(25));
        cb.record_failure();

        // 40ms from the original trip, not from the second failure
        sleep(Duration::from_millis(25));
        assert!(!cb.is_open());
    }

    #[test]
    fn test_retrip_needs_full_threshold_after_probe() {
        let mut cb = CircuitBreaker::new(2, Duration::from_millis(10));

        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_open());

        sleep(Duration::from_millis(15));
        assert!(!cb.is_open());

        // One failure after the probe slot is not enough to re-trip
        cb.record_failure();
        assert!(!cb.is_open());

        cb.record_failure();
        assert!(cb.is_open());
    }

    #[test]
    fn test_zero_threshold_behaves_as_one() {
        let mut cb = CircuitBreaker::new(0, Duration::from_secs(60));
        cb.record_failure();
        assert!(cb.is_open());
    }
}
