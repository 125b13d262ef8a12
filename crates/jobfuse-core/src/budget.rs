//! Spend ceilings for metered job work.
//!
//! A [`BudgetGuard`] tracks cumulative token and dollar spend for one job
//! against fixed ceilings. Callers probe with [`BudgetGuard::can_spend`]
//! before attempting costly work, then commit the actual consumption with
//! [`BudgetGuard::record_spend`]; the commit re-checks the ceilings and is
//! the hard enforcement point.

use thiserror::Error;

use crate::config::BudgetConfig;

/// Errors from budget guard operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BudgetError {
    /// Committing the spend would push usage past the token or cost ceiling.
    ///
    /// Guard state is guaranteed unchanged when this is returned.
    #[error("budget exceeded: cannot spend {tokens} more tokens / ${cost_usd:.4} more")]
    Exceeded { tokens: u64, cost_usd: f64 },

    /// A negative or non-finite cost amount was supplied.
    #[error("invalid spend amount: {0}")]
    InvalidArgument(String),
}

/// Token and cost ceilings for one job's metered work.
///
/// Construct one guard per job at the start of metered work and discard it
/// when the job ends. Totals only ever grow; a rejected commit leaves them
/// untouched. Token amounts are `u64`, so negative token spends are ruled
/// out by the type; cost amounts are validated at call time.
///
/// The guard does no locking. If one instance must serve concurrently
/// executing attempts, the caller wraps the probe-then-commit pair in its
/// own mutual-exclusion region.
#[derive(Debug, Clone)]
pub struct BudgetGuard {
    /// Maximum tokens allowed over the job's lifetime
    max_tokens: u64,

    /// Maximum cost in USD over the job's lifetime
    max_cost_usd: f64,

    /// Tokens committed so far
    tokens_used: u64,

    /// Cost committed so far
    cost_used_usd: f64,
}

impl BudgetGuard {
    /// Create a guard with the given ceilings.
    ///
    /// A negative cost ceiling behaves as zero.
    pub fn new(max_tokens: u64, max_cost_usd: f64) -> Self {
        Self {
            max_tokens,
            max_cost_usd: max_cost_usd.max(0.0),
            tokens_used: 0,
            cost_used_usd: 0.0,
        }
    }

    /// Create a guard from a [`BudgetConfig`].
    pub fn from_config(config: &BudgetConfig) -> Self {
        Self::new(config.max_tokens, config.max_cost_usd)
    }

    /// Check whether the budget can absorb an additional spend.
    ///
    /// Pure predicate: never mutates the guard. Returns
    /// [`BudgetError::InvalidArgument`] for negative or non-finite costs.
    pub fn can_spend(&self, tokens: u64, cost_usd: f64) -> Result<bool, BudgetError> {
        check_cost(cost_usd)?;

        let tokens_ok = self
            .tokens_used
            .checked_add(tokens)
            .is_some_and(|projected| projected <= self.max_tokens);
        let cost_ok = self.cost_used_usd + cost_usd <= self.max_cost_usd;

        Ok(tokens_ok && cost_ok)
    }

    /// Commit a spend against the budget.
    ///
    /// Re-evaluates the same predicate as [`can_spend`](Self::can_spend);
    /// on [`BudgetError::Exceeded`] neither total moves (no partial
    /// credit). Zero-valued spends always succeed.
    pub fn record_spend(&mut self, tokens: u64, cost_usd: f64) -> Result<(), BudgetError> {
        if !self.can_spend(tokens, cost_usd)? {
            return Err(BudgetError::Exceeded { tokens, cost_usd });
        }

        self.tokens_used += tokens;
        self.cost_used_usd += cost_usd;
        Ok(())
    }

    /// Get the token ceiling.
    pub fn max_tokens(&self) -> u64 {
        self.max_tokens
    }

    /// Get the cost ceiling in USD.
    pub fn max_cost_usd(&self) -> f64 {
        self.max_cost_usd
    }

    /// Get tokens committed so far.
    pub fn tokens_used(&self) -> u64 {
        self.tokens_used
    }

    /// Get cost committed so far.
    pub fn cost_used_usd(&self) -> f64 {
        self.cost_used_usd
    }

    /// Get remaining tokens.
    pub fn tokens_remaining(&self) -> u64 {
        self.max_tokens.saturating_sub(self.tokens_used)
    }

    /// Get remaining cost headroom in USD.
    pub fn cost_remaining_usd(&self) -> f64 {
        (self.max_cost_usd - self.cost_used_usd).max(0.0)
    }
}

fn check_cost(cost_usd: f64) -> Result<(), BudgetError> {
    if !cost_usd.is_finite() {
        return Err(BudgetError::InvalidArgument(format!(
            "cost must be finite, got {cost_usd}"
        )));
    }
    if cost_usd < 0.0 {
        return Err(BudgetError::InvalidArgument(format!(
            "cost must be non-negative, got {cost_usd}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ceiling_enforcement() {
        let mut guard = BudgetGuard::new(1000, 5.00);

        assert!(guard.can_spend(600, 2.00).unwrap());
        guard.record_spend(600, 2.00).unwrap();
        assert_eq!(guard.tokens_used(), 600);
        assert_eq!(guard.cost_used_usd(), 2.00);

        // 600 + 500 > 1000: probe says no, commit errors, totals hold
        assert!(!guard.can_spend(500, 1.00).unwrap());
        let err = guard.record_spend(500, 1.00).unwrap_err();
        assert!(matches!(err, BudgetError::Exceeded { tokens: 500, .. }));
        assert_eq!(guard.tokens_used(), 600);
        assert_eq!(guard.cost_used_usd(), 2.00);
    }

    #[test]
    fn test_exact_ceiling_is_affordable() {
        let mut guard = BudgetGuard::new(100, 1.00);

        assert!(guard.can_spend(100, 1.00).unwrap());
        guard.record_spend(100, 1.00).unwrap();
        assert_eq!(guard.tokens_remaining(), 0);
        assert_eq!(guard.cost_remaining_usd(), 0.0);

        // One token over the now-exhausted ceiling
        assert!(!guard.can_spend(1, 0.0).unwrap());
    }

    #[test]
    fn test_zero_spend_always_succeeds() {
        let mut guard = BudgetGuard::new(0, 0.0);
        assert!(guard.can_spend(0, 0.0).unwrap());
        guard.record_spend(0, 0.0).unwrap();
        assert_eq!(guard.tokens_used(), 0);
    }

    #[test]
    fn test_either_ceiling_blocks() {
        let guard = BudgetGuard::new(1000, 1.00);

        // Tokens fit, cost does not
        assert!(!guard.can_spend(10, 2.00).unwrap());
        // Cost fits, tokens do not
        assert!(!guard.can_spend(2000, 0.10).unwrap());
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let mut guard = BudgetGuard::new(1000, 5.00);

        for bad in [-0.01, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                guard.can_spend(10, bad),
                Err(BudgetError::InvalidArgument(_))
            ));
            assert!(matches!(
                guard.record_spend(10, bad),
                Err(BudgetError::InvalidArgument(_))
            ));
        }

        // Nothing leaked into the totals
        assert_eq!(guard.tokens_used(), 0);
        assert_eq!(guard.cost_used_usd(), 0.0);
    }

    #[test]
    fn test_token_overflow_does_not_wrap() {
        let guard = BudgetGuard::new(u64::MAX, 1.0);
        let mut guard2 = guard.clone();
        guard2.record_spend(u64::MAX, 0.0).unwrap();
        assert!(!guard2.can_spend(1, 0.0).unwrap());
        assert!(guard2.record_spend(1, 0.0).is_err());
    }

    proptest! {
        // Any sequence of commits, accepted or not, keeps totals under
        // both ceilings.
        #[test]
        fn prop_totals_never_exceed_ceilings(
            spends in prop::collection::vec((0u64..500, 0.0f64..2.0), 0..64)
        ) {
            let mut guard = BudgetGuard::new(1_000, 5.00);
            for (tokens, cost) in spends {
                let _ = guard.record_spend(tokens, cost);
                prop_assert!(guard.tokens_used() <= guard.max_tokens());
                prop_assert!(guard.cost_used_usd() <= guard.max_cost_usd());
            }
        }
    }
}
