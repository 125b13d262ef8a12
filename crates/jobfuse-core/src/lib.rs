//! # jobfuse-core
//!
//! In-memory resilience primitives for bounding runaway automated jobs:
//! repeated paid API calls that could otherwise consume unbounded resources
//! or loop forever on persistent failures.
//!
//! Two independent primitives, composed by the caller around each unit of
//! metered work:
//!
//! - [`BudgetGuard`] — cumulative token/cost ceilings with a pure admission
//!   check and a hard commit.
//! - [`CircuitBreaker`] — consecutive-failure trip with a lazy, query-time
//!   half-open probe after a cooldown.
//!
//! ## Key Guarantees
//!
//! 1. **No I/O**: both primitives are pure in-memory accounting
//! 2. **No locking**: single-owner use, one instance per job
//! 3. **No background timers**: breaker recovery is computed from the
//!    monotonic clock at query time
//! 4. **No partial spend**: a rejected budget commit leaves totals untouched
//!
//! Neither primitive retries, schedules, or backs off; they only answer
//! "may I proceed?" and record outcomes. The calling convention lives in
//! `jobfuse-runtime`.
//!
//! ## Example
//!
//! ```rust
//! use jobfuse_core::{BudgetGuard, CircuitBreaker};
//! use std::time::Duration;
//!
//! let mut guard = BudgetGuard::new(1000, 5.00);
//! let mut breaker = CircuitBreaker::new(5, Duration::from_secs(60));
//!
//! if !breaker.is_open() && guard.can_spend(600, 2.00)? {
//!     // ... perform the metered work ...
//!     breaker.record_success();
//!     guard.record_spend(600, 2.00)?;
//! }
//! # Ok::<(), jobfuse_core::BudgetError>(())
//! ```

pub mod budget;
pub mod circuit_breaker;
pub mod config;

// Re-export main types at crate root
pub use budget::{BudgetError, BudgetGuard};
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use config::{BreakerConfig, BudgetConfig, ConfigError, ResilienceConfig};
