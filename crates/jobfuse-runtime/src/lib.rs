//! # jobfuse-runtime
//!
//! Job runner glue for the `jobfuse-core` resilience primitives.
//!
//! This crate is OPTIONAL. The primitives in `jobfuse-core` are fully
//! synchronous and can be composed by hand; this crate packages the
//! recommended calling convention — breaker query, budget pre-check, timed
//! attempt, outcome recording — for async jobs.
//!
//! ## Example
//!
//! ```rust,ignore
//! use jobfuse_core::ResilienceConfig;
//! use jobfuse_runtime::{AttemptUsage, JobRunner};
//!
//! let config = ResilienceConfig::from_yaml(&settings_yaml)?;
//! let mut runner = JobRunner::new(&config);
//!
//! let reply = runner
//!     .run_attempt(AttemptUsage::new(500, 0.02), || async {
//!         let response = client.complete(&prompt).await?;
//!         let used = AttemptUsage::new(response.tokens, response.cost_usd);
//!         Ok((response, used))
//!     })
//!     .await?;
//! ```

pub mod runner;
pub mod usage;

pub use runner::{JobRunner, RunnerError};
pub use usage::{AttemptUsage, JobUsage};
