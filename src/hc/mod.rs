//! Hill Climbing (HC).
//!
//! Stochastic local search over a fixed set of bounded numeric targets.
//! The caller evaluates every proposal and feeds the score back; only
//! strict improvements replace the incumbent best solution, and each new
//! proposal resamples one (or a configured number of) targets uniformly
//! within their bounds.
//!
//! [`HillClimber`] is the ask-and-tell state machine. [`HcRunner`] drives
//! it in a closed loop for problems that implement [`HcProblem`].
//!
//! # References
//!
//! - Russell & Norvig (2010), *Artificial Intelligence: A Modern Approach*,
//!   §4.1.1 "Hill-climbing search"

mod config;
mod input;
mod optimizer;
mod runner;
mod types;

pub use config::HcConfig;
pub use input::{parse_target, parse_targets, validate_targets};
pub use optimizer::HillClimber;
pub use runner::{HcResult, HcRunner};
pub use types::{HcProblem, IterationRecord, Solution, Target, TargetField};
