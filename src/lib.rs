//! Ask-and-tell stochastic hill climbing.
//!
//! A [`HillClimber`](hc::HillClimber) owns a set of named, bounded numeric
//! targets. Each call to `run` takes the score of the previous proposal,
//! keeps it only if it strictly beats the best score seen so far, and
//! returns a new proposal with one randomly chosen target resampled.
//!
//! - [`hc`]: the optimizer, its configuration, history export and a
//!   closed-loop runner.
//! - [`random`]: bounded, precision-rounded sampling.
//! - [`error`]: the crate error type.
//!
//! Fitness evaluation stays with the caller. The optimizer is synchronous
//! and holds no locks; share it across threads behind your own mutex.

pub mod error;
pub mod hc;
pub mod random;

pub use error::{Error, Result};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
