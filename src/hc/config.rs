//! Hill climbing configuration.

use serde_json::Value;

use crate::error::{Error, Result};

/// Configuration for [`HillClimber`](super::HillClimber) and
/// [`HcRunner`](super::HcRunner).
///
/// # Examples
///
/// ```
/// use u_hillclimb::hc::HcConfig;
///
/// let config = HcConfig::default()
///     .with_start_score(-100.0)
///     .with_number_of_mutations(2)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.number_of_mutations, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HcConfig {
    /// Score the best solution starts with. Only strictly higher scores
    /// replace it.
    pub start_score: f64,

    /// Number of distinct targets resampled per `run` call.
    pub number_of_mutations: usize,

    /// Whether `reset` drops the initial history record as well.
    pub clear_history_on_reset: bool,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,

    /// Iteration budget for [`HcRunner`](super::HcRunner).
    pub max_iterations: usize,

    /// Iterations without improvement before the runner stops. 0 = no limit.
    pub max_no_improve: usize,
}

impl Default for HcConfig {
    fn default() -> Self {
        Self {
            start_score: f64::NEG_INFINITY,
            number_of_mutations: 1,
            clear_history_on_reset: false,
            seed: None,
            max_iterations: 1000,
            max_no_improve: 0,
        }
    }
}

impl HcConfig {
    pub fn with_start_score(mut self, score: f64) -> Self {
        self.start_score = score;
        self
    }

    pub fn with_number_of_mutations(mut self, n: usize) -> Self {
        self.number_of_mutations = n;
        self
    }

    pub fn with_clear_history_on_reset(mut self, clear: bool) -> Self {
        self.clear_history_on_reset = clear;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_max_no_improve(mut self, n: usize) -> Self {
        self.max_no_improve = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.start_score.is_nan() {
            return Err(Error::invalid("start score must be a number, got NaN"));
        }
        if self.number_of_mutations == 0 {
            return Err(Error::invalid("number of mutations must be at least 1"));
        }
        Ok(())
    }

    /// Reads an options object such as
    /// `{"startScore": -100, "numberOfMutations": 2}`.
    ///
    /// Missing or `null` fields keep their defaults; unknown keys are ignored.
    pub fn from_json(options: &Value) -> Result<Self> {
        let map = options
            .as_object()
            .ok_or_else(|| Error::invalid("options must be an object"))?;
        let mut config = Self::default();

        if let Some(v) = present(map.get("startScore")) {
            config.start_score = v
                .as_f64()
                .ok_or_else(|| Error::invalid("option `startScore` must be a number"))?;
        }
        if let Some(v) = present(map.get("numberOfMutations")) {
            config.number_of_mutations = as_usize(v)
                .ok_or_else(|| Error::invalid("option `numberOfMutations` must be a positive integer"))?;
        }
        if let Some(v) = present(map.get("clearHistoryOnReset")) {
            config.clear_history_on_reset = v
                .as_bool()
                .ok_or_else(|| Error::invalid("option `clearHistoryOnReset` must be a boolean"))?;
        }
        if let Some(v) = present(map.get("seed")) {
            config.seed = Some(
                v.as_u64()
                    .ok_or_else(|| Error::invalid("option `seed` must be a non-negative integer"))?,
            );
        }
        if let Some(v) = present(map.get("maxIterations")) {
            config.max_iterations = as_usize(v)
                .ok_or_else(|| Error::invalid("option `maxIterations` must be a non-negative integer"))?;
        }
        if let Some(v) = present(map.get("maxNoImprove")) {
            config.max_no_improve = as_usize(v)
                .ok_or_else(|| Error::invalid("option `maxNoImprove` must be a non-negative integer"))?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn present(v: Option<&Value>) -> Option<&Value> {
    v.filter(|v| !v.is_null())
}

fn as_usize(v: &Value) -> Option<usize> {
    v.as_u64().and_then(|n| usize::try_from(n).ok())
}
