//! Core data types for hill climbing: targets, settable fields, history
//! records, and the problem trait used by [`HcRunner`](super::HcRunner).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::random::MAX_PRECISION;

/// A solution: one complete, ordered assignment of values to all targets.
pub type Solution = Vec<Target>;

/// One bounded, named scalar parameter under optimization.
///
/// # Examples
///
/// ```
/// use u_hillclimb::hc::Target;
///
/// let t = Target::new("speed", 50.0, 0.0, 100.0).with_precision(1);
/// assert!(t.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Identifier, unique among the targets of one optimizer.
    pub name: String,
    /// Current value, within `[min, max]`.
    pub value: f64,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Fractional digits mutated values are rounded to. 0 = integers.
    #[serde(default)]
    pub precision: u32,
}

impl Target {
    /// Creates a target with integer precision.
    pub fn new(name: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            value,
            min,
            max,
            precision: 0,
        }
    }

    /// Sets the rounding precision.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Checks that the target is well formed.
    ///
    /// Each violated field produces its own message.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid("target name must be a non-empty string"));
        }
        let name = &self.name;
        if !self.value.is_finite() {
            return Err(Error::invalid(format!(
                "target '{name}' must have a finite numeric value, got {}",
                self.value
            )));
        }
        if !self.min.is_finite() {
            return Err(Error::invalid(format!(
                "target '{name}' must have a finite numeric minimum, got {}",
                self.min
            )));
        }
        if !self.max.is_finite() {
            return Err(Error::invalid(format!(
                "target '{name}' must have a finite numeric maximum, got {}",
                self.max
            )));
        }
        if self.min > self.max {
            return Err(Error::invalid(format!(
                "target '{name}' has minimum ({}) greater than maximum ({})",
                self.min, self.max
            )));
        }
        if !(self.max - self.min).is_finite() {
            return Err(Error::invalid(format!(
                "target '{name}' range [{}, {}] is too wide to sample",
                self.min, self.max
            )));
        }
        if self.value < self.min || self.value > self.max {
            return Err(Error::invalid(format!(
                "target '{name}' has value {} outside [{}, {}]",
                self.value, self.min, self.max
            )));
        }
        if self.precision > MAX_PRECISION {
            return Err(Error::invalid(format!(
                "target '{name}' precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        Ok(())
    }
}

/// A settable target field together with its new value.
///
/// Values are written only by the search step.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetField {
    /// Rename the target.
    Name(String),
    /// Move the lower bound.
    Min(f64),
    /// Move the upper bound.
    Max(f64),
    /// Change the rounding precision.
    Precision(u32),
}

impl TargetField {
    /// Builds a field update from a property name and a dynamic value.
    ///
    /// Recognized properties are `name`, `min`, `max` and `precision`.
    pub fn parse(property: &str, value: &serde_json::Value) -> Result<Self> {
        if property.is_empty() {
            return Err(Error::invalid("a property name to change is required"));
        }
        if value.is_null() {
            return Err(Error::invalid(format!(
                "a value is required to change property '{property}'"
            )));
        }
        let field = match property {
            "name" => value
                .as_str()
                .map(|s| TargetField::Name(s.to_string())),
            "min" => value.as_f64().map(TargetField::Min),
            "max" => value.as_f64().map(TargetField::Max),
            "precision" => value
                .as_u64()
                .and_then(|p| u32::try_from(p).ok())
                .map(TargetField::Precision),
            other => {
                return Err(Error::invalid(format!(
                    "unknown target property '{other}' (expected name, min, max or precision)"
                )))
            }
        };
        field.ok_or_else(|| {
            Error::invalid(format!(
                "value {value} has the wrong type for property '{property}'"
            ))
        })
    }

    /// Applies the update to `target`.
    ///
    /// Moving a bound clamps the value back inside the new interval.
    pub(crate) fn apply(&self, target: &mut Target) {
        match self {
            TargetField::Name(name) => target.name.clone_from(name),
            TargetField::Min(min) => {
                target.min = *min;
                target.value = target.value.max(*min);
            }
            TargetField::Max(max) => {
                target.max = *max;
                target.value = target.value.min(*max);
            }
            TargetField::Precision(p) => target.precision = *p,
        }
    }
}

/// One entry of the optimizer history.
///
/// Non-finite scores serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    /// Iteration number; 0 for the initial record.
    pub iteration: usize,
    /// Score passed to the `run` call that produced this record.
    pub score: f64,
    /// Pre-mutation copies of the targets changed in this iteration.
    pub changed_targets: Vec<Target>,
    /// The current solution after this iteration.
    pub solution: Solution,
}

/// Defines a problem for the [`HcRunner`](super::HcRunner) driver.
///
/// The user supplies the starting targets and the fitness function.
/// Higher scores are better.
///
/// # Examples
///
/// ```
/// use u_hillclimb::hc::{HcProblem, Target};
///
/// struct Peak;
///
/// impl HcProblem for Peak {
///     fn targets(&self) -> Vec<Target> {
///         vec![Target::new("x", 0.0, -10.0, 10.0)]
///     }
///
///     fn score(&self, solution: &[Target]) -> f64 {
///         -(solution[0].value - 3.0).powi(2)
///     }
/// }
/// ```
pub trait HcProblem {
    /// The initial target set.
    fn targets(&self) -> Vec<Target>;

    /// Evaluates a candidate solution. Higher is better.
    fn score(&self, solution: &[Target]) -> f64;
}
