//! The ask-and-tell hill climber.
//!
//! # Algorithm
//!
//! Each call to [`HillClimber::run`] receives the score of the solution
//! returned by the previous call (or of the initial targets):
//!
//! 1. If the score strictly beats the best score, the current solution
//!    becomes the new best. Otherwise the current solution is discarded and
//!    replaced by a copy of the best one.
//! 2. `number_of_mutations` distinct targets are picked at random and each
//!    is resampled uniformly within its bounds, rounded to its precision.
//! 3. The iteration is appended to the history and the new current solution
//!    is returned for evaluation.
//!
//! The three solution slots (`targets`, best, current) are separate owned
//! vectors; nothing outside the optimizer can hold a mutable reference into
//! them.

use std::io::Write;

use rand::rngs::StdRng;
use tracing::{debug, trace, warn};

use super::config::HcConfig;
use super::input::{parse_target, parse_targets, validate_targets};
use super::types::{IterationRecord, Solution, Target, TargetField};
use crate::error::{Error, Result};
use crate::random::{self, create_rng};

/// Stochastic hill climbing over a fixed set of bounded targets.
///
/// # Examples
///
/// ```
/// use u_hillclimb::hc::{HcConfig, HillClimber, Target};
///
/// let targets = vec![
///     Target::new("a", 50.0, 0.0, 100.0),
///     Target::new("b", -2.0, -100.0, 10.0),
/// ];
/// let mut hc = HillClimber::with_config(targets, HcConfig::default().with_seed(42)).unwrap();
///
/// // Score the initial targets, feed it back, evaluate the proposal, repeat.
/// let mut candidate = hc.current_solution().to_vec();
/// for _ in 0..100 {
///     let score = -candidate.iter().map(|t| (t.value - 7.0).abs()).sum::<f64>();
///     candidate = hc.run(score);
/// }
/// assert_eq!(hc.number_of_iterations(), 100);
/// assert!(hc.best_score() > f64::NEG_INFINITY);
/// ```
#[derive(Debug, Clone)]
pub struct HillClimber {
    config: HcConfig,
    targets: Solution,
    best_solution: Solution,
    current_solution: Solution,
    last_targets_changed: Vec<Target>,
    last_score: f64,
    best_score: f64,
    iterations: usize,
    history: Vec<IterationRecord>,
    rng: StdRng,
}

impl HillClimber {
    /// Creates a hill climber with the default configuration.
    pub fn new(targets: Vec<Target>) -> Result<Self> {
        Self::with_config(targets, HcConfig::default())
    }

    /// Creates a hill climber.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `targets` is empty, a target is
    /// malformed, two targets share a name, or `config` is invalid.
    pub fn with_config(targets: Vec<Target>, config: HcConfig) -> Result<Self> {
        config.validate()?;
        validate_targets(&targets)?;

        let rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        debug!(
            targets = targets.len(),
            mutations = config.number_of_mutations,
            start_score = config.start_score,
            "hill climber created"
        );

        let mut hc = Self {
            best_solution: targets.clone(),
            current_solution: targets.clone(),
            targets,
            last_targets_changed: Vec::new(),
            last_score: config.start_score,
            best_score: config.start_score,
            iterations: 0,
            history: Vec::new(),
            rng,
            config,
        };
        hc.history.push(hc.initial_record());
        hc.check_mutation_count();
        Ok(hc)
    }

    /// Creates a hill climber from dynamic input, e.g. parsed JSON.
    ///
    /// See [`parse_targets`] and [`HcConfig::from_json`] for the accepted
    /// shapes.
    pub fn from_json(targets: &serde_json::Value, options: Option<&serde_json::Value>) -> Result<Self> {
        let config = match options {
            Some(options) => HcConfig::from_json(options)?,
            None => HcConfig::default(),
        };
        Self::with_config(parse_targets(targets)?, config)
    }

    /// Version of this library.
    pub fn version() -> &'static str {
        crate::VERSION
    }

    // ---- Target management ----

    /// Appends a target to all three solutions.
    pub fn add_target(&mut self, target: Target) -> Result<()> {
        target.validate()?;
        if self.index_of(&target.name).is_some() {
            return Err(Error::invalid(format!(
                "duplicate target name '{}'",
                target.name
            )));
        }
        self.targets.push(target.clone());
        self.best_solution.push(target.clone());
        self.current_solution.push(target);
        Ok(())
    }

    /// Appends a target given as dynamic input.
    pub fn add_target_json(&mut self, target: &serde_json::Value) -> Result<()> {
        self.add_target(parse_target(target)?)
    }

    /// Replaces all three solutions with `targets`.
    ///
    /// Iteration count, scores and history are kept; use
    /// [`reset`](Self::reset) to restart the search.
    pub fn set_all_targets(&mut self, targets: Vec<Target>) -> Result<()> {
        validate_targets(&targets)?;
        self.best_solution = targets.clone();
        self.current_solution = targets.clone();
        self.targets = targets;
        self.check_mutation_count();
        Ok(())
    }

    /// Removes the target called `name` from all three solutions.
    ///
    /// Removing a name that does not exist is a no-op.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `name` is empty or names the only
    /// remaining target; an optimizer always holds at least one target.
    pub fn remove_target(&mut self, name: &str) -> Result<()> {
        require_name(name)?;
        if let Some(i) = self.index_of(name) {
            if self.targets.len() == 1 {
                return Err(Error::invalid(format!(
                    "cannot remove '{name}': at least one target is required"
                )));
            }
            self.targets.remove(i);
            self.best_solution.remove(i);
            self.current_solution.remove(i);
            self.check_mutation_count();
        }
        Ok(())
    }

    /// Updates one field of the target called `name` in all three solutions.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no target has that name;
    /// [`Error::InvalidArgument`] if `name` is empty or the update would
    /// leave the target malformed (e.g. `min > max`) or duplicate a name.
    pub fn set_target_property(&mut self, name: &str, field: TargetField) -> Result<()> {
        require_name(name)?;
        let i = self
            .index_of(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        if let TargetField::Name(new_name) = &field {
            if new_name != name && self.index_of(new_name).is_some() {
                return Err(Error::invalid(format!("duplicate target name '{new_name}'")));
            }
        }

        let mut updated = [
            self.targets[i].clone(),
            self.best_solution[i].clone(),
            self.current_solution[i].clone(),
        ];
        for target in &mut updated {
            field.apply(target);
            target.validate()?;
        }

        let [targets, best, current] = updated;
        self.targets[i] = targets;
        self.best_solution[i] = best;
        self.current_solution[i] = current;
        Ok(())
    }

    /// Dynamic form of [`set_target_property`](Self::set_target_property).
    pub fn set_target_property_json(
        &mut self,
        name: &str,
        property: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        require_name(name)?;
        let field = TargetField::parse(property, value)?;
        self.set_target_property(name, field)
    }

    pub fn set_target_name(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.set_target_property(name, TargetField::Name(new_name.to_string()))
    }

    pub fn set_target_min(&mut self, name: &str, min: f64) -> Result<()> {
        self.set_target_property(name, TargetField::Min(min))
    }

    pub fn set_target_max(&mut self, name: &str, max: f64) -> Result<()> {
        self.set_target_property(name, TargetField::Max(max))
    }

    pub fn set_target_precision(&mut self, name: &str, precision: u32) -> Result<()> {
        self.set_target_property(name, TargetField::Precision(precision))
    }

    // ---- Queries ----

    /// The targets as configured.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// The best accepted solution so far.
    pub fn best_solution(&self) -> &[Target] {
        &self.best_solution
    }

    pub fn best_solution_values(&self) -> Vec<f64> {
        self.best_solution.iter().map(|t| t.value).collect()
    }

    /// The most recent proposal.
    pub fn current_solution(&self) -> &[Target] {
        &self.current_solution
    }

    pub fn current_solution_values(&self) -> Vec<f64> {
        self.current_solution.iter().map(|t| t.value).collect()
    }

    /// Value of the target called `name` in the current solution.
    pub fn current_target_value(&self, name: &str) -> Result<f64> {
        value_by_name(&self.current_solution, name)
    }

    /// Value of the target called `name` in the best solution.
    pub fn best_target_value(&self, name: &str) -> Result<f64> {
        value_by_name(&self.best_solution, name)
    }

    /// First target changed by the most recent `run`, as it was before the
    /// change. `None` before the first run.
    pub fn last_target_changed(&self) -> Option<&Target> {
        self.last_targets_changed.first()
    }

    /// All targets changed by the most recent `run`, pre-mutation.
    pub fn last_targets_changed(&self) -> &[Target] {
        &self.last_targets_changed
    }

    pub fn number_of_iterations(&self) -> usize {
        self.iterations
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Score passed to the most recent `run` (the start score before that).
    pub fn last_score(&self) -> f64 {
        self.last_score
    }

    pub fn config(&self) -> &HcConfig {
        &self.config
    }

    // ---- Search ----

    /// Advances the search by one iteration.
    ///
    /// `score` is the fitness of the solution returned by the previous call
    /// (or of the initial targets on the first call). Returns the next
    /// proposal to evaluate.
    pub fn run(&mut self, score: f64) -> Solution {
        self.iterations += 1;
        self.last_score = score;

        if score > self.best_score {
            trace!(iteration = self.iterations, score, previous = self.best_score, "accepted");
            self.best_score = score;
            self.best_solution.clone_from(&self.current_solution);
        } else {
            trace!(iteration = self.iterations, score, best = self.best_score, "rejected");
            self.current_solution.clone_from(&self.best_solution);
        }

        self.mutate();

        self.history.push(IterationRecord {
            iteration: self.iterations,
            score,
            changed_targets: self.last_targets_changed.clone(),
            solution: self.current_solution.clone(),
        });

        self.current_solution.clone()
    }

    /// [`run`](Self::run) without a score. Never promotes the current
    /// solution.
    pub fn run_unscored(&mut self) -> Solution {
        self.run(f64::NEG_INFINITY)
    }

    fn mutate(&mut self) {
        let picked = random::distinct_indices(
            &mut self.rng,
            self.current_solution.len(),
            self.config.number_of_mutations,
        );
        self.last_targets_changed.clear();
        for i in picked {
            let target = &mut self.current_solution[i];
            self.last_targets_changed.push(target.clone());
            target.value = random::sample_in(&mut self.rng, target.min, target.max, target.precision);
        }
    }

    /// Restarts the search from the configured targets.
    ///
    /// History is cut back to the initial record, or emptied when
    /// [`HcConfig::clear_history_on_reset`] is set.
    pub fn reset(&mut self) {
        self.iterations = 0;
        self.best_solution.clone_from(&self.targets);
        self.current_solution.clone_from(&self.targets);
        self.last_targets_changed.clear();
        self.best_score = self.config.start_score;
        self.last_score = self.config.start_score;
        self.history.clear();
        if !self.config.clear_history_on_reset {
            self.history.push(self.initial_record());
        }
        debug!(clear_history = self.config.clear_history_on_reset, "hill climber reset");
    }

    /// Draws from `[min, max]` rounded to `precision` using this optimizer's
    /// RNG. See [`random::random_number`].
    pub fn random_number(&mut self, min: f64, max: f64, precision: u32) -> Result<f64> {
        random::random_number(&mut self.rng, min, max, precision)
    }

    // ---- Export ----

    /// The full history, oldest first.
    pub fn export_data(&self) -> &[IterationRecord] {
        &self.history
    }

    /// The full history as a JSON string.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.history)?)
    }

    /// Writes the full history as pretty-printed JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.history)?;
        Ok(())
    }

    /// Warns once per target-set change when fewer targets exist than
    /// mutations per run; `run` then mutates every target.
    fn check_mutation_count(&self) {
        let wanted = self.config.number_of_mutations;
        let len = self.targets.len();
        if wanted > len {
            warn!(wanted, targets = len, "more mutations requested than targets; clamping");
        }
    }

    fn initial_record(&self) -> IterationRecord {
        IterationRecord {
            iteration: 0,
            score: self.config.start_score,
            changed_targets: Vec::new(),
            solution: self.targets.clone(),
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.targets.iter().position(|t| t.name == name)
    }
}

fn require_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid("a target name is required"));
    }
    Ok(())
}

fn value_by_name(solution: &[Target], name: &str) -> Result<f64> {
    require_name(name)?;
    solution
        .iter()
        .find(|t| t.name == name)
        .map(|t| t.value)
        .ok_or_else(|| Error::NotFound(name.to_string()))
}
