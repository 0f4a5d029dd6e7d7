//! Closed-loop driver around [`HillClimber`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use super::config::HcConfig;
use super::optimizer::HillClimber;
use super::types::{HcProblem, Solution};
use crate::error::Result;

/// Result of a driven hill climbing run.
#[derive(Debug, Clone)]
pub struct HcResult {
    /// The best solution found.
    pub best: Solution,

    /// Score of the best solution.
    pub best_score: f64,

    /// Number of solutions evaluated.
    pub iterations: usize,

    /// Number of evaluations that improved on the best score.
    pub improving_moves: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best score after each evaluation.
    pub score_history: Vec<f64>,
}

/// Runs the evaluate/feed-back loop for an [`HcProblem`].
pub struct HcRunner;

impl HcRunner {
    /// Runs hill climbing for at most `config.max_iterations` evaluations.
    pub fn run<P: HcProblem>(problem: &P, config: &HcConfig) -> Result<HcResult> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs hill climbing with an optional cancellation token, checked
    /// before every evaluation.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_hillclimb::hc::{HcConfig, HcProblem, HcRunner, Target};
    ///
    /// struct Peak;
    ///
    /// impl HcProblem for Peak {
    ///     fn targets(&self) -> Vec<Target> {
    ///         vec![Target::new("x", -10.0, -10.0, 10.0)]
    ///     }
    ///
    ///     fn score(&self, solution: &[Target]) -> f64 {
    ///         -(solution[0].value - 3.0).abs()
    ///     }
    /// }
    ///
    /// let config = HcConfig::default().with_max_iterations(500).with_seed(1);
    /// let result = HcRunner::run(&Peak, &config).unwrap();
    /// assert_eq!(result.best[0].value, 3.0);
    /// ```
    pub fn run_with_cancel<P: HcProblem>(
        problem: &P,
        config: &HcConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<HcResult> {
        let mut hc = HillClimber::with_config(problem.targets(), config.clone())?;
        info!(
            max_iterations = config.max_iterations,
            max_no_improve = config.max_no_improve,
            "hill climbing started"
        );

        let mut candidate = hc.current_solution().to_vec();
        let mut best = candidate.clone();
        let mut best_score = config.start_score;
        let mut iterations = 0usize;
        let mut improving_moves = 0usize;
        let mut no_improve = 0usize;
        let mut cancelled = false;
        let mut score_history = Vec::with_capacity(config.max_iterations);

        while iterations < config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            let score = problem.score(&candidate);
            iterations += 1;

            if score > best_score {
                best.clone_from(&candidate);
                best_score = score;
                improving_moves += 1;
                no_improve = 0;
            } else {
                no_improve += 1;
            }
            score_history.push(best_score);

            if config.max_no_improve > 0 && no_improve >= config.max_no_improve {
                break;
            }
            if iterations < config.max_iterations {
                candidate = hc.run(score);
            }
        }

        info!(iterations, best_score, cancelled, "hill climbing finished");

        Ok(HcResult {
            best,
            best_score,
            iterations,
            improving_moves,
            cancelled,
            score_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hc::Target;

    // ---- Sphere: maximize -sum(x_i^2), optimum at the origin ----

    struct Sphere {
        dim: usize,
    }

    impl HcProblem for Sphere {
        fn targets(&self) -> Vec<Target> {
            (0..self.dim)
                .map(|i| Target::new(format!("x{i}"), 40.0, -50.0, 50.0))
                .collect()
        }

        fn score(&self, solution: &[Target]) -> f64 {
            -solution.iter().map(|t| t.value * t.value).sum::<f64>()
        }
    }

    #[test]
    fn test_sphere_improves() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let problem = Sphere { dim: 4 };
        let config = HcConfig::default().with_max_iterations(3000).with_seed(42);
        let result = HcRunner::run(&problem, &config).unwrap();

        let initial = problem.score(&problem.targets());
        assert!(
            result.best_score > initial,
            "expected improvement over {initial}, got {}",
            result.best_score
        );
        assert_eq!(result.iterations, 3000);
        assert!(result.improving_moves > 0);
        assert_eq!(problem.score(&result.best), result.best_score);
    }

    #[test]
    fn test_score_history_non_decreasing() {
        let problem = Sphere { dim: 3 };
        let config = HcConfig::default().with_max_iterations(500).with_seed(7);
        let result = HcRunner::run(&problem, &config).unwrap();

        assert_eq!(result.score_history.len(), result.iterations);
        for window in result.score_history.windows(2) {
            assert!(
                window[1] >= window[0],
                "best score history should be non-decreasing: {} < {}",
                window[1],
                window[0]
            );
        }
    }

    #[test]
    fn test_cancellation() {
        let problem = Sphere { dim: 2 };
        let config = HcConfig::default().with_max_iterations(1000).with_seed(1);
        let cancel = Arc::new(AtomicBool::new(true));

        let result = HcRunner::run_with_cancel(&problem, &config, Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.best, problem.targets());
    }

    #[test]
    fn test_stagnation_limit() {
        struct Flat;

        impl HcProblem for Flat {
            fn targets(&self) -> Vec<Target> {
                vec![Target::new("x", 0.0, 0.0, 10.0)]
            }

            fn score(&self, _solution: &[Target]) -> f64 {
                1.0
            }
        }

        let config = HcConfig::default()
            .with_max_iterations(1000)
            .with_max_no_improve(25)
            .with_seed(3);
        let result = HcRunner::run(&Flat, &config).unwrap();
        assert_eq!(result.iterations, 26);
        assert_eq!(result.improving_moves, 1);
        assert_eq!(result.best_score, 1.0);
    }

    #[test]
    fn test_invalid_problem_targets() {
        struct Empty;

        impl HcProblem for Empty {
            fn targets(&self) -> Vec<Target> {
                Vec::new()
            }

            fn score(&self, _solution: &[Target]) -> f64 {
                0.0
            }
        }

        assert!(HcRunner::run(&Empty, &HcConfig::default()).is_err());
    }
}
