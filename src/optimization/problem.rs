use argmin::core::CostFunction;
use std::f64::consts::PI;

/// Fitness function contract
///
/// Maps a position (one value per dimension) to a fitness score. Called once
/// per particle at initialization and once per particle per step, possibly
/// from several threads at once, so implementations must not rely on call
/// order. Errors abort the run.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, position: &[f64]) -> Result<f64, String>;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Evaluator for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn evaluate(&self, position: &[f64]) -> Result<f64, String> {
        Ok(self(position))
    }
}

/// Wraps a fitness function that can fail.
pub struct Fallible<F>(pub F);

impl<F> Evaluator for Fallible<F>
where
    F: Fn(&[f64]) -> Result<f64, String> + Send + Sync,
{
    fn evaluate(&self, position: &[f64]) -> Result<f64, String> {
        (self.0)(position)
    }
}

/// Adapter so any argmin cost function over `Vec<f64>` can drive the swarm.
pub struct ArgminCost<P> {
    problem: P,
}

impl<P> ArgminCost<P> {
    pub fn new(problem: P) -> Self {
        Self { problem }
    }

    pub fn into_inner(self) -> P {
        self.problem
    }
}

impl<P> Evaluator for ArgminCost<P>
where
    P: CostFunction<Param = Vec<f64>, Output = f64> + Send + Sync,
{
    fn evaluate(&self, position: &[f64]) -> Result<f64, String> {
        self.problem
            .cost(&position.to_vec())
            .map_err(|e| e.to_string())
    }

    fn name(&self) -> &str {
        "argmin"
    }
}

// ===== BENCHMARK FUNCTIONS =====

/// Sum of squares. Minimum 0 at the origin.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sphere;

impl Evaluator for Sphere {
    fn evaluate(&self, position: &[f64]) -> Result<f64, String> {
        Ok(position.iter().map(|x| x * x).sum())
    }

    fn name(&self) -> &str {
        "sphere"
    }
}

/// Highly multimodal. Minimum 0 at the origin.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rastrigin;

impl Evaluator for Rastrigin {
    fn evaluate(&self, position: &[f64]) -> Result<f64, String> {
        let n = position.len() as f64;
        Ok(10.0 * n
            + position
                .iter()
                .map(|x| x * x - 10.0 * (2.0 * PI * x).cos())
                .sum::<f64>())
    }

    fn name(&self) -> &str {
        "rastrigin"
    }
}

/// Narrow curved valley. Minimum 0 at (1, ..., 1).
#[derive(Clone, Copy, Debug, Default)]
pub struct Rosenbrock;

impl Evaluator for Rosenbrock {
    fn evaluate(&self, position: &[f64]) -> Result<f64, String> {
        Ok(position
            .windows(2)
            .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
            .sum())
    }

    fn name(&self) -> &str {
        "rosenbrock"
    }
}
