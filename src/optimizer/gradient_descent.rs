//! Fixed-step gradient descent on a manifold.
//!
//! Each iteration computes `(loss, g) = value_with_gradient(x, f)` and then moves every slot
//! of `x` to `retract(x[i], −α g[i])`.

use crate::autodiff::{Parameter, Var, value_with_gradient};
use crate::optimizer::{
    OptimizationStatus, OptimizationSummary, OptimizerError, OptimizerResult, SolverResult,
};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Configuration for the gradient-descent solver.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientDescentConfig {
    /// Step size α applied to the gradient
    pub step_size: f64,
    /// Number of iterations to run
    pub max_iterations: usize,
    /// Log the summary at INFO instead of DEBUG
    pub verbose: bool,
}

impl Default for GradientDescentConfig {
    fn default() -> Self {
        Self {
            step_size: 1.0,
            max_iterations: 100,
            verbose: false,
        }
    }
}

impl GradientDescentConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step size
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    /// Set the number of iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Enable or disable verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Reject non-positive or non-finite step sizes and empty runs.
    pub fn validate(&self) -> OptimizerResult<()> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(OptimizerError::InvalidConfig(format!(
                "step_size must be finite and positive, got {}",
                self.step_size
            )));
        }
        if self.max_iterations == 0 {
            return Err(OptimizerError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for GradientDescentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GradientDescentConfig {{ step_size: {}, max_iterations: {}, verbose: {} }}",
            self.step_size, self.max_iterations, self.verbose
        )
    }
}

/// Gradient-descent solver.
#[derive(Debug, Clone, Default)]
pub struct GradientDescent {
    config: GradientDescentConfig,
}

impl GradientDescent {
    /// Create a solver with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with the given configuration.
    pub fn with_config(config: GradientDescentConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &GradientDescentConfig {
        &self.config
    }

    /// Run `max_iterations` steps on the loss `f` starting from `initial`.
    ///
    /// Non-finite losses are not sanitized: they propagate into the parameters and the run is
    /// reported as [`OptimizationStatus::NumericalFailure`].
    pub fn minimize<P, F>(&self, initial: P, f: F) -> OptimizerResult<SolverResult<P>>
    where
        P: Parameter,
        F: Fn(P::Traced) -> Var<f64>,
    {
        self.config.validate()?;
        let start_time = Instant::now();
        let mut parameters = initial;
        let mut initial_loss = f64::NAN;

        for iteration in 0..self.config.max_iterations {
            let (loss, gradient) = value_with_gradient(&parameters, &f);
            if iteration == 0 {
                initial_loss = loss;
            }
            debug!(
                iteration,
                loss,
                gradient_norm = P::gradient_norm(&gradient),
                "gradient descent step"
            );
            parameters.move_along_scaled(&gradient, -self.config.step_size);
        }

        let (final_loss, gradient) = value_with_gradient(&parameters, &f);
        let final_gradient_norm = P::gradient_norm(&gradient);
        let status = if final_loss.is_finite() && final_gradient_norm.is_finite() {
            OptimizationStatus::MaxIterationsReached
        } else {
            OptimizationStatus::NumericalFailure
        };

        let summary = OptimizationSummary {
            initial_loss,
            final_loss,
            iterations: self.config.max_iterations,
            final_gradient_norm,
            status,
            elapsed_time: start_time.elapsed(),
        };

        if self.config.verbose {
            info!(
                initial_loss,
                final_loss,
                final_gradient_norm,
                iterations = summary.iterations,
                status = %summary.status,
                "gradient descent finished"
            );
        } else {
            debug!(final_loss, status = %summary.status, "gradient descent finished");
        }

        Ok(SolverResult {
            parameters,
            summary,
        })
    }
}

/// Plain gradient descent: `iterations` steps of size `step_size` from `initial`.
pub fn gradient_descent<P, F>(
    initial: P,
    f: F,
    step_size: f64,
    iterations: usize,
) -> OptimizerResult<P>
where
    P: Parameter,
    F: Fn(P::Traced) -> Var<f64>,
{
    let config = GradientDescentConfig::new()
        .with_step_size(step_size)
        .with_max_iterations(iterations);
    GradientDescent::with_config(config)
        .minimize(initial, f)
        .map(|result| result.parameters)
}
