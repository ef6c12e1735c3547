//! First-order optimization over differentiable parameters.
//!
//! The only solver is fixed-step [`GradientDescent`]: every iteration evaluates the loss and
//! its gradient through [`crate::autodiff`] and retracts each parameter slot along the
//! negative gradient. There is no line search and no convergence test; the run always lasts
//! `max_iterations` steps.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub mod gradient_descent;

pub use gradient_descent::{GradientDescent, GradientDescentConfig, gradient_descent};

/// Optimizer-specific errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    /// Rejected solver configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for optimizer operations
pub type OptimizerResult<T> = Result<T, OptimizerError>;

/// Status of an optimization process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizationStatus {
    /// Maximum number of iterations reached
    MaxIterationsReached,
    /// The loss or gradient became NaN or infinite
    NumericalFailure,
}

impl fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationStatus::MaxIterationsReached => write!(f, "Maximum iterations reached"),
            OptimizationStatus::NumericalFailure => write!(f, "Numerical failure"),
        }
    }
}

/// Summary statistics of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationSummary {
    /// Loss at the starting point
    pub initial_loss: f64,
    /// Loss after the last step
    pub final_loss: f64,
    /// Number of steps taken
    pub iterations: usize,
    /// Gradient norm at the final point
    pub final_gradient_norm: f64,
    /// Final optimization status
    pub status: OptimizationStatus,
    /// Total time elapsed
    pub elapsed_time: Duration,
}

impl fmt::Display for OptimizationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Gradient Descent Summary ===")?;
        writeln!(f, "Initial loss:        {:.6e}", self.initial_loss)?;
        writeln!(f, "Final loss:          {:.6e}", self.final_loss)?;
        writeln!(
            f,
            "Loss reduction:      {:.6e} ({:.2}%)",
            self.initial_loss - self.final_loss,
            100.0 * (self.initial_loss - self.final_loss) / self.initial_loss.max(1e-12)
        )?;
        writeln!(f, "Iterations:          {}", self.iterations)?;
        writeln!(f, "Final gradient norm: {:.6e}", self.final_gradient_norm)?;
        writeln!(f, "Status:              {}", self.status)?;
        writeln!(f, "Total time:          {:?}", self.elapsed_time)?;
        Ok(())
    }
}

/// Result of a solver execution.
#[derive(Debug, Clone)]
pub struct SolverResult<T> {
    /// Final parameters
    pub parameters: T,
    /// Run statistics
    pub summary: OptimizationSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(
            OptimizationStatus::MaxIterationsReached.to_string(),
            "Maximum iterations reached"
        );
        assert_eq!(OptimizationStatus::NumericalFailure.to_string(), "Numerical failure");
    }

    #[test]
    fn test_summary_display_mentions_status() {
        let summary = OptimizationSummary {
            initial_loss: 2.0,
            final_loss: 0.5,
            iterations: 10,
            final_gradient_norm: 1e-3,
            status: OptimizationStatus::MaxIterationsReached,
            elapsed_time: Duration::from_millis(3),
        };
        let text = summary.to_string();
        assert!(text.contains("Iterations:          10"));
        assert!(text.contains("75.00%"));
        assert!(text.contains("Maximum iterations reached"));
    }

    #[test]
    fn test_optimizer_error_display() {
        let err = OptimizerError::InvalidConfig("step_size must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: step_size must be positive"
        );
    }
}
