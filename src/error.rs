//! Error types for the se2-fusion library
//!
//! Module-specific errors ([`ManifoldError`], [`OptimizerError`]) convert into the crate-wide
//! [`FusionError`] so callers that mix modules can propagate with `?`.

use crate::{manifold::ManifoldError, optimizer::OptimizerError};
use thiserror::Error;

/// Main result type used throughout the se2-fusion library
pub type FusionResult<T> = Result<T, FusionError>;

/// Main error type for the se2-fusion library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionError {
    /// Manifold operations errors
    #[error("Manifold error: {0}")]
    Manifold(String),

    /// Optimizer configuration or run errors
    #[error("Optimizer error: {0}")]
    Optimizer(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ManifoldError> for FusionError {
    fn from(err: ManifoldError) -> Self {
        FusionError::Manifold(err.to_string())
    }
}

impl From<OptimizerError> for FusionError {
    fn from(err: OptimizerError) -> Self {
        FusionError::Optimizer(err.to_string())
    }
}
