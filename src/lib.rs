//! Differentiable planar geometry and pose-graph optimization.
//!
//! - [`manifold`]: `Rot2`, `Pose2` and the SE(2) exponential / logarithm with analytic Jacobians
//! - [`autodiff`]: reverse-mode differentiation through pullback closures
//! - [`optimizer`]: fixed-step gradient descent over differentiable parameters
//! - [`factors`], [`core`]: relative-pose factors and the pose graph they form

pub mod autodiff;
pub mod core;
pub mod error;
pub mod factors;
pub mod logger;
pub mod manifold;
pub mod optimizer;

pub use crate::core::PoseGraph;
pub use autodiff::{Parameter, Var, jacobian, pullback, value_with_gradient};
pub use error::{FusionError, FusionResult};
pub use logger::{init_logger, init_logger_with_level};
pub use manifold::{LieGroup, Pose2, Rot2};
pub use optimizer::{GradientDescent, GradientDescentConfig};
