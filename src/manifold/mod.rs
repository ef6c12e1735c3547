//! Manifold representations for optimization on SE(2).
//!
//! This module provides the planar Lie groups used by the pose-graph layer:
//! - **SO(2)**: planar rotations ([`Rot2`])
//! - **SE(2)**: planar rigid motions ([`Pose2`])
//!
//! Lie group M,° | size   | dim | X ∈ M             | Constraint | T_X M          | Exp(T)          | Comp. | Action
//! ------------- | ------ | --- | ----------------- | ---------- | -------------- | --------------- | ----- | ------
//! n-D vector    | Rⁿ,+   | n   | v ∈ Rⁿ            | -          | v ∈ Rⁿ         | v = exp(v)      | v₁+v₂ | v + x
//! Rotation      | SO(2),.| 1   | (c, s)            | c²+s² = 1  | ω ∈ R          | (cos ω, sin ω)  | R₁R₂  | Rx
//! Rigid motion  | SE(2),.| 3   | M = [R t; 0 1]    | RᵀR = I    | (ω, vx, vy)    | Exp([ξ])        | M₁M₂  | Rx+t
//!
//! # Tangent convention
//!
//! Every SE(2) tangent vector, Jacobian and adjoint in this crate is expressed in the ordering
//! **(ω, vx, vy)**: rotation first, then translation. GTSAM uses `(vx, vy, ω)`; its published
//! Jacobians match ours up to that permutation.
//!
//! Derivatives are taken with respect to right perturbations `X ⊕ ξ = X ∘ exp(ξ)`, so
//! `∂(X ∘ Y)/∂X = Ad(Y⁻¹)` and `∂X⁻¹/∂X = -Ad(X)`.

use nalgebra::Matrix3;
use std::fmt::Debug;
use thiserror::Error;

pub mod coordinate;
pub mod pose2;
pub mod rot2;
pub mod vector;

pub use coordinate::Pose2Coordinate;
pub use pose2::Pose2;
pub use rot2::Rot2;
pub use vector::{Tangent3, Vector1, Vector2, Vector3, VectorSpace};

/// Below this rotation magnitude exp/log switch to their first-order branches.
pub const SMALL_ANGLE_THRESHOLD: f64 = 1e-10;

/// Errors that can occur during manifold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// Covariance handed to random sampling is not symmetric positive definite
    #[error("Invalid covariance: {0}")]
    InvalidCovariance(String),

    /// Wrong number of components when building an element from raw data
    #[error("Invalid dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}

/// Result type for manifold operations.
pub type ManifoldResult<T> = Result<T, ManifoldError>;

/// A value that can be differentiated through and moved along its tangent space.
///
/// Euclidean values move by addition; Lie group values move by retraction.
pub trait Differentiable: Clone + Debug + 'static {
    /// The tangent (and cotangent) space at every point.
    type TangentVector: VectorSpace;

    /// Moves `self` along `direction`: `self ← self ⊕ direction`.
    fn move_along(&mut self, direction: &Self::TangentVector);
}

impl Differentiable for f64 {
    type TangentVector = f64;

    fn move_along(&mut self, direction: &f64) {
        *self += direction;
    }
}

macro_rules! impl_euclidean_differentiable {
    ($type:ty) => {
        impl Differentiable for $type {
            type TangentVector = $type;

            fn move_along(&mut self, direction: &$type) {
                *self += direction;
            }
        }
    };
}

impl_euclidean_differentiable!(Vector1);
impl_euclidean_differentiable!(Vector2);
impl_euclidean_differentiable!(Vector3);

/// Core trait for Lie group operations.
///
/// Mirrors the usual group API with optional analytic Jacobians: every operation that can
/// report a derivative takes `Option<&mut Self::JacobianMatrix>` slots which are filled when
/// present. The reverse-mode layer builds its pullbacks from exactly these matrices.
pub trait LieGroup: Differentiable + Copy + PartialEq {
    /// Jacobian matrix type (DOF × DOF)
    type JacobianMatrix: Clone + Debug + PartialEq;

    /// Degrees of freedom - dimension of the tangent space
    const DOF: usize;

    /// Get the identity element of the group.
    fn identity() -> Self;

    /// Compute the inverse, optionally with ∂(g⁻¹)/∂g.
    fn inverse(&self, jacobian: Option<&mut Self::JacobianMatrix>) -> Self;

    /// Compose `self ∘ other`, optionally with the Jacobians wrt each operand.
    fn compose(
        &self,
        other: &Self,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
    ) -> Self;

    /// Relative element `self⁻¹ ∘ other`.
    fn between(
        &self,
        other: &Self,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
    ) -> Self;

    /// Exponential map from the tangent space at identity, optionally with the right Jacobian.
    fn exp(tangent: &Self::TangentVector, jacobian: Option<&mut Self::JacobianMatrix>) -> Self;

    /// Logarithmic map to the tangent space at identity, optionally with the inverse right
    /// Jacobian.
    fn log(&self, jacobian: Option<&mut Self::JacobianMatrix>) -> Self::TangentVector;

    /// Adjoint matrix Ad(g).
    fn adjoint_matrix(&self) -> Self::JacobianMatrix;

    /// Right plus: `g ⊕ ξ = g ∘ exp(ξ)`.
    fn retract(&self, tangent: &Self::TangentVector) -> Self {
        self.compose(&Self::exp(tangent, None), None, None)
    }

    /// Right minus: `log(g⁻¹ ∘ other)`, the tangent at `self` that reaches `other`.
    fn local_coordinate(&self, other: &Self) -> Self::TangentVector {
        self.between(other, None, None).log(None)
    }

    /// Re-project the element onto the manifold.
    fn normalize(&mut self);

    /// Check if the element is approximately on the manifold.
    fn is_valid(&self, tolerance: f64) -> bool;
}

/// 3×3 identity used as the trivial Jacobian on SE(2).
pub(crate) fn identity_jacobian() -> Matrix3<f64> {
    Matrix3::identity()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifold_error_display() {
        let error = ManifoldError::InvalidCovariance("not positive definite".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid covariance: not positive definite"
        );

        let error = ManifoldError::InvalidDimension {
            expected: 3,
            actual: 2,
        };
        assert_eq!(error.to_string(), "Invalid dimension: expected 3, got 2");
    }

    #[test]
    fn test_euclidean_move_along() {
        let mut v = Vector2::new(1.0, 2.0);
        v.move_along(&Vector2::new(-1.0, 0.5));
        assert_eq!(v, Vector2::new(0.0, 2.5));

        let mut x = 1.5_f64;
        x.move_along(&-0.5);
        assert_eq!(x, 1.0);
    }
}
