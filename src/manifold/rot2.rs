//! Rot2 - planar rotations, SO(2)
//!
//! A rotation is stored as the unit complex number `(c, s) = (cos θ, sin θ)`; the angle is
//! only materialized on request through `atan2`. The tangent space is one-dimensional (the
//! angular velocity ω) and is represented by [`Vector1`].

use crate::manifold::vector::{Vector1, Vector2};
use crate::manifold::{Differentiable, LieGroup};
use nalgebra::{Matrix1, Matrix2};
use std::fmt;

/// SO(2) group element representing a rotation in the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rot2 {
    c: f64,
    s: f64,
}

impl fmt::Display for Rot2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rot2(theta: {:.4})", self.theta())
    }
}

impl Default for Rot2 {
    fn default() -> Self {
        Rot2::identity()
    }
}

impl Rot2 {
    /// Create a rotation from an angle in radians.
    pub fn from_angle(theta: f64) -> Self {
        Rot2 {
            c: theta.cos(),
            s: theta.sin(),
        }
    }

    /// Create a rotation from its cosine and sine.
    ///
    /// The pair is taken as-is; call [`LieGroup::normalize`] if it may be off the unit circle.
    pub fn from_cos_sin(c: f64, s: f64) -> Self {
        Rot2 { c, s }
    }

    /// Cosine of the rotation angle.
    #[inline]
    pub fn cos(&self) -> f64 {
        self.c
    }

    /// Sine of the rotation angle.
    #[inline]
    pub fn sin(&self) -> f64 {
        self.s
    }

    /// Rotation angle in (−π, π]. Zero when both components vanish.
    pub fn theta(&self) -> f64 {
        if self.c == 0.0 && self.s == 0.0 {
            return 0.0;
        }
        self.s.atan2(self.c)
    }

    /// 2×2 rotation matrix.
    pub fn rotation_matrix(&self) -> Matrix2<f64> {
        Matrix2::new(self.c, -self.s, self.s, self.c)
    }

    /// Rotate a vector: `R v`.
    pub fn rotate(&self, v: &Vector2) -> Vector2 {
        Vector2::new(self.c * v.x - self.s * v.y, self.s * v.x + self.c * v.y)
    }

    /// Rotate a vector, returning the Jacobians wrt the rotation (2×1) and the vector (2×2).
    ///
    /// Under a right perturbation `R exp(ω)` the result moves along `J R v`, with `J` the 90°
    /// generator.
    pub fn rotate_with_jacobians(&self, v: &Vector2) -> (Vector2, Vector2, Matrix2<f64>) {
        let rotated = self.rotate(v);
        let d_rot = Vector2::new(-rotated.y, rotated.x);
        (rotated, d_rot, self.rotation_matrix())
    }

    /// Apply the inverse rotation: `Rᵀ v`.
    pub fn unrotate(&self, v: &Vector2) -> Vector2 {
        Vector2::new(self.c * v.x + self.s * v.y, -self.s * v.x + self.c * v.y)
    }

    /// Inverse rotation with Jacobians wrt the rotation (2×1) and the vector (2×2).
    ///
    /// `(R exp(ω))ᵀ v = exp(−ω) Rᵀ v`, so the rotation derivative is `−J Rᵀ v`.
    pub fn unrotate_with_jacobians(&self, v: &Vector2) -> (Vector2, Vector2, Matrix2<f64>) {
        let unrotated = self.unrotate(v);
        let d_rot = Vector2::new(unrotated.y, -unrotated.x);
        (unrotated, d_rot, self.rotation_matrix().transpose())
    }
}

impl Differentiable for Rot2 {
    type TangentVector = Vector1;

    fn move_along(&mut self, direction: &Vector1) {
        *self = self.retract(direction);
    }
}

impl LieGroup for Rot2 {
    type JacobianMatrix = Matrix1<f64>;

    const DOF: usize = 1;

    fn identity() -> Self {
        Rot2 { c: 1.0, s: 0.0 }
    }

    /// R(θ)⁻¹ = R(−θ), with J = −Ad = −1.
    fn inverse(&self, jacobian: Option<&mut Self::JacobianMatrix>) -> Self {
        if let Some(jac) = jacobian {
            *jac = -Matrix1::identity();
        }
        Rot2 {
            c: self.c,
            s: -self.s,
        }
    }

    /// SO(2) is abelian: both Jacobians are the identity.
    fn compose(
        &self,
        other: &Self,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
    ) -> Self {
        if let Some(jac_self) = jacobian_self {
            *jac_self = Matrix1::identity();
        }
        if let Some(jac_other) = jacobian_other {
            *jac_other = Matrix1::identity();
        }
        Rot2 {
            c: self.c * other.c - self.s * other.s,
            s: self.s * other.c + self.c * other.s,
        }
    }

    fn between(
        &self,
        other: &Self,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
    ) -> Self {
        if let Some(jac_self) = jacobian_self {
            *jac_self = -Matrix1::identity();
        }
        if let Some(jac_other) = jacobian_other {
            *jac_other = Matrix1::identity();
        }
        self.inverse(None).compose(other, None, None)
    }

    fn exp(tangent: &Vector1, jacobian: Option<&mut Self::JacobianMatrix>) -> Self {
        if let Some(jac) = jacobian {
            *jac = Matrix1::identity();
        }
        Rot2::from_angle(tangent[0])
    }

    fn log(&self, jacobian: Option<&mut Self::JacobianMatrix>) -> Vector1 {
        if let Some(jac) = jacobian {
            *jac = Matrix1::identity();
        }
        Vector1::new(self.theta())
    }

    fn adjoint_matrix(&self) -> Self::JacobianMatrix {
        Matrix1::identity()
    }

    fn normalize(&mut self) {
        let norm = self.c.hypot(self.s);
        // NaN or infinite pairs stay non-finite
        if norm <= f64::EPSILON {
            *self = Rot2::identity();
        } else {
            self.c /= norm;
            self.s /= norm;
        }
    }

    fn is_valid(&self, tolerance: f64) -> bool {
        (self.c * self.c + self.s * self.s - 1.0).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_rot2_identity() {
        let rot = Rot2::identity();
        assert!(rot.theta().abs() < TOLERANCE);
        assert_eq!(rot, Rot2::default());
    }

    #[test]
    fn test_rot2_unit_norm() {
        for i in -20..=20 {
            let rot = Rot2::from_angle(0.37 * i as f64);
            assert!(rot.is_valid(1e-9));
        }
    }

    #[test]
    fn test_rot2_compose() {
        let a = Rot2::from_angle(PI / 4.0);
        let b = Rot2::from_angle(PI / 2.0);
        let composed = a.compose(&b, None, None);
        assert!((composed.theta() - 3.0 * PI / 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_rot2_inverse() {
        let rot = Rot2::from_angle(PI / 3.0);
        let mut jac = Matrix1::zeros();
        let inv = rot.inverse(Some(&mut jac));
        assert!((inv.theta() + PI / 3.0).abs() < TOLERANCE);
        assert_eq!(jac[(0, 0)], -1.0);
        assert!(rot.compose(&inv, None, None).theta().abs() < TOLERANCE);
    }

    #[test]
    fn test_rot2_rotate_unrotate() {
        let rot = Rot2::from_angle(PI / 2.0);
        let v = Vector2::new(1.0, 2.0);
        let rotated = rot.rotate(&v);
        assert!((rotated.x + 2.0).abs() < TOLERANCE);
        assert!((rotated.y - 1.0).abs() < TOLERANCE);
        let back = rot.unrotate(&rotated);
        assert!((back - v).norm() < TOLERANCE);
    }

    #[test]
    fn test_rot2_rotate_jacobian_matches_perturbation() {
        let rot = Rot2::from_angle(0.7);
        let v = Vector2::new(0.3, -1.2);
        let h = 1e-6;
        let (_, d_rot, _) = rot.rotate_with_jacobians(&v);
        let plus = rot.retract(&Vector1::new(h)).rotate(&v);
        let minus = rot.retract(&Vector1::new(-h)).rotate(&v);
        let numerical = (plus - minus) / (2.0 * h);
        assert!((numerical - d_rot).norm() < 1e-8);

        let (_, d_rot, _) = rot.unrotate_with_jacobians(&v);
        let plus = rot.retract(&Vector1::new(h)).unrotate(&v);
        let minus = rot.retract(&Vector1::new(-h)).unrotate(&v);
        let numerical = (plus - minus) / (2.0 * h);
        assert!((numerical - d_rot).norm() < 1e-8);
    }

    #[test]
    fn test_rot2_theta_of_degenerate_pair() {
        assert_eq!(Rot2::from_cos_sin(0.0, 0.0).theta(), 0.0);
    }

    #[test]
    fn test_rot2_normalize() {
        let mut rot = Rot2::from_cos_sin(2.0, 2.0);
        assert!(!rot.is_valid(1e-9));
        rot.normalize();
        assert!(rot.is_valid(1e-12));
        assert!((rot.theta() - PI / 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_rot2_normalize_keeps_nan() {
        let mut rot = Rot2::from_cos_sin(f64::NAN, 0.5);
        rot.normalize();
        assert!(rot.cos().is_nan());
        assert!(!rot.is_valid(1e-9));

        let mut tiny = Rot2::from_cos_sin(0.0, 0.0);
        tiny.normalize();
        assert_eq!(tiny, Rot2::identity());
    }

    #[test]
    fn test_rot2_exp_log_consistency() {
        let tangent = Vector1::new(0.4);
        let rot = Rot2::exp(&tangent, None);
        let recovered = rot.log(None);
        assert!((tangent[0] - recovered[0]).abs() < TOLERANCE);
    }
}
