//! Pose2 - rigid motions in the plane, SE(2)
//!
//! A [`Pose2`] is a rotation ([`Rot2`]) followed by a translation ([`Vector2`]). The value
//! type exposes the group API; chart-local math lives on its [`Pose2Coordinate`].
//!
//! Tangent vectors are `(ω, vx, vy)` and all Jacobians are taken with respect to right
//! perturbations, e.g. for two poses `A`, `B`:
//!
//! ```text
//! ∂(A ∘ B)/∂A = Ad(B⁻¹)      ∂(A ∘ B)/∂B = I
//! ∂A⁻¹/∂A     = −Ad(A)
//! ∂(A⁻¹ ∘ B)/∂A = −Ad((A⁻¹ ∘ B)⁻¹)   ∂(A⁻¹ ∘ B)/∂B = I
//! ```

use crate::manifold::coordinate::Pose2Coordinate;
use crate::manifold::rot2::Rot2;
use crate::manifold::vector::{Tangent3, Vector2};
use crate::manifold::{Differentiable, LieGroup, ManifoldError, ManifoldResult, identity_jacobian};
use nalgebra::Matrix3;
use rand::Rng;
use rand_distr::StandardNormal;
use std::fmt;
use std::ops::Mul;

/// SE(2) group element.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Pose2 {
    coordinate: Pose2Coordinate,
}

impl fmt::Display for Pose2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pose2(translation: [{:.4}, {:.4}], rotation: {:.4})",
            self.x(),
            self.y(),
            self.theta()
        )
    }
}

impl TryFrom<&[f64]> for Pose2 {
    type Error = ManifoldError;

    /// Build from `[x, y, θ]`.
    fn try_from(data: &[f64]) -> ManifoldResult<Self> {
        match *data {
            [x, y, theta] => Ok(Pose2::from_xy_angle(x, y, theta)),
            _ => Err(ManifoldError::InvalidDimension {
                expected: 3,
                actual: data.len(),
            }),
        }
    }
}

impl Mul for Pose2 {
    type Output = Pose2;

    fn mul(self, rhs: Pose2) -> Pose2 {
        self.compose(&rhs, None, None)
    }
}

impl Pose2 {
    /// Create a pose from a rotation and a translation.
    pub fn new(rot: Rot2, t: Vector2) -> Self {
        Pose2 {
            coordinate: Pose2Coordinate::new(rot, t),
        }
    }

    /// Create a pose from translation components and an angle.
    pub fn from_xy_angle(x: f64, y: f64, theta: f64) -> Self {
        Self::new(Rot2::from_angle(theta), Vector2::new(x, y))
    }

    /// Wrap a chart coordinate.
    pub fn from_coordinate(coordinate: Pose2Coordinate) -> Self {
        Pose2 { coordinate }
    }

    /// The chart-local coordinate of this pose.
    pub fn coordinate(&self) -> &Pose2Coordinate {
        &self.coordinate
    }

    /// Rotation part.
    #[inline]
    pub fn rot(&self) -> Rot2 {
        self.coordinate.rot
    }

    /// Translation part.
    #[inline]
    pub fn t(&self) -> Vector2 {
        self.coordinate.t
    }

    /// Get the x component of translation.
    pub fn x(&self) -> f64 {
        self.coordinate.t.x
    }

    /// Get the y component of translation.
    pub fn y(&self) -> f64 {
        self.coordinate.t.y
    }

    /// Get the rotation angle in radians.
    pub fn theta(&self) -> f64 {
        self.coordinate.rot.theta()
    }

    /// Homogeneous 3×3 transformation matrix.
    pub fn matrix(&self) -> Matrix3<f64> {
        let (c, s) = (self.rot().cos(), self.rot().sin());
        Matrix3::new(c, -s, self.x(), s, c, self.y(), 0.0, 0.0, 1.0)
    }

    /// Map a point from the local frame: `R p + t`.
    pub fn transform_point(&self, point: &Vector2) -> Vector2 {
        self.rot().rotate(point) + self.t()
    }

    /// `Ad(p) · v`, evaluated component-wise.
    pub fn adjoint(&self, v: &Tangent3) -> Tangent3 {
        let (c, s) = (self.rot().cos(), self.rot().sin());
        let (tx, ty) = (self.x(), self.y());
        Tangent3::new(
            v[0],
            ty * v[0] + c * v[1] - s * v[2],
            -tx * v[0] + s * v[1] + c * v[2],
        )
    }

    /// `Ad(p)ᵀ · v`, evaluated component-wise.
    pub fn adjoint_transpose(&self, v: &Tangent3) -> Tangent3 {
        let (c, s) = (self.rot().cos(), self.rot().sin());
        let (tx, ty) = (self.x(), self.y());
        Tangent3::new(
            v[0] + ty * v[1] - tx * v[2],
            c * v[1] + s * v[2],
            -s * v[1] + c * v[2],
        )
    }

    /// Check approximate equality through the local coordinate.
    pub fn is_approx(&self, other: &Pose2, tolerance: f64) -> bool {
        self.local_coordinate(other).norm() < tolerance
    }

    /// Draw `exp(ξ)` with `ξ ~ N(0, Σ)`.
    ///
    /// `covariance` must be symmetric positive definite; it is factored with a Cholesky
    /// decomposition and standard-normal samples are colored by its lower factor.
    pub fn random_with_covariance<R: Rng>(
        covariance: &Matrix3<f64>,
        rng: &mut R,
    ) -> ManifoldResult<Self> {
        if covariance.iter().any(|x| !x.is_finite()) {
            return Err(ManifoldError::InvalidCovariance(
                "covariance has non-finite entries".to_string(),
            ));
        }
        if (covariance - covariance.transpose()).amax() > 1e-12 * covariance.amax().max(1.0) {
            return Err(ManifoldError::InvalidCovariance(
                "covariance is not symmetric".to_string(),
            ));
        }
        let cholesky = covariance.cholesky().ok_or_else(|| {
            ManifoldError::InvalidCovariance("covariance is not positive definite".to_string())
        })?;
        let z = Tangent3::from_fn(|_, _| rng.sample(StandardNormal));
        let xi = cholesky.l() * z;
        Ok(Pose2::identity().retract(&xi))
    }

    /// Draw a pose with identity covariance from the thread-local generator.
    pub fn random() -> Self {
        let xi = Tangent3::from_fn(|_, _| rand::rng().sample(StandardNormal));
        Pose2::identity().retract(&xi)
    }
}

impl Differentiable for Pose2 {
    type TangentVector = Tangent3;

    fn move_along(&mut self, direction: &Tangent3) {
        *self = self.retract(direction);
    }
}

impl LieGroup for Pose2 {
    type JacobianMatrix = Matrix3<f64>;

    const DOF: usize = 3;

    fn identity() -> Self {
        Pose2::default()
    }

    /// Inverse: `(Rᵀ, −Rᵀ t)`, with `∂p⁻¹/∂p = −Ad(p)`.
    fn inverse(&self, jacobian: Option<&mut Self::JacobianMatrix>) -> Self {
        if let Some(jac) = jacobian {
            *jac = -self.adjoint_matrix();
        }
        Pose2::from_coordinate(self.coordinate.inverse())
    }

    /// Composition: `(R_a R_b, t_a + R_a t_b)`.
    fn compose(
        &self,
        other: &Self,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
    ) -> Self {
        if let Some(jac_self) = jacobian_self {
            *jac_self = other.inverse(None).adjoint_matrix();
        }
        if let Some(jac_other) = jacobian_other {
            *jac_other = identity_jacobian();
        }
        Pose2::from_coordinate(self.coordinate.compose(&other.coordinate))
    }

    /// Relative pose `self⁻¹ ∘ other` in closed form.
    fn between(
        &self,
        other: &Self,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
    ) -> Self {
        let result = Pose2::from_coordinate(self.coordinate.between(&other.coordinate));
        if let Some(jac_self) = jacobian_self {
            *jac_self = -result.inverse(None).adjoint_matrix();
        }
        if let Some(jac_other) = jacobian_other {
            *jac_other = identity_jacobian();
        }
        result
    }

    fn exp(tangent: &Tangent3, jacobian: Option<&mut Self::JacobianMatrix>) -> Self {
        Pose2::from_coordinate(Pose2Coordinate::exp(tangent, jacobian))
    }

    fn log(&self, jacobian: Option<&mut Self::JacobianMatrix>) -> Tangent3 {
        self.coordinate.log(jacobian)
    }

    fn adjoint_matrix(&self) -> Self::JacobianMatrix {
        self.coordinate.adjoint_matrix()
    }

    fn retract(&self, tangent: &Tangent3) -> Self {
        Pose2::from_coordinate(self.coordinate.retract(tangent))
    }

    fn local_coordinate(&self, other: &Self) -> Tangent3 {
        self.coordinate.local_coordinate(&other.coordinate)
    }

    fn normalize(&mut self) {
        self.coordinate.rot.normalize();
    }

    fn is_valid(&self, tolerance: f64) -> bool {
        self.coordinate.rot.is_valid(tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::VectorSpace;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_pose2_identity() {
        let pose = Pose2::identity();
        assert!(pose.x().abs() < TOLERANCE);
        assert!(pose.y().abs() < TOLERANCE);
        assert!(pose.theta().abs() < TOLERANCE);
    }

    #[test]
    fn test_pose2_from_xy_angle() {
        let pose = Pose2::from_xy_angle(1.0, 2.0, PI / 4.0);
        assert!((pose.x() - 1.0).abs() < TOLERANCE);
        assert!((pose.y() - 2.0).abs() < TOLERANCE);
        assert!((pose.theta() - PI / 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_pose2_try_from_slice() {
        let pose = Pose2::try_from([1.0, 2.0, 0.5].as_slice()).unwrap();
        assert_eq!(pose, Pose2::from_xy_angle(1.0, 2.0, 0.5));

        let err = Pose2::try_from([1.0, 2.0].as_slice()).unwrap_err();
        assert_eq!(
            err,
            ManifoldError::InvalidDimension {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_pose2_inverse_identities() {
        let pose = Pose2::from_xy_angle(1.0, 2.0, PI / 4.0);
        let inv = pose.inverse(None);
        assert!(
            pose.compose(&inv, None, None)
                .is_approx(&Pose2::identity(), TOLERANCE)
        );
        assert!(
            inv.compose(&pose, None, None)
                .is_approx(&Pose2::identity(), TOLERANCE)
        );
    }

    #[test]
    fn test_pose2_mul_operator() {
        let a = Pose2::from_xy_angle(1.0, 0.0, 0.0);
        let b = Pose2::from_xy_angle(0.0, 1.0, 0.0);
        let composed = a * b;
        assert!((composed.x() - 1.0).abs() < TOLERANCE);
        assert!((composed.y() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_pose2_associativity() {
        let a = Pose2::from_xy_angle(1.0, -2.0, 0.3);
        let b = Pose2::from_xy_angle(0.5, 0.7, -1.9);
        let c = Pose2::from_xy_angle(-3.0, 1.0, 2.8);
        assert!(((a * b) * c).is_approx(&(a * (b * c)), TOLERANCE));
    }

    #[test]
    fn test_pose2_transform_point_and_matrix() {
        let pose = Pose2::from_xy_angle(1.0, 2.0, PI / 2.0);
        let point = Vector2::new(1.0, 0.0);
        let mapped = pose.transform_point(&point);
        assert!((mapped - Vector2::new(1.0, 3.0)).norm() < TOLERANCE);

        let homogeneous = pose.matrix() * nalgebra::Vector3::new(point.x, point.y, 1.0);
        assert!((homogeneous.x - mapped.x).abs() < TOLERANCE);
        assert!((homogeneous.y - mapped.y).abs() < TOLERANCE);
    }

    #[test]
    fn test_pose2_adjoint_agrees_with_dense_matrix() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10 {
            let pose = Pose2::random_with_covariance(&Matrix3::identity(), &mut rng).unwrap();
            for v in Tangent3::standard_basis() {
                let fast = pose.adjoint(&v);
                let dense = pose.coordinate().default_adjoint(&v);
                assert!((fast - dense).norm() < 1e-10);
                let fast = pose.adjoint_transpose(&v);
                let dense = pose.coordinate().default_adjoint_transpose(&v);
                assert!((fast - dense).norm() < 1e-10);
            }
        }
    }

    #[test]
    fn test_pose2_adjoint_conjugation() {
        // Ad(p) ξ = log(p ∘ exp(ξ) ∘ p⁻¹) for small ξ
        let pose = Pose2::from_xy_angle(0.4, -1.3, 2.1);
        let xi = Tangent3::new(1e-6, -2e-6, 3e-6);
        let conjugated = pose
            .compose(&Pose2::exp(&xi, None), None, None)
            .compose(&pose.inverse(None), None, None)
            .log(None);
        assert!((conjugated - pose.adjoint(&xi)).norm() < 1e-12);
    }

    #[test]
    fn test_pose2_compose_jacobians() {
        let a = Pose2::from_xy_angle(1.0, 2.0, 0.4);
        let b = Pose2::from_xy_angle(-0.5, 3.0, -1.2);
        let mut jac_a = Matrix3::zeros();
        let mut jac_b = Matrix3::zeros();
        a.compose(&b, Some(&mut jac_a), Some(&mut jac_b));
        assert!((jac_a - b.inverse(None).adjoint_matrix()).norm() < 1e-10);
        assert!((jac_b - Matrix3::identity()).norm() < 1e-10);
    }

    #[test]
    fn test_pose2_between_jacobians_gtsam_values() {
        let w_t1 = Pose2::from_xy_angle(1.0, 2.0, PI / 2.0);
        let w_t2 = Pose2::from_xy_angle(-1.0, 4.0, PI);
        let mut jac_1 = Matrix3::zeros();
        let mut jac_2 = Matrix3::zeros();
        w_t1.between(&w_t2, Some(&mut jac_1), Some(&mut jac_2));
        let expected = Matrix3::new(-1.0, 0.0, 0.0, -2.0, 0.0, -1.0, -2.0, 1.0, 0.0);
        assert!((jac_1 - expected).norm() < 1e-10);
        assert!((jac_2 - Matrix3::identity()).norm() < 1e-10);
    }

    #[test]
    fn test_pose2_random_with_covariance_is_reproducible() {
        let covariance = Matrix3::from_diagonal(&Tangent3::new(0.1, 2.0, 3.0));
        let a = Pose2::random_with_covariance(&covariance, &mut ChaCha8Rng::seed_from_u64(42));
        let b = Pose2::random_with_covariance(&covariance, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a.unwrap().is_valid(1e-12));
    }

    #[test]
    fn test_pose2_random_rejects_invalid_covariance() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let indefinite = Matrix3::from_diagonal(&Tangent3::new(1.0, -1.0, 1.0));
        assert!(matches!(
            Pose2::random_with_covariance(&indefinite, &mut rng),
            Err(ManifoldError::InvalidCovariance(_))
        ));

        let asymmetric = Matrix3::new(1.0, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert!(matches!(
            Pose2::random_with_covariance(&asymmetric, &mut rng),
            Err(ManifoldError::InvalidCovariance(_))
        ));

        let mut non_finite = Matrix3::identity();
        non_finite[(1, 1)] = f64::NAN;
        assert!(matches!(
            Pose2::random_with_covariance(&non_finite, &mut rng),
            Err(ManifoldError::InvalidCovariance(_))
        ));
    }

    #[test]
    fn test_pose2_move_along_is_retract() {
        let mut pose = Pose2::from_xy_angle(1.0, 2.0, 0.3);
        let direction = Tangent3::new(0.1, -0.2, 0.05);
        let expected = pose.retract(&direction);
        pose.move_along(&direction);
        assert_eq!(pose, expected);
        assert!((pose.local_coordinate(&expected)).norm() < TOLERANCE);
        assert_eq!(<Tangent3 as VectorSpace>::DIMENSION, Pose2::DOF);
    }

    #[test]
    fn test_pose2_display() {
        let pose = Pose2::from_xy_angle(1.0, 2.0, 0.0);
        assert_eq!(
            pose.to_string(),
            "Pose2(translation: [1.0000, 2.0000], rotation: 0.0000)"
        );
    }
}
