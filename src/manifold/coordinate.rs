//! Chart-local coordinates of SE(2).
//!
//! [`Pose2Coordinate`] shares its storage with [`Pose2`](crate::manifold::pose2::Pose2) but
//! carries the chart-dependent math: the exponential and logarithmic maps, their Jacobians,
//! `retract` / `local_coordinate`, and the dense reference adjoint used to validate the
//! component-wise one on `Pose2`.
//!
//! Tangent vectors are ordered `(ω, vx, vy)`.

use crate::manifold::rot2::Rot2;
use crate::manifold::vector::{Tangent3, Vector2};
use crate::manifold::{LieGroup, SMALL_ANGLE_THRESHOLD};
use nalgebra::{Matrix2, Matrix3};

/// Rotation and translation of a rigid planar motion, used as a local chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose2Coordinate {
    pub(crate) rot: Rot2,
    pub(crate) t: Vector2,
}

impl Default for Pose2Coordinate {
    fn default() -> Self {
        Pose2Coordinate {
            rot: Rot2::identity(),
            t: Vector2::zeros(),
        }
    }
}

impl Pose2Coordinate {
    /// Create a coordinate from its rotation and translation.
    pub fn new(rot: Rot2, t: Vector2) -> Self {
        Pose2Coordinate { rot, t }
    }

    /// Rotation part.
    pub fn rot(&self) -> Rot2 {
        self.rot
    }

    /// Translation part.
    pub fn t(&self) -> Vector2 {
        self.t
    }

    /// `self ∘ other`.
    pub fn compose(&self, other: &Pose2Coordinate) -> Pose2Coordinate {
        Pose2Coordinate {
            rot: self.rot.compose(&other.rot, None, None),
            t: self.t + self.rot.rotate(&other.t),
        }
    }

    /// Group inverse.
    pub fn inverse(&self) -> Pose2Coordinate {
        Pose2Coordinate {
            rot: self.rot.inverse(None),
            t: self.rot.unrotate(&-self.t),
        }
    }

    /// `self⁻¹ ∘ other` in closed form.
    pub fn between(&self, other: &Pose2Coordinate) -> Pose2Coordinate {
        Pose2Coordinate {
            rot: self.rot.inverse(None).compose(&other.rot, None, None),
            t: self.rot.unrotate(&(other.t - self.t)),
        }
    }

    /// Exponential map `se(2) → SE(2)`.
    ///
    /// For ξ = (ω, v) the translation is `V(ω) v` with
    /// `V(ω) = [sin ω/ω, −(1−cos ω)/ω; (1−cos ω)/ω, sin ω/ω]`; below
    /// [`SMALL_ANGLE_THRESHOLD`] the first-order form `V = I` is used.
    ///
    /// When `jacobian` is given it receives the right Jacobian `Jr(ξ)`:
    /// `exp(ξ + δ) ≈ exp(ξ) ∘ exp(Jr(ξ) δ)`.
    pub fn exp(tangent: &Tangent3, jacobian: Option<&mut Matrix3<f64>>) -> Pose2Coordinate {
        let omega = tangent[0];
        let (vx, vy) = (tangent[1], tangent[2]);

        // sin(ω)/ω, (1 − cos ω)/ω and the two derivative factors used by Jr
        let (a, b, p, q) = if omega.abs() < SMALL_ANGLE_THRESHOLD {
            (1.0, 0.5 * omega, omega / 6.0, 0.5)
        } else {
            let a = omega.sin() / omega;
            let b = one_minus_cos(omega) / omega;
            let p = if omega.abs() < SERIES_THRESHOLD {
                let omega_sq = omega * omega;
                omega / 6.0 * (1.0 - omega_sq / 20.0 * (1.0 - omega_sq / 42.0))
            } else {
                (1.0 - a) / omega
            };
            (a, b, p, b / omega)
        };

        let t = if omega.abs() < SMALL_ANGLE_THRESHOLD {
            Vector2::new(vx, vy)
        } else {
            Vector2::new(a * vx - b * vy, b * vx + a * vy)
        };

        if let Some(jac) = jacobian {
            *jac = Matrix3::new(1.0, 0.0, 0.0, p * vx - q * vy, a, b, q * vx + p * vy, -b, a);
        }

        Pose2Coordinate {
            rot: Rot2::from_angle(omega),
            t,
        }
    }

    /// Logarithmic map `SE(2) → se(2)`, inverse of [`Pose2Coordinate::exp`].
    ///
    /// When `jacobian` is given it receives `Jr(ξ)⁻¹` for the returned ξ.
    pub fn log(&self, jacobian: Option<&mut Matrix3<f64>>) -> Tangent3 {
        let omega = self.rot.theta();
        let (tx, ty) = (self.t.x, self.t.y);

        let tangent = if omega.abs() < SMALL_ANGLE_THRESHOLD {
            Tangent3::new(omega, tx, ty)
        } else {
            let s = self.rot.sin();
            let c_1 = one_minus_cos(omega);
            let det = c_1 * c_1 + s * s;
            let p = omega / det;
            Tangent3::new(omega, p * (s * tx + c_1 * ty), p * (-c_1 * tx + s * ty))
        };

        if let Some(jac) = jacobian {
            let mut right_jacobian = Matrix3::zeros();
            Self::exp(&tangent, Some(&mut right_jacobian));
            *jac = invert_right_jacobian(&right_jacobian);
        }

        tangent
    }

    /// Retraction at `self`: `self ∘ exp(ξ)`.
    pub fn retract(&self, tangent: &Tangent3) -> Pose2Coordinate {
        self.compose(&Self::exp(tangent, None))
    }

    /// Inverse of [`Pose2Coordinate::retract`]: `log(self⁻¹ ∘ other)`.
    pub fn local_coordinate(&self, other: &Pose2Coordinate) -> Tangent3 {
        self.between(other).log(None)
    }

    /// Dense adjoint matrix acting on `(ω, vx, vy)`:
    ///
    /// ```text
    /// Ad = [ 1    0     0
    ///        ty   cos  −sin
    ///       −tx   sin   cos ]
    /// ```
    pub fn adjoint_matrix(&self) -> Matrix3<f64> {
        let (c, s) = (self.rot.cos(), self.rot.sin());
        Matrix3::new(
            1.0, 0.0, 0.0, //
            self.t.y, c, -s, //
            -self.t.x, s, c,
        )
    }

    /// Reference `Ad · v` through the dense matrix.
    pub fn default_adjoint(&self, v: &Tangent3) -> Tangent3 {
        self.adjoint_matrix() * v
    }

    /// Reference `Adᵀ · v` through the dense matrix.
    pub fn default_adjoint_transpose(&self, v: &Tangent3) -> Tangent3 {
        self.adjoint_matrix().tr_mul(v)
    }
}

/// Below this |ω| the factor `(1 − sin ω/ω)/ω` of Jr comes from its series.
const SERIES_THRESHOLD: f64 = 1e-2;

/// `1 − cos ω` as `2 sin²(ω/2)`, free of cancellation near zero.
fn one_minus_cos(omega: f64) -> f64 {
    let half_sin = (0.5 * omega).sin();
    2.0 * half_sin * half_sin
}

/// Inverts a right Jacobian `[1 0; u M]` blockwise, `M` being a scaled rotation.
fn invert_right_jacobian(jacobian: &Matrix3<f64>) -> Matrix3<f64> {
    let block = Matrix2::new(
        jacobian[(1, 1)],
        jacobian[(1, 2)],
        jacobian[(2, 1)],
        jacobian[(2, 2)],
    );
    let scale = block[(0, 0)] * block[(0, 0)] + block[(0, 1)] * block[(0, 1)];
    let block_inv = block.transpose() / scale;
    let column = -(block_inv * Vector2::new(jacobian[(1, 0)], jacobian[(2, 0)]));
    Matrix3::new(
        1.0,
        0.0,
        0.0,
        column.x,
        block_inv[(0, 0)],
        block_inv[(0, 1)],
        column.y,
        block_inv[(1, 0)],
        block_inv[(1, 1)],
    )
}
