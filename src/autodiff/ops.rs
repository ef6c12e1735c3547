//! Traced primitives.
//!
//! Each operation evaluates its primal value through the manifold layer and records the
//! transpose of the analytic Jacobian as its pullback. Pullback contracts (right
//! perturbations, tangent order `(ω, vx, vy)`):
//!
//! | primitive | pullback of cotangent `g` |
//! |---|---|
//! | `a ∘ b` | `(Ad(b⁻¹)ᵀ g, g)` |
//! | `p⁻¹` | `−Ad(p)ᵀ g` |
//! | `a⁻¹ ∘ b` | chain rule through inverse and compose |
//! | `exp(ξ)` | `Jr(ξ)ᵀ g` |
//! | `log(p)` | `Jr(log p)⁻ᵀ g` |
//! | `p.rot()` | `(g, 0, 0)` |
//! | `p.t()` | `(0, Rᵀ g)` |
//! | `R v` | `(gᵀ J R v, Rᵀ g)` |

use crate::autodiff::Var;
use crate::manifold::{LieGroup, Pose2, Rot2, Tangent3, Vector1, Vector2, Vector3};
use nalgebra::Matrix3;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

// Scalars

impl Add for Var<f64> {
    type Output = Var<f64>;

    fn add(self, rhs: Var<f64>) -> Var<f64> {
        let value = self.value + rhs.value;
        self.zip_map(&rhs, value, |g: &f64| (*g, *g))
    }
}

impl Sub for Var<f64> {
    type Output = Var<f64>;

    fn sub(self, rhs: Var<f64>) -> Var<f64> {
        let value = self.value - rhs.value;
        self.zip_map(&rhs, value, |g: &f64| (*g, -*g))
    }
}

impl Mul for Var<f64> {
    type Output = Var<f64>;

    fn mul(self, rhs: Var<f64>) -> Var<f64> {
        let (a, b) = (self.value, rhs.value);
        self.zip_map(&rhs, a * b, move |g: &f64| (g * b, g * a))
    }
}

impl Neg for Var<f64> {
    type Output = Var<f64>;

    fn neg(self) -> Var<f64> {
        self.map(-self.value, |g: &f64| -*g)
    }
}

impl Add<f64> for Var<f64> {
    type Output = Var<f64>;

    fn add(self, rhs: f64) -> Var<f64> {
        self.map(self.value + rhs, |g: &f64| *g)
    }
}

impl Sub<f64> for Var<f64> {
    type Output = Var<f64>;

    fn sub(self, rhs: f64) -> Var<f64> {
        self.map(self.value - rhs, |g: &f64| *g)
    }
}

impl Mul<f64> for Var<f64> {
    type Output = Var<f64>;

    fn mul(self, rhs: f64) -> Var<f64> {
        self.map(self.value * rhs, move |g: &f64| g * rhs)
    }
}

impl Mul<Var<f64>> for f64 {
    type Output = Var<f64>;

    fn mul(self, rhs: Var<f64>) -> Var<f64> {
        rhs * self
    }
}

impl Div<f64> for Var<f64> {
    type Output = Var<f64>;

    fn div(self, rhs: f64) -> Var<f64> {
        self.map(self.value / rhs, move |g: &f64| g / rhs)
    }
}

impl Sum for Var<f64> {
    fn sum<I: Iterator<Item = Var<f64>>>(iter: I) -> Var<f64> {
        iter.fold(Var::constant(0.0), |acc, x| acc + x)
    }
}

impl Var<f64> {
    /// `x²`.
    pub fn square(&self) -> Var<f64> {
        let x = self.value;
        self.map(x * x, move |g: &f64| 2.0 * x * g)
    }

    /// `√x`. The derivative is unbounded at zero and propagates as such.
    pub fn sqrt(&self) -> Var<f64> {
        let root = self.value.sqrt();
        self.map(root, move |g: &f64| g / (2.0 * root))
    }
}

// Vectors

impl Add for Var<Vector2> {
    type Output = Var<Vector2>;

    fn add(self, rhs: Var<Vector2>) -> Var<Vector2> {
        let value = self.value + rhs.value;
        self.zip_map(&rhs, value, |g: &Vector2| (*g, *g))
    }
}

impl Sub for Var<Vector2> {
    type Output = Var<Vector2>;

    fn sub(self, rhs: Var<Vector2>) -> Var<Vector2> {
        let value = self.value - rhs.value;
        self.zip_map(&rhs, value, |g: &Vector2| (*g, -*g))
    }
}

impl Var<Vector2> {
    /// First component.
    pub fn x(&self) -> Var<f64> {
        self.map(self.value.x, |g: &f64| Vector2::new(*g, 0.0))
    }

    /// Second component.
    pub fn y(&self) -> Var<f64> {
        self.map(self.value.y, |g: &f64| Vector2::new(0.0, *g))
    }

    /// `‖v‖²`.
    pub fn norm_squared(&self) -> Var<f64> {
        let v = self.value;
        self.map(v.norm_squared(), move |g: &f64| v * (2.0 * g))
    }

    /// `‖v‖`.
    pub fn norm(&self) -> Var<f64> {
        self.norm_squared().sqrt()
    }
}

impl Var<Vector3> {
    /// Component `index`.
    pub fn component(&self, index: usize) -> Var<f64> {
        self.map(self.value[index], move |g: &f64| {
            let mut cotangent = Vector3::zeros();
            cotangent[index] = *g;
            cotangent
        })
    }

    /// `Σ wᵢ vᵢ²`.
    pub fn weighted_norm_squared(&self, weights: &Vector3) -> Var<f64> {
        let v = self.value;
        let weights = *weights;
        let value = weights.component_mul(&v).dot(&v);
        self.map(value, move |g: &f64| weights.component_mul(&v) * (2.0 * g))
    }

    /// `exp(ξ)` with ξ read as an SE(2) tangent `(ω, vx, vy)`.
    pub fn exp(&self) -> Var<Pose2> {
        let mut jacobian = Matrix3::zeros();
        let value = Pose2::exp(&self.value, Some(&mut jacobian));
        self.map(value, move |g: &Tangent3| jacobian.tr_mul(g))
    }
}

// Rotations

impl Var<Rot2> {
    /// Rotation angle.
    pub fn theta(&self) -> Var<f64> {
        self.map(self.value.theta(), |g: &f64| Vector1::new(*g))
    }

    /// `a ∘ b`.
    pub fn compose(&self, other: &Var<Rot2>) -> Var<Rot2> {
        let value = self.value.compose(&other.value, None, None);
        self.zip_map(other, value, |g: &Vector1| (*g, *g))
    }

    /// `R⁻¹`.
    pub fn inverse(&self) -> Var<Rot2> {
        self.map(self.value.inverse(None), |g: &Vector1| -*g)
    }

    /// `R v`.
    pub fn rotate(&self, v: &Var<Vector2>) -> Var<Vector2> {
        let (value, d_rot, d_v) = self.value.rotate_with_jacobians(&v.value);
        self.zip_map(v, value, move |g: &Vector2| {
            (Vector1::new(d_rot.dot(g)), d_v.tr_mul(g))
        })
    }

    /// `Rᵀ v`.
    pub fn unrotate(&self, v: &Var<Vector2>) -> Var<Vector2> {
        let (value, d_rot, d_v) = self.value.unrotate_with_jacobians(&v.value);
        self.zip_map(v, value, move |g: &Vector2| {
            (Vector1::new(d_rot.dot(g)), d_v.tr_mul(g))
        })
    }
}

// Poses

impl Var<Pose2> {
    /// Assemble a pose from a traced rotation and translation.
    pub fn from_parts(rot: &Var<Rot2>, t: &Var<Vector2>) -> Var<Pose2> {
        let value = Pose2::new(rot.value, t.value);
        let rotation = rot.value;
        rot.zip_map(t, value, move |g: &Tangent3| {
            (
                Vector1::new(g[0]),
                rotation.rotate(&Vector2::new(g[1], g[2])),
            )
        })
    }

    /// Rotation part.
    pub fn rot(&self) -> Var<Rot2> {
        self.map(self.value.rot(), |g: &Vector1| {
            Tangent3::new(g[0], 0.0, 0.0)
        })
    }

    /// Translation part.
    pub fn t(&self) -> Var<Vector2> {
        let rotation = self.value.rot();
        self.map(self.value.t(), move |g: &Vector2| {
            let local = rotation.unrotate(g);
            Tangent3::new(0.0, local.x, local.y)
        })
    }

    /// `a ∘ b`.
    pub fn compose(&self, other: &Var<Pose2>) -> Var<Pose2> {
        let value = self.value.compose(&other.value, None, None);
        let other_inverse = other.value.inverse(None);
        self.zip_map(other, value, move |g: &Tangent3| {
            (other_inverse.adjoint_transpose(g), *g)
        })
    }

    /// `p⁻¹`.
    pub fn inverse(&self) -> Var<Pose2> {
        let pose = self.value;
        self.map(pose.inverse(None), move |g: &Tangent3| {
            -pose.adjoint_transpose(g)
        })
    }

    /// `a⁻¹ ∘ b`.
    pub fn between(&self, other: &Var<Pose2>) -> Var<Pose2> {
        self.inverse().compose(other)
    }

    /// `log(p)`.
    pub fn log(&self) -> Var<Tangent3> {
        let mut jacobian = Matrix3::zeros();
        let value = self.value.log(Some(&mut jacobian));
        self.map(value, move |g: &Tangent3| jacobian.tr_mul(g))
    }

    /// `p ∘ exp(ξ)`.
    pub fn retract(&self, tangent: &Var<Tangent3>) -> Var<Pose2> {
        self.compose(&tangent.exp())
    }

    /// `log(p⁻¹ ∘ q)`.
    pub fn local_coordinate(&self, other: &Var<Pose2>) -> Var<Tangent3> {
        self.between(other).log()
    }
}
