//! Small fixed-size vectors and the vector-space contract shared by every tangent type.
//!
//! Tangent vectors are plain nalgebra column vectors. `Vector3` doubles as the tangent of
//! [`Pose2`](crate::manifold::pose2::Pose2) in the `(ω, vx, vy)` ordering, exposed under the
//! alias [`Tangent3`].

use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// One-dimensional vector (tangent of [`Rot2`](crate::manifold::rot2::Rot2)).
pub type Vector1 = nalgebra::Vector1<f64>;

/// Two-dimensional vector (translations, points).
pub type Vector2 = nalgebra::Vector2<f64>;

/// Three-dimensional vector.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Tangent vector of SE(2), ordered `(ω, vx, vy)`.
pub type Tangent3 = Vector3;

/// Finite-dimensional real vector space with a canonical basis.
///
/// The flat-slice methods let the reverse-mode layer accumulate cotangents of any tangent type
/// into one contiguous gradient buffer.
pub trait VectorSpace:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + 'static
{
    /// Number of scalar components.
    const DIMENSION: usize;

    /// The additive identity.
    fn zero() -> Self;

    /// Euclidean inner product.
    fn dot(&self, other: &Self) -> f64;

    /// Euclidean norm.
    fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Component `index` of the vector.
    fn component(&self, index: usize) -> f64;

    /// Builds a vector from the first `DIMENSION` entries of `data`.
    fn from_slice(data: &[f64]) -> Self;

    /// Unit vectors `e₀ … e_{n-1}` in component order.
    fn standard_basis() -> Vec<Self> {
        (0..Self::DIMENSION)
            .map(|i| {
                let mut data = vec![0.0; Self::DIMENSION];
                data[i] = 1.0;
                Self::from_slice(&data)
            })
            .collect()
    }

    /// Adds the components of `self` onto `out` (which must have length `DIMENSION`).
    fn accumulate_into(&self, out: &mut [f64]) {
        for (i, slot) in out.iter_mut().enumerate().take(Self::DIMENSION) {
            *slot += self.component(i);
        }
    }
}

impl VectorSpace for f64 {
    const DIMENSION: usize = 1;

    fn zero() -> Self {
        0.0
    }

    fn dot(&self, other: &Self) -> f64 {
        self * other
    }

    fn norm(&self) -> f64 {
        self.abs()
    }

    fn component(&self, _index: usize) -> f64 {
        *self
    }

    fn from_slice(data: &[f64]) -> Self {
        data[0]
    }
}

macro_rules! impl_vector_space {
    ($type:ty, $dim:expr) => {
        impl VectorSpace for $type {
            const DIMENSION: usize = $dim;

            fn zero() -> Self {
                <$type>::zeros()
            }

            fn dot(&self, other: &Self) -> f64 {
                nalgebra::Matrix::dot(self, other)
            }

            fn norm(&self) -> f64 {
                nalgebra::Matrix::norm(self)
            }

            fn component(&self, index: usize) -> f64 {
                self[index]
            }

            fn from_slice(data: &[f64]) -> Self {
                <$type>::from_column_slice(&data[..$dim])
            }
        }
    };
}

impl_vector_space!(Vector1, 1);
impl_vector_space!(Vector2, 2);
impl_vector_space!(Vector3, 3);
