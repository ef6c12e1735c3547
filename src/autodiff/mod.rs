//! Reverse-mode differentiation through explicit pullback closures.
//!
//! Every traced value is a [`Var`]: the primal value plus a pullback that maps a cotangent of
//! the value back onto the cotangents of the parameters it was computed from. Primitives in
//! [`ops`] build new `Var`s from the analytic Jacobians of the manifold layer, so a user
//! function assembled from them carries a tree of closures that implements the chain rule.
//!
//! There is no global tape. The entry points ([`value_with_gradient`], [`pullback`],
//! [`jacobian`]) seed the parameter leaves, run the function once, and drop the whole trace
//! before returning.
//!
//! Gradients are accumulated into one flat buffer laid out by the [`Parameter`] being
//! differentiated, then reshaped into its gradient type (e.g. `Vec<Tangent3>` for
//! `Vec<Pose2>`). Accumulation order follows the closure tree and is deterministic.
//!
//! # Example
//!
//! ```
//! use se2_fusion::autodiff::{Var, value_with_gradient};
//! use se2_fusion::manifold::Pose2;
//!
//! let target = Var::constant(Pose2::from_xy_angle(1.0, 1.0, 1.0));
//! let start = Pose2::from_xy_angle(1.0, 0.0, 0.0);
//! let (loss, gradient) = value_with_gradient(&start, |pose| {
//!     let error = pose.between(&target);
//!     let theta = error.rot().theta();
//!     let t = error.t();
//!     (theta.clone() * theta + t.x() * t.x() + t.y() * t.y()) / 10.0
//! });
//! assert!(loss > 0.0);
//! assert!(gradient.norm() > 0.0);
//! ```

use crate::manifold::{Differentiable, VectorSpace};
use nalgebra::DMatrix;
use std::fmt;
use std::rc::Rc;

pub mod ops;
pub mod parameter;

pub use parameter::Parameter;

/// Backward function of a traced value: pushes a cotangent into the flat gradient buffer.
type Backward<T> = Rc<dyn Fn(&<T as Differentiable>::TangentVector, &mut [f64])>;

/// A value recorded for reverse-mode differentiation.
///
/// Cloning is cheap: the pullback is reference counted and shared by every use of the value.
pub struct Var<T: Differentiable> {
    value: T,
    backward: Option<Backward<T>>,
}

impl<T: Differentiable> Clone for Var<T> {
    fn clone(&self) -> Self {
        Var {
            value: self.value.clone(),
            backward: self.backward.clone(),
        }
    }
}

impl<T: Differentiable> fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("value", &self.value)
            .field("tracked", &self.is_tracked())
            .finish()
    }
}

impl<T: Differentiable> Var<T> {
    /// A value that does not depend on the parameters.
    pub fn constant(value: T) -> Self {
        Var {
            value,
            backward: None,
        }
    }

    /// A parameter leaf whose cotangent lands in `gradient[offset..offset + DIMENSION]`.
    pub(crate) fn leaf(value: T, offset: usize) -> Self {
        let dimension = <T::TangentVector as VectorSpace>::DIMENSION;
        Var {
            value,
            backward: Some(Rc::new(
                move |cotangent: &T::TangentVector, gradient: &mut [f64]| {
                    cotangent.accumulate_into(&mut gradient[offset..offset + dimension]);
                },
            )),
        }
    }

    /// The primal value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consume the trace and keep the primal value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Whether the value depends on any parameter.
    pub fn is_tracked(&self) -> bool {
        self.backward.is_some()
    }

    /// Push `cotangent` back to the parameter leaves, adding into `gradient`.
    pub fn backpropagate(&self, cotangent: &T::TangentVector, gradient: &mut [f64]) {
        if let Some(backward) = &self.backward {
            backward(cotangent, gradient);
        }
    }

    /// Build a unary node `value = f(self)` whose pullback maps an output cotangent to a
    /// cotangent of `self`.
    pub fn map<U, F>(&self, value: U, pullback: F) -> Var<U>
    where
        U: Differentiable,
        F: Fn(&U::TangentVector) -> T::TangentVector + 'static,
    {
        match &self.backward {
            None => Var::constant(value),
            Some(parent) => {
                let parent = Rc::clone(parent);
                Var {
                    value,
                    backward: Some(Rc::new(
                        move |cotangent: &U::TangentVector, gradient: &mut [f64]| {
                            parent(&pullback(cotangent), gradient);
                        },
                    )),
                }
            }
        }
    }

    /// Build a binary node `value = f(self, other)` whose pullback returns the cotangents of
    /// both operands.
    pub fn zip_map<U, V, F>(&self, other: &Var<U>, value: V, pullback: F) -> Var<V>
    where
        U: Differentiable,
        V: Differentiable,
        F: Fn(&V::TangentVector) -> (T::TangentVector, U::TangentVector) + 'static,
    {
        match (&self.backward, &other.backward) {
            (None, None) => Var::constant(value),
            (None, Some(_)) => other.map(value, move |cotangent| pullback(cotangent).1),
            (Some(_), None) => self.map(value, move |cotangent| pullback(cotangent).0),
            (Some(lhs), Some(rhs)) => {
                let (lhs, rhs) = (Rc::clone(lhs), Rc::clone(rhs));
                Var {
                    value,
                    backward: Some(Rc::new(
                        move |cotangent: &V::TangentVector, gradient: &mut [f64]| {
                            let (d_lhs, d_rhs) = pullback(cotangent);
                            lhs(&d_lhs, gradient);
                            rhs(&d_rhs, gradient);
                        },
                    )),
                }
            }
        }
    }
}

impl<T: Differentiable> From<T> for Var<T> {
    fn from(value: T) -> Self {
        Var::constant(value)
    }
}

/// The linear map from output cotangents to parameter gradients, returned by [`pullback`].
pub struct Pullback<'a, P: Parameter, T: Differentiable> {
    at: &'a P,
    output: Var<T>,
}

impl<P: Parameter, T: Differentiable> Pullback<'_, P, T> {
    /// Map an output cotangent to the gradient of the parameter.
    pub fn apply(&self, cotangent: &T::TangentVector) -> P::Gradient {
        let mut flat = vec![0.0; self.at.dimension()];
        self.output.backpropagate(cotangent, &mut flat);
        self.at.gradient_from_flat(&flat)
    }

    /// Same as [`Pullback::apply`] but in the flat layout of the parameter.
    pub fn apply_flat(&self, cotangent: &T::TangentVector) -> Vec<f64> {
        let mut flat = vec![0.0; self.at.dimension()];
        self.output.backpropagate(cotangent, &mut flat);
        flat
    }
}

/// Evaluate a scalar function and its gradient at `at`.
///
/// The gradient has the shape of the parameter: a `Tangent3` for a `Pose2`, a
/// `Vec<Tangent3>` for a `Vec<Pose2>`, and so on.
pub fn value_with_gradient<P, F>(at: &P, f: F) -> (f64, P::Gradient)
where
    P: Parameter,
    F: FnOnce(P::Traced) -> Var<f64>,
{
    let output = f(at.trace(0));
    let mut flat = vec![0.0; at.dimension()];
    output.backpropagate(&1.0, &mut flat);
    (output.value, at.gradient_from_flat(&flat))
}

/// Evaluate `f` at `at` and return its value together with its pullback.
pub fn pullback<P, T, F>(at: &P, f: F) -> (T, Pullback<'_, P, T>)
where
    P: Parameter,
    T: Differentiable,
    F: FnOnce(P::Traced) -> Var<T>,
{
    let output = f(at.trace(0));
    (output.value.clone(), Pullback { at, output })
}

/// Rows of the Jacobian of `f` at `at`: the pullback of every basis vector of the output
/// tangent space, in basis order.
pub fn jacobian<P, T, F>(at: &P, f: F) -> Vec<P::Gradient>
where
    P: Parameter,
    T: Differentiable,
    F: FnOnce(P::Traced) -> Var<T>,
{
    let (_, pb) = pullback(at, f);
    <T::TangentVector as VectorSpace>::standard_basis()
        .iter()
        .map(|e| pb.apply(e))
        .collect()
}

/// The Jacobian of `f` at `at` with its rows stacked into a dense matrix
/// (output dimension × parameter dimension).
pub fn jacobian_matrix<P, T, F>(at: &P, f: F) -> DMatrix<f64>
where
    P: Parameter,
    T: Differentiable,
    F: FnOnce(P::Traced) -> Var<T>,
{
    let (_, pb) = pullback(at, f);
    let basis = <T::TangentVector as VectorSpace>::standard_basis();
    let rows: Vec<f64> = basis.iter().flat_map(|e| pb.apply_flat(e)).collect();
    DMatrix::from_row_slice(basis.len(), at.dimension(), &rows)
}
