//! Things a function can be differentiated with respect to.
//!
//! A [`Parameter`] knows how to turn itself into traced leaves laid out in a flat gradient
//! buffer, and how to read its gradient back out of that buffer. Single manifold values,
//! sequences of them and pairs are supported; nesting composes.

use crate::autodiff::Var;
use crate::manifold::{
    Differentiable, Pose2, Rot2, Tangent3, Vector1, Vector2, Vector3, VectorSpace,
};

/// A differentiable parameter of a traced function.
pub trait Parameter {
    /// The traced form handed to the function being differentiated.
    type Traced;

    /// Gradient with the same shape as the parameter.
    type Gradient: Clone + std::fmt::Debug;

    /// Total tangent dimension (length of the flat gradient).
    fn dimension(&self) -> usize;

    /// Wrap every leaf as a [`Var`] whose cotangent lands at `offset` onwards.
    fn trace(&self, offset: usize) -> Self::Traced;

    /// Read a gradient of this parameter's shape out of `flat`.
    fn gradient_from_flat(&self, flat: &[f64]) -> Self::Gradient;

    /// Move along `scale · direction`, slot by slot.
    ///
    /// # Panics
    ///
    /// When `direction` does not have the shape of `self`.
    fn move_along_scaled(&mut self, direction: &Self::Gradient, scale: f64);

    /// Euclidean norm of a gradient of this parameter.
    fn gradient_norm(gradient: &Self::Gradient) -> f64;
}

macro_rules! impl_parameter_for_differentiable {
    ($($type:ty),*) => {
        $(
            impl Parameter for $type {
                type Traced = Var<$type>;
                type Gradient = <$type as Differentiable>::TangentVector;

                fn dimension(&self) -> usize {
                    <Self::Gradient as VectorSpace>::DIMENSION
                }

                fn trace(&self, offset: usize) -> Var<$type> {
                    Var::leaf(self.clone(), offset)
                }

                fn gradient_from_flat(&self, flat: &[f64]) -> Self::Gradient {
                    <Self::Gradient as VectorSpace>::from_slice(flat)
                }

                fn move_along_scaled(&mut self, direction: &Self::Gradient, scale: f64) {
                    self.move_along(&(*direction * scale));
                }

                fn gradient_norm(gradient: &Self::Gradient) -> f64 {
                    VectorSpace::norm(gradient)
                }
            }
        )*
    };
}

impl_parameter_for_differentiable!(f64, Vector1, Vector2, Vector3, Rot2, Pose2);

impl<P: Parameter> Parameter for Vec<P> {
    type Traced = Vec<P::Traced>;
    type Gradient = Vec<P::Gradient>;

    fn dimension(&self) -> usize {
        self.iter().map(Parameter::dimension).sum()
    }

    fn trace(&self, offset: usize) -> Self::Traced {
        let mut offset = offset;
        self.iter()
            .map(|item| {
                let traced = item.trace(offset);
                offset += item.dimension();
                traced
            })
            .collect()
    }

    fn gradient_from_flat(&self, flat: &[f64]) -> Self::Gradient {
        let mut offset = 0;
        self.iter()
            .map(|item| {
                let end = offset + item.dimension();
                let gradient = item.gradient_from_flat(&flat[offset..end]);
                offset = end;
                gradient
            })
            .collect()
    }

    fn move_along_scaled(&mut self, direction: &Self::Gradient, scale: f64) {
        assert_eq!(
            self.len(),
            direction.len(),
            "gradient has {} slots but the parameter has {}",
            direction.len(),
            self.len()
        );
        for (item, slot) in self.iter_mut().zip(direction) {
            item.move_along_scaled(slot, scale);
        }
    }

    fn gradient_norm(gradient: &Self::Gradient) -> f64 {
        gradient
            .iter()
            .map(|slot| {
                let norm = P::gradient_norm(slot);
                norm * norm
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl<A: Parameter, B: Parameter> Parameter for (A, B) {
    type Traced = (A::Traced, B::Traced);
    type Gradient = (A::Gradient, B::Gradient);

    fn dimension(&self) -> usize {
        self.0.dimension() + self.1.dimension()
    }

    fn trace(&self, offset: usize) -> Self::Traced {
        (
            self.0.trace(offset),
            self.1.trace(offset + self.0.dimension()),
        )
    }

    fn gradient_from_flat(&self, flat: &[f64]) -> Self::Gradient {
        let split = self.0.dimension();
        (
            self.0.gradient_from_flat(&flat[..split]),
            self.1.gradient_from_flat(&flat[split..]),
        )
    }

    fn move_along_scaled(&mut self, direction: &Self::Gradient, scale: f64) {
        self.0.move_along_scaled(&direction.0, scale);
        self.1.move_along_scaled(&direction.1, scale);
    }

    fn gradient_norm(gradient: &Self::Gradient) -> f64 {
        A::gradient_norm(&gradient.0).hypot(B::gradient_norm(&gradient.1))
    }
}

/// Shorthand for the gradient of a pose sequence.
pub type PoseGradient = Vec<Tangent3>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::LieGroup;

    #[test]
    fn test_sequence_layout() {
        let poses = vec![Pose2::identity(), Pose2::from_xy_angle(1.0, 0.0, 0.0)];
        assert_eq!(poses.dimension(), 6);
        let flat: Vec<f64> = (0..6).map(f64::from).collect();
        let gradient: PoseGradient = poses.gradient_from_flat(&flat);
        assert_eq!(gradient[0], Tangent3::new(0.0, 1.0, 2.0));
        assert_eq!(gradient[1], Tangent3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_pair_layout() {
        let pair = (Rot2::from_angle(0.1), Vector2::new(1.0, 2.0));
        assert_eq!(pair.dimension(), 3);
        let (d_rot, d_v) = pair.gradient_from_flat(&[7.0, 8.0, 9.0]);
        assert_eq!(d_rot, Vector1::new(7.0));
        assert_eq!(d_v, Vector2::new(8.0, 9.0));
    }

    #[test]
    fn test_move_along_scaled_retracts_each_slot() {
        let mut poses = vec![Pose2::identity(), Pose2::from_xy_angle(1.0, 2.0, 0.5)];
        let direction = vec![Tangent3::new(0.1, 0.2, 0.3), Tangent3::new(-0.1, 0.0, 1.0)];
        let expected: Vec<Pose2> = poses
            .iter()
            .zip(&direction)
            .map(|(p, d)| p.retract(&(d * -2.0)))
            .collect();
        poses.move_along_scaled(&direction, -2.0);
        assert_eq!(poses, expected);
    }

    #[test]
    #[should_panic(expected = "gradient has 1 slots but the parameter has 2")]
    fn test_shape_mismatch_panics() {
        let mut poses = vec![Pose2::identity(), Pose2::identity()];
        poses.move_along_scaled(&vec![Tangent3::zeros()], 1.0);
    }

    #[test]
    fn test_gradient_norm_of_sequence() {
        let gradient = vec![Tangent3::new(3.0, 0.0, 0.0), Tangent3::new(0.0, 4.0, 0.0)];
        assert!((Vec::<Pose2>::gradient_norm(&gradient) - 5.0).abs() < 1e-12);
    }
}
