//! Relative-pose measurement between two poses.

use crate::autodiff::Var;
use crate::manifold::{LieGroup, Pose2, Vector3};

/// Between factor for SE(2) poses.
///
/// For poses `x_i`, `x_j` and measurement `m` the residual pose is
///
/// ```text
/// ŷ = between(between(x_j, x_i), m) = (x_i⁻¹ ∘ x_j) ∘ m
/// ```
///
/// and the error is the weighted sum of its squared components
/// `w_θ θ(ŷ)² + w_x t_x(ŷ)² + w_y t_y(ŷ)²`. The error vanishes when `x_i⁻¹ ∘ x_j = m⁻¹`.
///
/// # Example
///
/// ```
/// use se2_fusion::factors::BetweenFactor;
/// use se2_fusion::manifold::{LieGroup, Pose2};
///
/// let factor = BetweenFactor::new(0, 1, Pose2::from_xy_angle(2.0, 0.0, 0.0));
/// let x0 = Pose2::identity();
/// let x1 = Pose2::from_xy_angle(-2.0, 0.0, 0.0);
/// assert!(factor.evaluate(&x0, &x1) < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BetweenFactor {
    /// Index of the first pose
    pub i: usize,
    /// Index of the second pose
    pub j: usize,
    /// Measured relative pose
    pub measurement: Pose2,
    /// Weights of the squared `(θ, t_x, t_y)` residual components
    pub weights: Vector3,
}

impl BetweenFactor {
    /// Default component weights `(θ, t_x, t_y)`.
    pub const DEFAULT_WEIGHTS: [f64; 3] = [0.1, 0.3, 0.3];

    /// Create a factor with the default weights.
    pub fn new(i: usize, j: usize, measurement: Pose2) -> Self {
        Self {
            i,
            j,
            measurement,
            weights: Vector3::from(Self::DEFAULT_WEIGHTS),
        }
    }

    /// Replace the component weights.
    pub fn with_weights(mut self, weights: Vector3) -> Self {
        self.weights = weights;
        self
    }

    /// Indices `[i, j]` of the poses this factor reads.
    pub fn variables(&self) -> [usize; 2] {
        [self.i, self.j]
    }

    /// Traced error against the whole pose sequence. Both indices must be in range.
    pub fn error(&self, poses: &[Var<Pose2>]) -> Var<f64> {
        self.weighted_error(&self.residual(&poses[self.i], &poses[self.j]))
    }

    /// Residual pose `ŷ` for two traced poses.
    pub fn residual(&self, x_i: &Var<Pose2>, x_j: &Var<Pose2>) -> Var<Pose2> {
        x_j.between(x_i).between(&Var::constant(self.measurement))
    }

    /// Weighted squared error of a traced residual pose.
    pub fn weighted_error(&self, residual: &Var<Pose2>) -> Var<f64> {
        let theta = residual.rot().theta();
        let t = residual.t();
        self.weights[0] * theta.square()
            + self.weights[1] * t.x().square()
            + self.weights[2] * t.y().square()
    }

    /// Untraced error for plain poses.
    pub fn evaluate(&self, x_i: &Pose2, x_j: &Pose2) -> f64 {
        let residual = x_j
            .between(x_i, None, None)
            .between(&self.measurement, None, None);
        self.weights[0] * residual.theta().powi(2)
            + self.weights[1] * residual.x().powi(2)
            + self.weights[2] * residual.y().powi(2)
    }
}
