//! Pose graph: poses plus relative-pose factors, optimized by gradient descent.

use crate::autodiff::parameter::PoseGradient;
use crate::autodiff::{Var, value_with_gradient};
use crate::error::{FusionError, FusionResult};
use crate::factors::BetweenFactor;
use crate::manifold::{LieGroup, Pose2};
use crate::optimizer::{GradientDescent, GradientDescentConfig, OptimizationSummary};
use std::f64::consts::PI;
use tracing::{debug, info};

/// A planar pose graph.
///
/// The loss is `loss_scale · Σ factor errors`.
#[derive(Debug, Clone)]
pub struct PoseGraph {
    poses: Vec<Pose2>,
    factors: Vec<BetweenFactor>,
    loss_scale: f64,
}

impl Default for PoseGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseGraph {
    /// Empty graph with unit loss scale.
    pub fn new() -> Self {
        Self {
            poses: Vec::new(),
            factors: Vec::new(),
            loss_scale: 1.0,
        }
    }

    /// Scale applied to the summed factor errors.
    pub fn with_loss_scale(mut self, loss_scale: f64) -> Self {
        self.loss_scale = loss_scale;
        self
    }

    /// Five poses on a noisy square with four odometry edges of length 2 turning by π/2.
    ///
    /// Starting estimates are perturbed; after optimization the last pose lands on the first.
    pub fn square_loop() -> Self {
        let mut graph = Self::new().with_loss_scale(1.0 / 3.0);
        for pose in [
            Pose2::from_xy_angle(0.5, 0.0, 0.2),
            Pose2::from_xy_angle(2.3, 0.1, -0.2),
            Pose2::from_xy_angle(4.1, 0.1, PI / 2.0),
            Pose2::from_xy_angle(4.0, 2.0, PI),
            Pose2::from_xy_angle(2.1, 2.1, -PI / 2.0),
        ] {
            graph.add_pose(pose);
        }
        let measurements = [
            Pose2::from_xy_angle(2.0, 0.0, 0.0),
            Pose2::from_xy_angle(2.0, 0.0, PI / 2.0),
            Pose2::from_xy_angle(2.0, 0.0, PI / 2.0),
            Pose2::from_xy_angle(2.0, 0.0, PI / 2.0),
        ];
        for (i, measurement) in measurements.into_iter().enumerate() {
            graph.factors.push(BetweenFactor::new(i, i + 1, measurement));
        }
        graph
    }

    /// Append a pose and return its index.
    pub fn add_pose(&mut self, pose: Pose2) -> usize {
        self.poses.push(pose);
        self.poses.len() - 1
    }

    /// Append a factor; its pose indices must already exist.
    pub fn add_factor(&mut self, factor: BetweenFactor) -> FusionResult<()> {
        if let Some(missing) = factor
            .variables()
            .into_iter()
            .find(|&index| index >= self.poses.len())
        {
            return Err(FusionError::InvalidInput(format!(
                "factor references pose {missing} but the graph has {} poses",
                self.poses.len()
            )));
        }
        debug!(i = factor.i, j = factor.j, "added between factor");
        self.factors.push(factor);
        Ok(())
    }

    /// Current pose estimates.
    pub fn poses(&self) -> &[Pose2] {
        &self.poses
    }

    /// Factors in insertion order.
    pub fn factors(&self) -> &[BetweenFactor] {
        &self.factors
    }

    /// Loss scale.
    pub fn loss_scale(&self) -> f64 {
        self.loss_scale
    }

    /// Traced loss over `poses`, laid out like [`PoseGraph::poses`].
    pub fn traced_loss(&self, poses: &[Var<Pose2>]) -> Var<f64> {
        let total: Var<f64> = self.factors.iter().map(|factor| factor.error(poses)).sum();
        total * self.loss_scale
    }

    /// Loss at the current estimates.
    pub fn loss(&self) -> f64 {
        self.loss_scale
            * self
                .factors
                .iter()
                .map(|f| f.evaluate(&self.poses[f.i], &self.poses[f.j]))
                .sum::<f64>()
    }

    /// Loss and its gradient (one tangent per pose) at the current estimates.
    pub fn loss_with_gradient(&self) -> (f64, PoseGradient) {
        value_with_gradient(&self.poses, |poses| self.traced_loss(&poses))
    }

    /// Run gradient descent and replace the estimates with the result.
    pub fn optimize(&mut self, config: GradientDescentConfig) -> FusionResult<OptimizationSummary> {
        if self.poses.is_empty() {
            return Err(FusionError::InvalidInput(
                "cannot optimize an empty pose graph".to_string(),
            ));
        }
        info!(
            poses = self.poses.len(),
            factors = self.factors.len(),
            step_size = config.step_size,
            iterations = config.max_iterations,
            "optimizing pose graph"
        );
        let solver = GradientDescent::with_config(config);
        let result = solver.minimize(self.poses.clone(), |poses| self.traced_loss(&poses))?;
        self.poses = result.parameters;
        info!(
            initial_loss = result.summary.initial_loss,
            final_loss = result.summary.final_loss,
            "pose graph optimized"
        );
        Ok(result.summary)
    }

    /// Translation gap `‖between(x[last], x[first]).t‖`; zero when the loop closes.
    pub fn loop_closure_error(&self, first: usize, last: usize) -> FusionResult<f64> {
        let (Some(a), Some(b)) = (self.poses.get(first), self.poses.get(last)) else {
            return Err(FusionError::InvalidInput(format!(
                "pose index out of range: {first} or {last} with {} poses",
                self.poses.len()
            )));
        };
        Ok(b.between(a, None, None).t().norm())
    }
}
