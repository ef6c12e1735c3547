//! Gradient-descent runs on small pose graphs.

use se2_fusion::autodiff::Var;
use se2_fusion::core::PoseGraph;
use se2_fusion::factors::BetweenFactor;
use se2_fusion::manifold::{LieGroup, Pose2, Rot2, Vector2, Vector3};
use se2_fusion::optimizer::{
    GradientDescent, GradientDescentConfig, OptimizationStatus, gradient_descent,
};
use std::f64::consts::PI;

#[test]
fn test_single_pose_descends_onto_target_rotation() {
    let start = Pose2::new(Rot2::from_angle(0.0), Vector2::new(1.0, 0.0));
    let target = Pose2::new(Rot2::from_angle(1.0), Vector2::new(1.0, 1.0));

    let result = gradient_descent(
        start,
        |pose| {
            let error = pose.between(&Var::constant(target));
            let theta = error.rot().theta();
            let t = error.t();
            (theta.square() + t.x().square() + t.y().square()) / 10.0
        },
        1.0,
        100,
    )
    .unwrap();

    assert!((result.theta() - target.theta()).abs() < 1e-5);
}

#[test]
fn test_square_loop_closes() {
    let mut graph = PoseGraph::square_loop();
    assert_eq!(graph.poses().len(), 5);
    assert_eq!(graph.factors().len(), 4);
    let initial_loss = graph.loss();

    let summary = graph
        .optimize(GradientDescentConfig::new().with_max_iterations(400))
        .unwrap();

    assert_eq!(summary.iterations, 400);
    assert_eq!(summary.status, OptimizationStatus::MaxIterationsReached);
    assert!((summary.initial_loss - initial_loss).abs() < 1e-12);
    assert!(summary.final_loss < initial_loss);
    assert!(graph.loop_closure_error(0, 4).unwrap() < 0.1);
}

#[test]
fn test_square_loop_built_by_hand_matches_preset() {
    let preset = PoseGraph::square_loop();
    let mut graph = PoseGraph::new().with_loss_scale(1.0 / 3.0);
    for pose in preset.poses() {
        graph.add_pose(*pose);
    }
    let odometry = [0.0, PI / 2.0, PI / 2.0, PI / 2.0];
    for (i, angle) in odometry.into_iter().enumerate() {
        graph
            .add_factor(
                BetweenFactor::new(i, i + 1, Pose2::from_xy_angle(2.0, 0.0, angle))
                    .with_weights(Vector3::new(0.1, 0.3, 0.3)),
            )
            .unwrap();
    }
    assert_eq!(graph.factors(), preset.factors());
    assert!((graph.loss() - preset.loss()).abs() < 1e-12);
}

#[test]
fn test_optimizer_runs_on_pose_sequence_directly() {
    let graph = PoseGraph::square_loop();
    let solver = GradientDescent::with_config(
        GradientDescentConfig::new().with_max_iterations(50),
    );
    let result = solver
        .minimize(graph.poses().to_vec(), |poses| graph.traced_loss(&poses))
        .unwrap();
    assert_eq!(result.parameters.len(), 5);
    assert!(result.parameters.iter().all(|p| p.is_valid(1e-9)));
    assert!(result.summary.final_loss < result.summary.initial_loss);
}
