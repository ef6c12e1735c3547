//! Benchmarks for the traced SE(2) primitives and the square-loop pose graph.
//!
//! ```bash
//! cargo bench --bench pose_graph_benchmark
//! ```

use criterion::{Criterion, criterion_group, criterion_main};
use nalgebra::Matrix3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use se2_fusion::autodiff::{Var, value_with_gradient};
use se2_fusion::core::PoseGraph;
use se2_fusion::manifold::{LieGroup, Pose2};
use se2_fusion::optimizer::GradientDescentConfig;
use std::hint::black_box;

fn random_poses(count: usize) -> Vec<Pose2> {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    (0..count)
        .filter_map(|_| Pose2::random_with_covariance(&Matrix3::identity(), &mut rng).ok())
        .collect()
}

fn bench_group_operations(c: &mut Criterion) {
    let poses = random_poses(2);
    let (a, b) = (poses[0], poses[1]);

    c.bench_function("pose2_between", |bencher| {
        bencher.iter(|| black_box(a).between(&black_box(b), None, None))
    });
    c.bench_function("pose2_log", |bencher| {
        bencher.iter(|| black_box(a).log(None))
    });
    c.bench_function("pose2_between_gradient", |bencher| {
        bencher.iter(|| {
            value_with_gradient(&black_box(a), |pose| {
                let error = pose.between(&Var::constant(b));
                error.rot().theta().square() + error.t().norm_squared()
            })
        })
    });
}

fn bench_pose_graph(c: &mut Criterion) {
    let graph = PoseGraph::square_loop();
    c.bench_function("square_loop_gradient", |bencher| {
        bencher.iter(|| black_box(&graph).loss_with_gradient())
    });

    let mut group = c.benchmark_group("square_loop_optimize");
    group.sample_size(20);
    group.bench_function("400_iterations", |bencher| {
        bencher.iter(|| {
            let mut graph = PoseGraph::square_loop();
            graph.optimize(GradientDescentConfig::new().with_max_iterations(400))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_group_operations, bench_pose_graph);
criterion_main!(benches);
