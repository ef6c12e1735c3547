//! Square-loop pose graph optimization
//!
//! Builds five noisy poses around a 2 m square with four odometry measurements, runs
//! gradient descent and reports whether the loop closes.
//!
//! # Usage
//! ```bash
//! cargo run --release --bin optimize_pose_graph
//! cargo run --release --bin optimize_pose_graph -- -m 1000 --step-size 0.5 -v
//! ```

use clap::Parser;
use se2_fusion::core::PoseGraph;
use se2_fusion::init_logger;
use se2_fusion::optimizer::GradientDescentConfig;
use std::error::Error;
use std::time::Instant;
use tracing::{info, warn};

/// Optimize the square-loop pose graph with gradient descent
#[derive(Parser)]
#[command(name = "optimize_pose_graph")]
#[command(about = "Optimize a closed square-loop pose graph with gradient descent")]
struct Args {
    /// Number of gradient-descent iterations
    #[arg(short, long, default_value = "400")]
    max_iterations: usize,

    /// Step size applied to the gradient
    #[arg(short, long, default_value = "1.0")]
    step_size: f64,

    /// Loop-closure translation gap accepted as closed
    #[arg(long, default_value = "0.1")]
    tolerance: f64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    init_logger();

    let mut graph = PoseGraph::square_loop();
    let last = graph.poses().len() - 1;
    info!(
        "Initial loss: {:.6e}, loop gap: {:.4}",
        graph.loss(),
        graph.loop_closure_error(0, last)?
    );

    let config = GradientDescentConfig::new()
        .with_step_size(args.step_size)
        .with_max_iterations(args.max_iterations)
        .with_verbose(args.verbose);

    let start = Instant::now();
    let summary = graph.optimize(config)?;
    let elapsed = start.elapsed();

    if args.verbose {
        info!("\n{summary}");
    }

    info!("Optimized poses:");
    for (index, pose) in graph.poses().iter().enumerate() {
        info!("  x{index}: {pose}");
    }

    let gap = graph.loop_closure_error(0, last)?;
    info!(
        "Final loss: {:.6e}, loop gap: {:.4}, time: {:?}",
        summary.final_loss, gap, elapsed
    );

    if gap < args.tolerance {
        info!("Loop closed");
    } else {
        warn!("Loop gap {gap:.4} exceeds tolerance {}", args.tolerance);
    }

    Ok(())
}
