//! Logging setup shared by the se2-fusion binaries and benches
//!
//! Library code only emits `tracing` events; installing a subscriber is left to executables.

use tracing::Level;

/// Initialize the tracing subscriber at INFO
///
/// The level can be overridden through `RUST_LOG`:
/// ```bash
/// RUST_LOG=debug cargo run --bin optimize_pose_graph
/// RUST_LOG=se2_fusion::optimizer=trace cargo run --bin optimize_pose_graph
/// ```
///
/// # Example
/// ```no_run
/// use se2_fusion::init_logger;
///
/// init_logger();
/// tracing::info!("Application started");
/// ```
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Initialize the tracing subscriber with a custom default level
///
/// Calling it twice is harmless: the second installation is ignored.
///
/// # Example
/// ```no_run
/// use se2_fusion::init_logger_with_level;
/// use tracing::Level;
///
/// init_logger_with_level(Level::DEBUG);
/// tracing::debug!("Debug logging enabled");
/// ```
pub fn init_logger_with_level(default_level: Level) {
    use tracing_subscriber::fmt::time::SystemTime;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_timer(SystemTime)
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
}
