pub mod atomic_fs;
pub mod collector;
pub mod error;
pub mod executor;
pub mod exif;
pub mod jpeg;
pub mod model;
pub mod ops;
pub mod path;
pub mod planner;
pub mod progress;
pub mod settings;
pub mod state;
pub mod template;

/// Initialize structured logging. Call once at process start; safe to call
/// more than once (subsequent calls are no-ops).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
