//! Logging.

use std::io::{stderr, IsTerminal};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}

/// Log to stderr, filtered by `RUST_LOG`. Does nothing if a subscriber is set.
pub fn init() {
    let format = fmt::layer()
        .with_ansi(stderr().is_terminal())
        .with_writer(stderr)
        .with_file(false);

    let _ = tracing_subscriber::registry()
        .with(format)
        .with(filter())
        .try_init();
}

/// Log JSON lines to stderr.
pub fn init_json() {
    let format = fmt::layer().json().with_writer(stderr);

    let _ = tracing_subscriber::registry()
        .with(format)
        .with(filter())
        .try_init();
}
