//! Internal diagnostics. User-facing output goes through `console`; this only
//! configures the `tracing` subscriber, which writes to stderr so it never mixes
//! with streamed logs on stdout.
//!
//! Priority: RUST_LOG > `--debug` > "warn".

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";

pub fn init(debug_flag: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(DEFAULT_LEVEL)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "logging initialised");
}
