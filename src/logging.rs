//! Log subscriber setup for binaries and hosts embedding the store.

use crate::core::paths::env;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    init_logging_with("info");
}

/// `RUST_LOG` wins over `default_directive`. `BEESIGN_LOG_JSON=1` emits JSON lines.
pub fn init_logging_with(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let use_json = std::env::var(env::LOG_JSON).map(|value| value == "1").unwrap_or(false);

    let builder = fmt::Subscriber::builder().with_env_filter(env_filter).with_writer(std::io::stderr);
    let _ = if use_json { builder.json().try_init() } else { builder.pretty().try_init() };
}
