//! Log subscriber setup for the binary.

use crate::config::{CliConfig, ColorChoice};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the filter: `RUST_LOG` when set, otherwise the CLI verbosity.
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.filter_directive()))
}

/// Install the global subscriber, writing to stderr.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging(config: &CliConfig) {
    let ansi = match config.color {
        ColorChoice::Never => false,
        other => other.should_color(),
    };
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(config.verbosity.is_verbose());

    let _ = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(stderr_layer)
        .try_init();
}
