//! Tracing initialisation for the `sdsim` binary and the Python module.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Filter directives read before `RUST_LOG`, e.g. `stockflow_core=debug`.
pub const LOG_ENV: &str = "SDSIM_LOG";

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Installs the global subscriber writing to stderr, as newline-delimited
/// JSON when `json` is set. `SDSIM_LOG`, then `RUST_LOG`, override `level`.
///
/// Returns `false` when a subscriber was already installed; the first one
/// stays in place.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let output = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let output: Box<dyn Layer<Registry> + Send + Sync> = if json { output.json().boxed() } else { output.boxed() };

    tracing_subscriber::registry()
        .with(output)
        .with(env_filter(level))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_subscriber_is_installed() {
        init_tracing(false, Level::WARN);
        assert!(!init_tracing(true, Level::DEBUG));
        tracing::info!(event = "telemetry.test");
    }
}
