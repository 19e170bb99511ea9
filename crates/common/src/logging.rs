//! Tracing subscriber setup for Wakesight binaries.
//!
//! Diagnostics always go to stderr: stdout is reserved for motion samples,
//! which `--json` consumers parse line by line.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Level used when the configured filter does not parse.
const FALLBACK_LEVEL: &str = "info";

/// Install the global subscriber. Later calls are ignored.
///
/// A non-empty `RUST_LOG` overrides `config.level`.
pub fn init_logging(config: &LoggingConfig) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = filter_for(config, rust_log.as_deref());
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(
            builder
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Pick the filter directives: the environment first, then the config file.
fn filter_for(config: &LoggingConfig, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(&config.level).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_LEVEL))
}
