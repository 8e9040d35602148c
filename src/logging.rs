use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG` wins over `config.level`. Fails if a subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<(), InitError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.format.as_str() {
        "pretty" => builder.pretty().try_init(),
        _ => builder.json().try_init(),
    }
}
