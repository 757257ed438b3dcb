//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::{
    config::{LogConfig, LogFormat},
    error::{Error, Result},
};

/// Build the event filter: `RUST_LOG` when set, else the configured level
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(config));

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| Error::Telemetry(e.to_string()))?;

    tracing::info!(level = %config.level, format = ?config.format, "Tracing initialized");

    Ok(())
}
