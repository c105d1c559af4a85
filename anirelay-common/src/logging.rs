//! Tracing initialisation

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::{Error, Result};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr, or is appended to the configured log file without ANSI colours.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
        }
        None => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {}", e)))
}
