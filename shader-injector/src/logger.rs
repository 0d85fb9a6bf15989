use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::{InjectorError, Result};

fn filter(config: &LogConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|err| InjectorError::Config(format!("log level {:?}: {err}", config.level)))
}

/// Installs the global log subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Does nothing if a subscriber
/// is already installed, so hosts that initialise the injector twice keep the first one.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if let Err(err) = installed {
        debug!("Log subscriber already installed: {err}");
    }

    Ok(())
}
