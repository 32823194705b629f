//! Tracing subscriber setup.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the configured
//! level. It sits behind a reload layer so the shell's `debug` command can
//! raise or lower verbosity without restarting.

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use crate::config::Config;

/// Lets the shell switch between the configured level and `debug`.
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    base_level: String,
}

impl LogHandle {
    /// Switches debug output on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscriber has been dropped.
    pub fn set_debug(&self, enabled: bool) -> Result<()> {
        let level = if enabled { "debug" } else { self.base_level.as_str() };
        self.handle
            .reload(build_filter(level)?)
            .context("Failed to reload log filter")
    }
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env().add_directive(
        level
            .parse()
            .with_context(|| format!("Invalid log level: {}", level))?,
    ))
}

/// Installs the global subscriber: plain text, or JSON lines when
/// `LOG_FORMAT=json`.
///
/// # Errors
///
/// Returns an error if the level does not parse or a subscriber is
/// already installed.
pub fn init(config: &Config, debug: bool) -> Result<LogHandle> {
    let level = if debug { "debug" } else { config.log_level.as_str() };
    let (filter, handle) = reload::Layer::new(build_filter(level)?);
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to install tracing subscriber")?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    Ok(LogHandle {
        handle,
        base_level: config.log_level.clone(),
    })
}
