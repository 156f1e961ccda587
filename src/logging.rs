//! Logging setup
//!
//! Log records go to stderr through a reloadable level filter so the test
//! command can read the ambient threshold and silence logging while the
//! progress output owns the terminal.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Registry};

/// Environment variable overriding the level chosen by flags
pub const LOG_ENV: &str = "SUITECTL_LOG";

/// Handle on the installed subscriber's level
#[derive(Clone)]
pub struct LogHandle {
    filter: reload::Handle<LevelFilter, Registry>,
}

impl LogHandle {
    /// Install the global subscriber at `level` (or `$SUITECTL_LOG`)
    pub fn init(level: LevelFilter) -> Result<Self> {
        let level = match std::env::var(LOG_ENV) {
            Ok(value) => value
                .parse::<LevelFilter>()
                .with_context(|| format!("Invalid {LOG_ENV} value '{value}'"))?,
            Err(_) => level,
        };

        let (filter, handle) = Self::layer(level);
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_target(false),
            )
            .try_init()
            .context("Failed to install the log subscriber")?;

        Ok(handle)
    }

    /// Reloadable level filter for a registry, and the handle driving it
    pub fn layer(level: LevelFilter) -> (reload::Layer<LevelFilter, Registry>, Self) {
        let (filter, handle) = reload::Layer::new(level);
        (filter, Self { filter: handle })
    }

    pub fn threshold(&self) -> LevelFilter {
        self.filter.clone_current().unwrap_or(LevelFilter::OFF)
    }

    /// Turn logging off until the guard is dropped
    pub fn quiet(&self) -> QuietGuard {
        let previous = self.threshold();
        if let Err(e) = self.filter.reload(LevelFilter::OFF) {
            eprintln!("Could not silence logging: {e}");
        }
        QuietGuard {
            handle: self.clone(),
            previous,
        }
    }
}

/// Restores the previous log level on drop
pub struct QuietGuard {
    handle: LogHandle,
    previous: LevelFilter,
}

impl Drop for QuietGuard {
    fn drop(&mut self) {
        let _ = self.handle.filter.reload(self.previous);
    }
}

/// Level picked by the global `-d`/`-q` flags
pub fn level_for_flags(debug: bool, quiet: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else if quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    }
}
