use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

pub const LOG_FILE_NAME: &str = "dialog-graph.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub(crate) log_level: String,
    pub(crate) log_dir: Option<PathBuf>,
}

impl LogConfig {
    pub fn new(log_level: impl Into<String>, log_dir: Option<PathBuf>) -> Self {
        Self {
            log_level: log_level.into(),
            log_dir,
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn log_dir(&self) -> Option<&PathBuf> {
        self.log_dir.as_ref()
    }

    pub(crate) fn filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.log_level)
            .with_context(|| format!("invalid log level `{}`", self.log_level))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new("info", None)
    }
}

/// Install the global subscriber.
///
/// Human-readable logs always go to stderr (stdout is reserved for command
/// output). With a `log_dir`, the same events are also written to a daily
/// rolling file without ANSI colours.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = config.log_dir.as_ref().map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_NAME);
        fmt::layer().with_writer(appender).with_ansi(false)
    });

    Registry::default()
        .with(config.filter()?)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("tracing subscriber already installed")?;
    Ok(())
}
