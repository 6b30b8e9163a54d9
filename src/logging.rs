//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// One-shot commands: stderr
    Stderr,
    /// The TUI owns the terminal: the configured file, or nowhere
    FileOnly,
}

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("llamasearch={}", config.level)))
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig, target: LogTarget) -> anyhow::Result<()> {
    match (target, &config.file) {
        (LogTarget::Stderr, _) => {
            tracing_subscriber::registry()
                .with(filter(config))
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
        (LogTarget::FileOnly, Some(path)) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(filter(config))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        (LogTarget::FileOnly, None) => {}
    }
    Ok(())
}
