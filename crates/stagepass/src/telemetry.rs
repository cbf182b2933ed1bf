//! Tracing bootstrap for the registration desk.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies across
//! the board. Development keeps targets and ansi colors for local reading,
//! every other environment logs compact plain lines for collection.

use crate::config::{AppEnvironment, TelemetryConfig};
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { value: String, source: ParseError },
    Init(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { value, .. } => {
                write!(f, "log filter '{}' does not parse", value)
            }
            TelemetryError::Init(err) => write!(f, "tracing subscriber rejected: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::Init(err) => Some(&**err),
        }
    }
}

/// Install the global subscriber once at startup.
pub fn init(environment: AppEnvironment, config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(&config.log_level)?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if environment == AppEnvironment::Development {
        builder.with_target(true).with_ansi(true).try_init()
    } else {
        builder
            .with_target(false)
            .with_ansi(false)
            .compact()
            .try_init()
    };
    result.map_err(TelemetryError::Init)
}

fn parse_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(level).map_err(|source| TelemetryError::InvalidFilter {
        value: level.to_string(),
        source,
    })
}
