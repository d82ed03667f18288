//! Tracing setup for the claims engine. `RUST_LOG` wins when set; otherwise
//! the configured level is applied to this crate tree while the HTTP stack
//! underneath is held at `warn` so per-claim scrub logging stays readable.

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    Filter { directives: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directives, .. } => {
                write!(f, "invalid log filter directives '{directives}'")
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter_from_level(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

/// Builds the fallback filter for a configured level. Scrub and liability
/// spans follow the configured level; hyper and tower are pinned to `warn`
/// so high-volume simulations do not drown rule reasoning in socket noise.
fn filter_from_level(level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = format!("{level},hyper=warn,tower=warn");
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::Filter {
        directives,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_produces_a_filter() {
        assert!(filter_from_level("debug").is_ok());
        assert!(filter_from_level("claims_engine=trace").is_ok());
    }

    #[test]
    fn malformed_level_is_reported_with_its_directives() {
        let err = filter_from_level("not a level").expect_err("directives are invalid");
        match err {
            TelemetryError::Filter { directives, .. } => {
                assert!(directives.starts_with("not a level,"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
