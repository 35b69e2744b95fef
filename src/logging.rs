use std::io;

use thiserror::Error;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter `{directive}`: {source}")]
    Filter {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("could not install the tracing subscriber: {0}")]
    Install(String),
}

/// `RUST_LOG` takes precedence over `default_directive` when set.
pub fn build_filter(default_directive: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_directive).map_err(|source| LoggingError::Filter {
        directive: default_directive.to_string(),
        source,
    })
}

/// Installs the global subscriber. Output goes to stderr so it never mixes
/// with the quiz on stdout.
pub fn initialize_tracing(default_directive: &str) -> Result<(), LoggingError> {
    let filter = build_filter(default_directive)?;
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_directive_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(matches!(
            build_filter("artikel_quiz=loud"),
            Err(LoggingError::Filter { .. })
        ));
        assert!(build_filter("warn,artikel_quiz=debug").is_ok());
    }
}
