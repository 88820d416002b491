//! MerkleDrop Logging
//!
//! Shared `tracing` subscriber setup. `RUST_LOG` always wins over the level
//! passed in.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CRATES: &[&str] = &[
    "merkledrop",
    "merkledrop_core",
    "merkledrop_prover",
    "merkledrop_settings",
];

/// Default verbosity when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// `--verbose` maps to debug, otherwise info.
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Self::Debug
        } else {
            Self::Info
        }
    }

    fn directive(&self) -> String {
        // Dependencies stay at warn unless RUST_LOG says otherwise.
        CRATES.iter().fold("warn".to_string(), |acc, krate| {
            format!("{},{}={}", acc, krate, self.as_str())
        })
    }
}

fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()))
}

/// Install the global subscriber. Errors if one is already set.
pub fn try_init(level: LogLevel) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(build_filter(level))
        .try_init()
}

/// Install the global subscriber, ignoring a second initialisation.
pub fn init(level: LogLevel) {
    let _ = try_init(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_strings() {
        assert_eq!(LogLevel::Error.as_str(), "error");
        assert_eq!(LogLevel::Trace.as_str(), "trace");
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_from_verbose() {
        assert_eq!(LogLevel::from_verbose(true), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbose(false), LogLevel::Info);
    }

    #[test]
    fn test_directive_parses() {
        let directive = LogLevel::Debug.directive();
        assert!(directive.contains("merkledrop_prover=debug"));
        assert!(EnvFilter::try_new(directive).is_ok());
    }

    #[test]
    fn test_double_init_is_harmless() {
        init(LogLevel::Warn);
        assert!(try_init(LogLevel::Warn).is_err());
    }
}
