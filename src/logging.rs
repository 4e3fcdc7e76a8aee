//! Subscriber setup for host applications.
//!
//! The library itself only emits `tracing` events; nothing is printed until
//! the embedding editor calls [`init`].
//!
//! ## Environment Variables
//!
//! - `RIVET_LOG` or `RUST_LOG`: filter directives (e.g. `rivet_host=debug,warn`)
//! - `RIVET_LOG_FORMAT`: `pretty` (default) or `compact`

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "rivet_host=info,warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human-readable.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
}

impl LogFormat {
    /// Case-insensitive; anything unrecognised is `Pretty`.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("compact") {
            Self::Compact
        } else {
            Self::Pretty
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub format: LogFormat,
    /// Include file and line in each event.
    pub with_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_owned(),
            format: LogFormat::Pretty,
            with_file: false,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let filter = var("RIVET_LOG")
            .or_else(|| var("RUST_LOG"))
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_owned());
        let format = var("RIVET_LOG_FORMAT")
            .map(|f| LogFormat::parse(&f))
            .unwrap_or_default();
        Self {
            filter,
            format,
            ..Self::default()
        }
    }
}

/// Install the global subscriber described by `config`.  Later calls, or a
/// subscriber installed by someone else, win; this never panics.
pub fn init_with(config: &LogConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(config.with_file)
                    .with_line_number(config.with_file),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_file(config.with_file)
                    .with_line_number(config.with_file),
            )
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}

/// `init_with(&LogConfig::from_env())`.
pub fn init() {
    init_with(&LogConfig::from_env());
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> LogConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        LogConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn format_parsing() {
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("COMPACT"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("json"), LogFormat::Pretty);
    }

    #[test]
    fn defaults_without_env() {
        assert_eq!(config(&[]), LogConfig::default());
        assert_eq!(config(&[]).filter, "rivet_host=info,warn");
    }

    #[test]
    fn rivet_log_beats_rust_log() {
        let cfg = config(&[("RIVET_LOG", "rivet_host=debug"), ("RUST_LOG", "trace")]);
        assert_eq!(cfg.filter, "rivet_host=debug");
        assert_eq!(config(&[("RUST_LOG", "trace")]).filter, "trace");
    }

    #[test]
    fn format_from_env() {
        let cfg = config(&[("RIVET_LOG_FORMAT", "compact")]);
        assert_eq!(cfg.format, LogFormat::Compact);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_with(&LogConfig {
            filter: "not a [valid filter".into(),
            ..LogConfig::default()
        });
        init();
        tracing::info!("still alive");
    }
}
