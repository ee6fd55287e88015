//! Logging setup for layout passes
//!
//! Every pass emits `tracing` spans and events: one INFO span per layout
//! request, DEBUG spans for the individual phases (layering, ordering,
//! positioning, grouping, anchors) and TRACE events for per-node detail.
//! Nothing is printed until a subscriber is installed, which is what
//! [`init_logging`] does.
//!
//! # Environment Variables
//!
//! - `ARCHLAYOUT_LOG_LEVEL`: trace|debug|info|warn|error|off, or a full
//!   `EnvFilter` directive
//! - `ARCHLAYOUT_LOG_FORMAT`: compact|pretty|json
//! - `RUST_LOG`: standard fallback for the level
//!
//! Phases can be filtered by module path:
//!
//! ```bash
//! RUST_LOG="info,archlayout::layout::layered=trace" my-app
//! ```
//!
//! On `wasm32` the format is ignored and events go to the browser console
//! through `tracing-wasm`.

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

const LEVEL_VAR: &str = "ARCHLAYOUT_LOG_LEVEL";
const FORMAT_VAR: &str = "ARCHLAYOUT_LOG_FORMAT";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single line per event
    #[default]
    Compact,
    /// Multi-line, coloured, with source locations
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// All accepted format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive
    pub filter: String,
    pub format: LogFormat,
}

/// Resolve level and format from explicit arguments, then environment, then defaults.
///
/// Explicit arguments win over `ARCHLAYOUT_LOG_*`, which win over `RUST_LOG`.
/// An unknown format is an error; an unknown level is left for `EnvFilter`
/// to reject at install time.
pub fn resolve_settings(level: Option<&str>, format: Option<&str>) -> Result<LogSettings, String> {
    let filter = level
        .map(str::to_string)
        .or_else(|| std::env::var(LEVEL_VAR).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    let format = match format
        .map(str::to_string)
        .or_else(|| std::env::var(FORMAT_VAR).ok())
    {
        Some(name) => LogFormat::from_str(&name)?,
        None => LogFormat::default(),
    };

    Ok(LogSettings { filter, format })
}

/// Install a global tracing subscriber.
///
/// Fails if the format is unknown or a global subscriber is already set.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = resolve_settings(level, format)?;

    #[cfg(target_arch = "wasm32")]
    {
        let _ = settings;
        tracing_wasm::set_as_global_default_with_config(
            tracing_wasm::WASMLayerConfig::default(),
        );
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));

        match settings.format {
            LogFormat::Compact => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_target(false)
                            .with_level(true)
                            .with_span_events(FmtSpan::NONE),
                    )
                    .try_init()?;
            }
            LogFormat::Pretty => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_target(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_span_events(FmtSpan::CLOSE)
                            .pretty(),
                    )
                    .try_init()?;
            }
            LogFormat::Json => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_target(true)
                            .with_span_events(FmtSpan::CLOSE)
                            .json(),
                    )
                    .try_init()?;
            }
        }

        Ok(())
    }
}

/// Install the default subscriber (info, compact)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::from_str(" Pretty ").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_explicit_arguments_win() {
        let settings = resolve_settings(Some("debug"), Some("json")).unwrap();
        assert_eq!(settings.filter, "debug");
        assert_eq!(settings.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(resolve_settings(Some("info"), Some("yaml")).is_err());
    }
}
