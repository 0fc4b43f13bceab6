//! Logging for layout calls.
//!
//! The engine emits `tracing` events: one `mindmap_layout` info span per call,
//! debug events per pass, warnings for repaired input (cycles, shared
//! children, zero-size nodes) and a trace event per placed node. This module
//! only installs a subscriber; hosts that bring their own can skip it.
//!
//! # Usage
//!
//! ```rust,no_run
//! use mindmap_layout_wasm::logging::init_logging;
//!
//! // Level and format from the environment, or info/compact
//! init_logging(None, None).ok();
//!
//! // Explicit level and format
//! init_logging(Some("debug"), Some("pretty")).ok();
//! ```
//!
//! # Environment Variables
//!
//! Native builds read:
//! - `MINDMAP_LOG_LEVEL`: log level or filter directive (trace|debug|info|warn|error|off)
//! - `MINDMAP_LOG_FORMAT`: compact|pretty|json
//! - `RUST_LOG`: standard `EnvFilter` directives, used when the level is unset
//!
//! In the browser, events go to the console through `tracing-wasm` and the
//! format argument is ignored.

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Install a global tracing subscriber.
///
/// # Arguments
///
/// * `level` - Log level or filter directive. Falls back to
///   `MINDMAP_LOG_LEVEL`, then `RUST_LOG`, then `info`.
/// * `format` - compact|pretty|json. Falls back to `MINDMAP_LOG_FORMAT`,
///   then `compact`.
///
/// # Errors
///
/// Returns an error for an unknown format, or when a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        use tracing_wasm::WASMLayerConfigBuilder;

        static INIT: Once = Once::new();

        if let Some(format) = format {
            LogFormat::from_str(format).map_err(|e| format!("Invalid log format: {}", e))?;
        }
        let max_level = level
            .and_then(|s| tracing::Level::from_str(s).ok())
            .unwrap_or(tracing::Level::INFO);

        // The console layer can only be installed once per page
        INIT.call_once(|| {
            let config = WASMLayerConfigBuilder::new()
                .set_max_level(max_level)
                .build();
            tracing_wasm::set_as_global_default_with_config(config);
        });

        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let log_level = level
            .map(|s| s.to_string())
            .or_else(|| std::env::var("MINDMAP_LOG_LEVEL").ok())
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| "info".to_string());

        let log_format = format
            .map(|s| s.to_string())
            .or_else(|| std::env::var("MINDMAP_LOG_FORMAT").ok())
            .unwrap_or_else(|| "compact".to_string());

        let format = LogFormat::from_str(&log_format)
            .map_err(|e| format!("Invalid log format: {}", e))?;

        let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Compact => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_target(false)
                            .with_level(true)
                            .with_span_events(FmtSpan::NONE)
                            .compact(),
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
