//! Structured logging foundation for ab-core.
//!
//! Dual-mode logging: human-readable console output for interactive use,
//! machine-parseable JSONL for automation. stdout stays reserved for
//! command payloads; all log output goes to stderr. The `AB_LOG`
//! environment variable overrides the CLI-derived filter with a full
//! tracing directive string.

use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" | "structured" | "machine" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {s}")),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}

/// Logging configuration assembled from CLI flags.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    pub no_color: bool,
}

impl LogConfig {
    /// Derive a config from the standard verbosity flags.
    pub fn from_flags(verbose: u8, quiet: bool, format: LogFormat, no_color: bool) -> Self {
        let level = if quiet {
            LogLevel::Error
        } else {
            match verbose {
                0 => LogLevel::Info,
                1 => LogLevel::Debug,
                _ => LogLevel::Trace,
            }
        };
        LogConfig {
            format,
            level,
            no_color,
        }
    }
}

/// Initialize the global tracing subscriber. Call once, at startup.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_env("AB_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    match config.format {
        LogFormat::Human => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(!config.no_color)
            .init(),
        LogFormat::Jsonl => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init(),
    }
}
