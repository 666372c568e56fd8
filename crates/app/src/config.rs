//! Storefront configuration

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Storefront client configuration
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront client", long_about = None)]
pub struct AppConfig {
    /// Backend REST API base URL
    #[arg(long, env = "STOREFRONT_API_URL", default_value = "http://localhost:8080/api")]
    pub api_url: String,

    /// Timeout for backend requests, in seconds
    #[arg(long, env = "STOREFRONT_HTTP_TIMEOUT_SECONDS", default_value_t = 10u64)]
    pub http_timeout_seconds: u64,

    /// Directory holding the persisted cart and session
    #[arg(long, env = "STOREFRONT_STORAGE_DIR", default_value = ".storefront")]
    pub storage_dir: PathBuf,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Backend request timeout
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}
