//! Process configuration, read once at startup.

use apidoc_http_tools::fetch::{DEFAULT_FETCH_TIMEOUT, Fetcher};
use apidoc_http_tools::safety::OutboundHttpSafety;
use clap::{Parser, ValueEnum};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Command-line flags, each with an environment fallback.
#[derive(Debug, Clone, Parser)]
#[command(name = "apidoc-mcp", version, about)]
pub struct Cli {
    /// Per-request budget for fetching and resolving a document, in milliseconds.
    #[arg(
        long,
        env = "APIDOC_FETCH_TIMEOUT_MS",
        default_value_t = duration_ms(DEFAULT_FETCH_TIMEOUT),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fetch_timeout_ms: u64,

    /// Reject documents whose body exceeds this many bytes.
    #[arg(long, env = "APIDOC_MAX_RESPONSE_BYTES")]
    pub max_response_bytes: Option<usize>,

    /// Tracing filter directive (e.g. `info`, `apidoc_openapi_tools=debug`).
    #[arg(long, env = "APIDOC_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "APIDOC_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Immutable settings shared by every tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub fetch_timeout: Duration,
    pub max_response_bytes: Option<usize>,
    pub version: String,
}

impl ServerConfig {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            fetch_timeout: Duration::from_millis(cli.fetch_timeout_ms),
            max_response_bytes: cli.max_response_bytes,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Fresh fetcher for one invocation.
    #[must_use]
    pub fn fetcher(&self) -> Fetcher {
        Fetcher::new(
            self.fetch_timeout,
            OutboundHttpSafety::with_max_response_bytes(self.max_response_bytes),
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_response_bytes: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
