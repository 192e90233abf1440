//! `apidoc-mcp` entry point: an MCP server on stdio.
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "apidoc": { "command": "apidoc-mcp" }
//!   }
//! }
//! ```

use anyhow::Result;
use apidoc_mcp::config::{Cli, LogFormat, ServerConfig};
use apidoc_mcp::service::ApiDocService;
use clap::Parser;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let config = Arc::new(ServerConfig::from_cli(&cli));
    tracing::info!(
        version = %config.version,
        fetch_timeout_ms = cli.fetch_timeout_ms,
        max_response_bytes = ?config.max_response_bytes,
        "starting apidoc-mcp"
    );

    let service = ApiDocService::new(config)?.serve(stdio()).await?;
    service.waiting().await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

// Logs go to stderr; stdout carries the protocol.
fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_new(&cli.log_level)?;
    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }
    Ok(())
}
