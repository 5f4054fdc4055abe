use anyhow::Result;
use tokio::runtime::Runtime;

use office_stats_mcp::config::Config;
use office_stats_mcp::{logging, mcp_handler};

fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init(&config)?;

    log::info!("Starting Office Stats MCP server (locale: {:?})", config.locale);

    // Create a Tokio runtime for async operations
    let rt = Runtime::new()?;

    // Run the RMCP server in the Tokio runtime
    rt.block_on(async { mcp_handler::start_server(config.locale).await })?;

    Ok(())
}
