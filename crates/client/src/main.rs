//! Console demo: several players sharing one in-memory table.
mod command;
mod config;
mod logging;
mod render;
mod table;

use anyhow::Result;
use config::DemoConfig;
use table::Table;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = DemoConfig::from_env();
    logging::setup_logging(config.session_id.as_deref())?;

    let table = Table::open(&config).await?;
    table.run().await
}
