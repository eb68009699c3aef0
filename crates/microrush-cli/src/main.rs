//! MicroRush terminal host entry point.

use std::error::Error;

use microrush_cli::config::AppConfig;
use microrush_cli::driver::Driver;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr; stdout is the game display.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting MicroRush");

    let config = AppConfig::from_env()?;
    let driver = Driver::new(&config)?;

    driver
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    Ok(())
}
