//! Otherworlds text-mode client entry point.

use std::error::Error;
use std::sync::Arc;

use otherworlds_client::{ClientConfig, Host};
use otherworlds_core::clock::{SystemClock, TokioTimer};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Otherworlds client");

    // Read configuration from environment.
    let config = ClientConfig::from_env()?;
    tracing::info!(
        tick_ms = u64::try_from(config.tick.as_millis()).unwrap_or(u64::MAX),
        fade_ms = u64::try_from(config.fade.as_millis()).unwrap_or(u64::MAX),
        max_ticks = config.max_ticks,
        script_len = config.script.len(),
        "configuration loaded"
    );

    let host = Host::new(&config, Arc::new(SystemClock), Arc::new(TokioTimer));
    host.start().await?;
    host.run(config.tick, config.max_ticks).await?;

    for line in host.surface().lines() {
        println!("{line}");
    }
    host.shutdown()?;

    Ok(())
}
