//! Govpoint headless client service
//!
//! Keeps the ticket cache warm and logs stream activity; useful for
//! soak-testing a portal deployment without the CLI.

use govpoint_client::{ClientConfig, PortalClient, StreamNotice};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config().with_env_overrides();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let client = PortalClient::new(config);
    let mut notices = client.connect().await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            notice = notices.recv() => match notice {
                Some(StreamNotice::TicketChanged(id)) => {
                    tracing::info!("Ticket {} updated ({} cached)", id, client.store.len());
                }
                Some(StreamNotice::Error(message)) => {
                    tracing::warn!("Backend error: {}", message);
                }
                Some(_) => {}
                None => break,
            }
        }
    }

    client.shutdown().await;
    Ok(())
}

fn load_config() -> ClientConfig {
    let path = std::env::args().nth(1).unwrap_or_else(|| "govpoint.json".into());
    match ClientConfig::load(&path) {
        Ok(config) => config,
        Err(_) => ClientConfig::default(),
    }
}
