//! Binary entry point: logging setup plus the accept loop.

use chat_relay::{ChatRelay, RelayConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> chat_relay::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let relay = ChatRelay::bind(RelayConfig::default()).await?;
    relay.run().await
}
