use anyhow::Result;
use skillgate_gateway::{Config, GatewayService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Create and run gateway service
    let gateway = GatewayService::new(config);
    gateway.run().await
}
