//! `fixdesk` server binary
//!
//! Usage: `fixdesk [config.yaml]`. Without a path every setting takes its
//! default (file storage under `./data`, listening on 127.0.0.1:3000).

use anyhow::Result;
use fixdesk::config::ShopConfig;
use fixdesk::server::ServerBuilder;
use fixdesk::shop::RepairShop;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ShopConfig::from_yaml_file(&path)?,
        None => ShopConfig::default(),
    };

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = config.storage.open()?;
    tracing::info!(
        backend = ?config.storage.backend,
        data_dir = %config.storage.data_dir.display(),
        "record store opened"
    );

    let shop = RepairShop::new(store).with_billing(config.billing.clone());
    ServerBuilder::new(shop).serve(&config.server.bind).await
}
