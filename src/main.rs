use std::sync::Arc;

use tracing::{error, info};

use newsdesk::cache::{KvStore, SqliteStore};
use newsdesk::news::{sanitize_descriptors, NewsAggregator};
use newsdesk::web::{AppState, WebServer};
use newsdesk::{Config, ConfigProvider};

#[tokio::main]
async fn main() {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = newsdesk::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        newsdesk::logging::init_console_only(&config.logging.level);
    }

    config.apply_env_overrides();

    config.feeds = sanitize_descriptors(std::mem::take(&mut config.feeds));
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    }

    info!("newsdesk starting");
    info!(feeds = config.feeds.len(), "Feeds configured");
    if config.ranking_credential().is_none() {
        info!("No ranking credential configured, AI ranking will fall back to feed order");
    }

    let durable: Arc<dyn KvStore> = match SqliteStore::open(&config.cache.durable_path).await {
        Ok(store) => {
            match store.purge_expired().await {
                Ok(purged) if purged > 0 => info!(purged, "Purged expired cache entries"),
                Ok(_) => {}
                Err(e) => error!(error = %e, "Failed to purge expired cache entries"),
            }
            Arc::new(store)
        }
        Err(e) => {
            error!(error = %e, "Failed to open cache database");
            std::process::exit(1);
        }
    };

    let config = Arc::new(config);
    let aggregator = match NewsAggregator::from_config(config.clone(), durable) {
        Ok(aggregator) => Arc::new(aggregator),
        Err(e) => {
            error!(error = %e, "Failed to build news pipeline");
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(aggregator, config.identity.salt.clone()));
    let server = match WebServer::new(&config.server, state) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Failed to configure web server");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!(error = %e, "Web server error");
        std::process::exit(1);
    }
}
