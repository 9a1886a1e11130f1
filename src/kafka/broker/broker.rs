use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use ractor::Actor;
use tokio::net::TcpListener;

use crate::config::BrokerConfig;
use crate::kafka::client::actor::Args;
use crate::kafka::client::ClientActor;
use crate::metadata::TopicCatalog;

pub struct Broker {
    config: BrokerConfig,
    catalog: TopicCatalog,
}

impl Broker {
    /// Loads the topic catalog from the configured metadata log.
    ///
    /// Fails if the log is missing or corrupt; nothing is served without a catalog.
    pub fn new(config: BrokerConfig) -> Result<Arc<Self>, anyhow::Error> {
        let catalog = TopicCatalog::load(&config.metadata_log_path)
            .with_context(|| format!("loading topic catalog from {}", config.metadata_log_path.display()))?;
        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: BrokerConfig, catalog: TopicCatalog) -> Arc<Self> {
        Arc::new(Self { config, catalog })
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub async fn start(self: &Arc<Self>) -> Result<(), anyhow::Error> {
        let addr = self.config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding {}", addr))?;
        info!("Kafka broker listening on {}", addr);

        self.serve(listener).await
    }

    /// Accepts connections on `listener` until accepting fails.
    pub async fn serve(self: &Arc<Self>, listener: TcpListener) -> Result<(), anyhow::Error> {
        loop {
            // Accept new connections
            let (socket, peer) = listener.accept().await.context("accepting connection")?;
            debug!("Accepted connection from {}", peer);

            // Clone the Arc for this client
            let broker_clone = Arc::clone(self);

            if let Err(e) = Actor::spawn(None, ClientActor, Args {
                broker: broker_clone,
                tcp_stream: socket,
            })
            .await
            {
                warn!("Failed to start client actor for {}: {}", peer, e);
            }
        }
    }
}
