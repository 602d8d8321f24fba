//! Dependency initialization and wiring for the object indexer.

use std::sync::Arc;
use tracing::info;

use crate::config::IndexerConfig;
use crate::consumer::AmqpConsumer;
use crate::dispatcher::Dispatcher;
use crate::orchestrator::Orchestrator;
use crate::IndexingError;
use object_indexer_repository::OAuthSearchClient;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`IndexerConfig::from_env`] for the variables read. Startup fails
    /// immediately if the configuration is invalid or the broker cannot be
    /// reached.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails
    pub async fn new() -> Result<Self, IndexingError> {
        let config = IndexerConfig::from_env()?;
        Self::from_config(config).await
    }

    /// Initialize all dependencies from an already loaded configuration.
    pub async fn from_config(config: IndexerConfig) -> Result<Self, IndexingError> {
        info!(
            queue_host = %config.queue.host,
            queue_port = config.queue.port,
            queue_vhost = %config.queue.vhost,
            queue_name = %config.queue.queue_name,
            searchengine_url = %config.searchengine_url,
            oauth = config.search_client.oauth.is_some(),
            "Initializing dependencies"
        );

        let client = OAuthSearchClient::new(config.search_client)?;
        let dispatcher = Dispatcher::new(Arc::new(client), config.searchengine_url);

        let consumer = AmqpConsumer::connect(&config.queue).await?;

        info!("AMQP consumer connected");

        let orchestrator = Orchestrator::new(Arc::new(consumer), dispatcher);

        Ok(Self { orchestrator })
    }
}
