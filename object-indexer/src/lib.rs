//! # Object Indexer
//!
//! Mirrors object storage changes into a search engine. Storage events are
//! consumed from an AMQP queue, turned into per-object documents, and sent to
//! the search engine with the HTTP method the event carries.
//!
//! ## Architecture
//!
//! The indexer follows the Consumer-Processor-Dispatcher pattern:
//!
//! 1. **Consumer**: Receives storage events from the queue
//! 2. **Processor**: Parses the object identity out of each event
//! 3. **Dispatcher**: Sends the matching request to the search engine
//! 4. **Orchestrator**: Coordinates the flow and decides what is acknowledged
//!
//! A delivery is acknowledged only when the search engine accepted the
//! request. Everything else stays on the queue.
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`consumer`]: AMQP consumer for storage events
//! - [`processor`]: Object identity parsing
//! - [`dispatcher`]: Search engine requests and result classification
//! - [`orchestrator`]: Coordinates the ingest flow
//! - [`errors`]: Error types for the indexer

pub mod config;
pub mod consumer;
pub mod dispatcher;
pub mod errors;
pub mod orchestrator;
pub mod processor;

pub use config::{Dependencies, IndexerConfig};
pub use dispatcher::{DispatchResult, Dispatcher};
pub use errors::{DispatchError, IngestError, ParseError};
pub use orchestrator::{Consumer, Orchestrator, OrchestratorConfig, ProcessingStats};

use object_indexer_repository::SearchClientError;
use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),

    /// Search engine client could not be created.
    #[error("Search engine client error: {0}")]
    SearchClientError(#[from] SearchClientError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
