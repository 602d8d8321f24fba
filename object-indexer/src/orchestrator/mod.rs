//! Orchestrator module for the object indexer.
//!
//! Coordinates the queue consumer and the dispatcher, and decides which
//! deliveries are acknowledged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, instrument, warn};

use crate::consumer::StreamMessage;
use crate::dispatcher::Dispatcher;
use crate::errors::IngestError;
use object_indexer_shared::StorageEvent;

/// Source of queue deliveries.
///
/// Implementations forward each delivery as `StreamMessage::Delivery` and
/// acknowledge it once the matching `StreamMessage::Acknowledgment` with
/// `success: true` comes back. Unsuccessful deliveries are left on the queue.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Prepare the queue for consuming.
    async fn subscribe(&self) -> Result<(), IngestError>;

    /// Consume until the stream ends or `shutdown` fires.
    ///
    /// Must keep applying acknowledgments until `ack_receiver` is closed, so
    /// that the outcome of an in-flight delivery is never lost on shutdown.
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        ack_receiver: mpsc::UnboundedReceiver<StreamMessage>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError>;
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the delivery channel buffer.
    pub channel_buffer_size: usize,
    /// How often processing progress is logged.
    pub progress_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
            progress_interval: Duration::from_secs(10),
        }
    }
}

/// Counters describing what the orchestrator has done since startup.
#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    acknowledged: AtomicU64,
    unacknowledged: AtomicU64,
    malformed: AtomicU64,
}

/// Point-in-time copy of the orchestrator counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    /// Deliveries received from the consumer.
    pub received: u64,
    /// Deliveries mirrored into the index and acknowledged.
    pub acknowledged: u64,
    /// Deliveries left on the queue, malformed ones included.
    pub unacknowledged: u64,
    /// Deliveries whose body was not a valid storage event.
    pub malformed: u64,
}

/// Orchestrator that coordinates the ingest components.
///
/// The orchestrator:
/// - Manages the lifecycle of the consumer
/// - Processes deliveries strictly one at a time
/// - Sends an ack or no-ack decision back for each delivery
/// - Handles shutdown signals
pub struct Orchestrator {
    consumer: Arc<dyn Consumer>,
    dispatcher: Dispatcher,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    counters: Arc<Counters>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(consumer: Arc<dyn Consumer>, dispatcher: Dispatcher) -> Self {
        Self::with_config(consumer, dispatcher, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        consumer: Arc<dyn Consumer>,
        dispatcher: Dispatcher,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            consumer,
            dispatcher,
            config,
            shutdown_tx,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Run the orchestrator.
    ///
    /// Subscribes the consumer, then processes deliveries until the consumer
    /// stream ends, Ctrl-C is received, or `shutdown` is called. A malformed or
    /// failed delivery is logged and left on the queue; it never stops the loop.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<(), IngestError> {
        info!(base_url = %self.dispatcher.base_url(), "Starting object indexer orchestrator");

        self.consumer.subscribe().await?;

        let (event_transmitter, mut event_receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);
        // Holds at most one acknowledgment per forwarded delivery. Sending on it
        // never waits, even while the consumer is blocked on the event channel.
        let (ack_transmitter, ack_receiver) = mpsc::unbounded_channel::<StreamMessage>();

        let consumer = self.consumer.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();

        let consumer_handle = tokio::spawn(async move {
            if let Err(e) = consumer
                .run(event_transmitter, ack_receiver, shutdown_rx)
                .await
            {
                error!(error = %e, "Consumer error");
            }
        });

        info!("Ready to process storage events");

        let mut progress_timer = interval(self.config.progress_interval);
        progress_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                msg = event_receiver.recv() => {
                    match msg {
                        Some(StreamMessage::Delivery { delivery_tag, body, redelivered }) => {
                            let acknowledgment = self.process_delivery(delivery_tag, &body, redelivered).await;
                            if ack_transmitter.send(acknowledgment).is_err() {
                                warn!(delivery_tag = delivery_tag, "Consumer stopped before acknowledgment");
                            }
                        }
                        Some(StreamMessage::Error(e)) => {
                            error!(error = %e, "Received error from consumer");
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Consumer stream ended");
                            break;
                        }
                        Some(StreamMessage::Acknowledgment { .. }) => {
                            warn!("Received acknowledgment on event channel (should be on ack channel)");
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    let _ = self.shutdown_tx.send(());
                    break;
                }
                _ = progress_timer.tick() => {
                    let stats = self.stats();
                    info!(
                        received = stats.received,
                        acknowledged = stats.acknowledged,
                        unacknowledged = stats.unacknowledged,
                        malformed = stats.malformed,
                        "Processing progress"
                    );
                }
            }
        }

        // Deliveries still buffered are not processed; the broker redelivers
        // them after the connection closes. Closing both channels lets the
        // consumer apply the acknowledgments already sent and exit.
        drop(event_receiver);
        drop(ack_transmitter);

        let _ = consumer_handle.await;

        let stats = self.stats();
        info!(
            received = stats.received,
            acknowledged = stats.acknowledged,
            unacknowledged = stats.unacknowledged,
            malformed = stats.malformed,
            "Orchestrator shutdown complete"
        );
        Ok(())
    }

    /// Decode and dispatch one delivery, returning its acknowledgment.
    async fn process_delivery(
        &self,
        delivery_tag: u64,
        body: &[u8],
        redelivered: bool,
    ) -> StreamMessage {
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        debug!(
            delivery_tag = delivery_tag,
            redelivered = redelivered,
            "Processing delivery"
        );

        let event: StorageEvent = match serde_json::from_slice(body) {
            Ok(event) => event,
            Err(e) => {
                error!(delivery_tag = delivery_tag, error = %e, "Invalid message");
                self.counters.malformed.fetch_add(1, Ordering::Relaxed);
                self.counters.unacknowledged.fetch_add(1, Ordering::Relaxed);
                return StreamMessage::Acknowledgment {
                    delivery_tag,
                    success: false,
                    error: Some(format!("Invalid message: {}", e)),
                };
            }
        };

        let result = self.dispatcher.dispatch(&event).await;

        if result.success {
            self.counters.acknowledged.fetch_add(1, Ordering::Relaxed);
            StreamMessage::Acknowledgment {
                delivery_tag,
                success: true,
                error: None,
            }
        } else {
            error!(
                delivery_tag = delivery_tag,
                reason = %result.message,
                "Failed to mirror object into search engine"
            );
            self.counters.unacknowledged.fetch_add(1, Ordering::Relaxed);
            StreamMessage::Acknowledgment {
                delivery_tag,
                success: false,
                error: Some(result.message),
            }
        }
    }

    /// Counters since startup.
    pub fn stats(&self) -> ProcessingStats {
        ProcessingStats {
            received: self.counters.received.load(Ordering::Relaxed),
            acknowledged: self.counters.acknowledged.load(Ordering::Relaxed),
            unacknowledged: self.counters.unacknowledged.load(Ordering::Relaxed),
            malformed: self.counters.malformed.load(Ordering::Relaxed),
        }
    }

    /// A handle that triggers a graceful shutdown when sent to.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
