//! Delivery forwarding loop shared by queue consumers.
//!
//! Reads deliveries from a stream, hands them to the orchestrator, and applies
//! the acknowledgment decisions that come back.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::consumer::messages::StreamMessage;
use crate::errors::IngestError;

/// A message read from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueueDelivery {
    pub delivery_tag: u64,
    pub body: Vec<u8>,
    pub redelivered: bool,
}

/// Broker-side operations the forwarding loop needs.
#[async_trait]
pub(crate) trait DeliveryChannel: Send + Sync {
    /// Remove the delivery from the queue.
    async fn ack(&self, delivery_tag: u64) -> Result<(), IngestError>;

    /// Stop receiving new deliveries.
    async fn cancel(&self) -> Result<(), IngestError>;
}

/// Forward deliveries until the stream ends, shutdown fires, or the
/// orchestrator stops listening.
///
/// Shutdown and acknowledgments take priority over new deliveries. After the
/// loop exits, acknowledgments are still applied until `ack_receiver` closes,
/// so every delivery already handed over gets its ack or no-ack.
pub(crate) async fn forward_deliveries<S, C>(
    mut deliveries: S,
    channel: &C,
    sender: mpsc::Sender<StreamMessage>,
    mut ack_receiver: mpsc::UnboundedReceiver<StreamMessage>,
    mut shutdown: broadcast::Receiver<()>,
) where
    S: Stream<Item = Result<QueueDelivery, String>> + Unpin,
    C: DeliveryChannel + ?Sized,
{
    loop {
        tokio::select! {
            biased;

            _ = shutdown.recv() => {
                info!("Consumer received shutdown signal");
                cancel(channel).await;
                let _ = sender.send(StreamMessage::End).await;
                break;
            }
            ack_msg = ack_receiver.recv() => {
                match ack_msg {
                    Some(ack) => apply_acknowledgment(channel, ack).await,
                    None => {
                        info!("Acknowledgment channel closed");
                        cancel(channel).await;
                        break;
                    }
                }
            }
            delivery = deliveries.next() => {
                match delivery {
                    Some(Ok(delivery)) => {
                        debug!(
                            delivery_tag = delivery.delivery_tag,
                            redelivered = delivery.redelivered,
                            size = delivery.body.len(),
                            "Received message from queue"
                        );
                        let forwarded = sender
                            .send(StreamMessage::Delivery {
                                delivery_tag: delivery.delivery_tag,
                                body: delivery.body,
                                redelivered: delivery.redelivered,
                            })
                            .await;
                        if forwarded.is_err() {
                            // Left unacked; the broker redelivers it.
                            warn!(
                                delivery_tag = delivery.delivery_tag,
                                "Orchestrator stopped, delivery not forwarded"
                            );
                            cancel(channel).await;
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "Queue delivery error");
                        let _ = sender.send(StreamMessage::Error(e)).await;
                    }
                    None => {
                        info!("Queue delivery stream ended");
                        let _ = sender.send(StreamMessage::End).await;
                        break;
                    }
                }
            }
        }
    }

    drop(sender);

    while let Some(ack) = ack_receiver.recv().await {
        apply_acknowledgment(channel, ack).await;
    }
}

async fn cancel<C: DeliveryChannel + ?Sized>(channel: &C) {
    if let Err(e) = channel.cancel().await {
        warn!(error = %e, "Failed to cancel consumer");
    }
}

/// Apply an acknowledgment decision from the orchestrator.
async fn apply_acknowledgment<C: DeliveryChannel + ?Sized>(channel: &C, message: StreamMessage) {
    let StreamMessage::Acknowledgment {
        delivery_tag,
        success,
        error,
    } = message
    else {
        return;
    };

    if !success {
        warn!(
            delivery_tag = delivery_tag,
            error = error.as_deref().unwrap_or("Unknown error"),
            "Leaving message on queue"
        );
        return;
    }

    match channel.ack(delivery_tag).await {
        Ok(()) => debug!(delivery_tag = delivery_tag, "Acknowledged message"),
        Err(e) => error!(delivery_tag = delivery_tag, error = %e, "Failed to acknowledge message"),
    }
}
