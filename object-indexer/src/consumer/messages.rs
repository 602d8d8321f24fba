//! Message types exchanged between the consumer and the orchestrator.

/// Messages that flow through the ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    /// A raw message body delivered by the queue.
    Delivery {
        delivery_tag: u64,
        body: Vec<u8>,
        redelivered: bool,
    },
    /// Whether the delivery with this tag should be acknowledged.
    Acknowledgment {
        delivery_tag: u64,
        success: bool,
        error: Option<String>,
    },
    /// Stream has ended.
    End,
    /// An error occurred.
    Error(String),
}
