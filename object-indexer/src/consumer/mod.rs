//! Consumer module for the object indexer.
//!
//! Provides AMQP consumer functionality for receiving storage events.

mod amqp_consumer;
mod forwarder;
mod messages;

pub use amqp_consumer::{AmqpConfig, AmqpConsumer};
pub use messages::StreamMessage;
