//! # Object Indexer Shared
//!
//! This crate defines the data structures shared across the object indexer:
//! the storage event received from the queue and the object identity that is
//! written to the search engine as a document.

pub mod types;

pub use types::object_identity::ObjectIdentity;
pub use types::storage_event::{HttpMethod, StorageEvent};
