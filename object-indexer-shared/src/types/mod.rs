//! Core data structures used across the object indexer.

pub mod object_identity;
pub mod storage_event;

pub use object_identity::ObjectIdentity;
pub use storage_event::{HttpMethod, StorageEvent};
