//! Error types for the object indexer repository.

mod search_client_error;

pub use search_client_error::SearchClientError;
