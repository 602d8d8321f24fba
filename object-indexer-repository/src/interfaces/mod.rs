//! Interface definitions for the search engine client.
//!
//! The `SearchEngineClient` trait allows the dispatcher to be tested against
//! an in-memory client and run in production against the HTTP one.

mod search_engine_client;

pub use search_engine_client::SearchEngineClient;
