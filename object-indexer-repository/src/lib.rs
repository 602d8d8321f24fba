//! # Object Indexer Repository
//!
//! This crate provides the boundary to the search engine: the
//! `SearchEngineClient` trait used by the dispatcher, the document address
//! builder, and an HTTP implementation that authenticates with OAuth2 client
//! credentials.

pub mod address;
pub mod config;
pub mod errors;
pub mod http;
pub mod interfaces;

pub use address::{document_address, encode_document_id};
pub use config::{OAuthCredentials, SearchClientConfig};
pub use errors::SearchClientError;
pub use http::OAuthSearchClient;
pub use interfaces::SearchEngineClient;
