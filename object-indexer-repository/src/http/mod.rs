//! HTTP implementation of the search engine client.

mod client;
mod token;

pub use client::OAuthSearchClient;
