//! Processor module for the object indexer.
//!
//! Turns storage events into the object identities written to the index.

mod identity_parser;

pub use identity_parser::parse_identity;
