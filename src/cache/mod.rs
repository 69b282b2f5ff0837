//! Two-tier response cache for upstream API calls
//!
//! One shared, unauthenticated cache serves the public catalog endpoints;
//! one isolated cache per bearer credential serves private data, selected by
//! a SHA-256 partition key so a credential never doubles as a map key in
//! cleartext. Each cached client is a plain read-through cache: hits come
//! straight from memory, misses go to the transport and populate the store.

pub mod client;
pub mod key;
pub mod registry;
pub mod store;

pub use client::{CachedClient, Fetched};
pub use key::{PartitionKey, partition_key, request_key};
pub use registry::SessionRegistry;
pub use store::ResponseStore;
