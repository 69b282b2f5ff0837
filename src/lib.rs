//! Caching facade core for the Aiven cloud API.
//!
//! The crate partitions callers by credential: each distinct bearer token gets
//! its own short-lived response cache, while unauthenticated catalog data is
//! shared across all callers and never expires. Upstream fetchers reshape the
//! raw payloads into a navigable resource envelope, and a pure paginator
//! windows a plan's region map.
//!
//! The moving parts:
//!
//! - [`cache::SessionRegistry`] hands out at most one cached client per
//!   credential and evicts the least recently used session at capacity.
//! - [`cache::CachedClient`] is a read-through cache over an
//!   [`transport::HttpTransport`]; failed calls are never cached.
//! - [`upstream`] holds one fetcher per resource family (service types,
//!   versions, plans, accounts, projects, services).
//! - [`paginate::paginate`] orders and slices a plan's regions.

pub mod cache;
pub mod config;
pub mod error;
pub mod paginate;
pub mod transport;
pub mod upstream;

pub use cache::{CachedClient, Fetched, PartitionKey, SessionRegistry, partition_key};
pub use config::FacadeConfig;
pub use error::{ConfigError, Error, Result, UpstreamError};
pub use paginate::{RegionWindow, paginate};
pub use transport::{HttpTransport, ReqwestTransport};
