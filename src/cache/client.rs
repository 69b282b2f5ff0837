//! Read-through cached HTTP client
//!
//! On a hit the stored body is returned without touching the network; on a
//! miss one transport call runs, and only successful responses populate the
//! store. Errors are propagated, never cached.

use std::sync::{Arc, Mutex, PoisonError};

use crate::cache::key::request_key;
use crate::cache::store::ResponseStore;
use crate::error::Result;
use crate::transport::HttpTransport;

/// A fetched value plus whether the cache served it without a network call
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub from_cache: bool,
}

impl<T> Fetched<T> {
    /// Reshape the value while keeping the cache provenance
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            from_cache: self.from_cache,
        }
    }
}

/// HTTP client with a private read-through response cache
pub struct CachedClient<T: HttpTransport> {
    transport: Arc<T>,
    store: Mutex<ResponseStore>,
}

impl<T: HttpTransport> CachedClient<T> {
    pub fn new(transport: Arc<T>, store: ResponseStore) -> Self {
        Self {
            transport,
            store: Mutex::new(store),
        }
    }

    /// Read-through GET.
    ///
    /// The request signature covers the method, URL, and headers, so the same
    /// URL fetched with different credentials never shares an entry.
    pub async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<Fetched<serde_json::Value>> {
        let key = request_key("GET", url, headers);

        if let Some(body) = self.lock_store().get(&key) {
            log::debug!("Cache hit: {}", url);
            return Ok(Fetched {
                value: body,
                from_cache: true,
            });
        }

        log::debug!("Cache miss: {}", url);
        let body = self.transport.get_json(url, headers).await?;
        self.lock_store().put(key, body.clone());

        Ok(Fetched {
            value: body,
            from_cache: false,
        })
    }

    /// Number of live response entries in this client's store
    pub fn entry_count(&self) -> usize {
        self.lock_store().len()
    }

    fn lock_store(&self) -> std::sync::MutexGuard<'_, ResponseStore> {
        // A poisoned store only means a panicked reader; the data is still usable
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, UpstreamError};
    use crate::transport::mock::MockTransport;
    use serde_json::json;
    use std::time::Duration;

    fn client_with_ttl(ttl: Duration) -> (CachedClient<MockTransport>, MockTransport) {
        let transport = MockTransport::new();
        let client = CachedClient::new(Arc::new(transport.clone()), ResponseStore::with_ttl(ttl));
        (client, transport)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (client, transport) = client_with_ttl(Duration::from_secs(60));
        transport.push_ok(json!({"service_types": {}}));

        let first = client.get("http://upstream/v1/service_types", &[]).await.unwrap();
        assert!(!first.from_cache);

        let second = client.get("http://upstream/v1/service_types", &[]).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.value, first.value);

        // Only the first call reached the network
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let (client, transport) = client_with_ttl(Duration::from_secs(0));
        transport.push_ok(json!(1));
        transport.push_ok(json!(2));

        let first = client.get("http://upstream/v1/project", &[]).await.unwrap();
        assert!(!first.from_cache);

        let second = client.get("http://upstream/v1/project", &[]).await.unwrap();
        assert!(!second.from_cache);
        assert_eq!(second.value, json!(2));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_call_not_cached() {
        let (client, transport) = client_with_ttl(Duration::from_secs(60));
        transport.push_err(UpstreamError::Status {
            status: 500,
            body: json!({"message": "boom"}),
        });
        transport.push_ok(json!("recovered"));

        let err = client
            .get("http://upstream/v1/project", &[])
            .await
            .unwrap_err();
        match err {
            Error::Upstream(UpstreamError::Status { status: 500, .. }) => (),
            other => panic!("Expected 500 status error, got {:?}", other),
        }
        assert_eq!(client.entry_count(), 0);

        // The retry still goes to the network
        let second = client.get("http://upstream/v1/project", &[]).await.unwrap();
        assert!(!second.from_cache);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_headers_partition_entries() {
        let (client, transport) = client_with_ttl(Duration::from_secs(60));
        transport.push_ok(json!("for-tok-1"));
        transport.push_ok(json!("for-tok-2"));

        let headers1 = [("authorization".to_string(), "tok-1".to_string())];
        let headers2 = [("authorization".to_string(), "tok-2".to_string())];

        let first = client.get("http://upstream/v1/project", &headers1).await.unwrap();
        let second = client.get("http://upstream/v1/project", &headers2).await.unwrap();

        assert!(!first.from_cache);
        assert!(!second.from_cache);
        assert_eq!(client.entry_count(), 2);
    }

    #[tokio::test]
    async fn test_entry_count_increases_on_miss() {
        let (client, transport) = client_with_ttl(Duration::from_secs(60));
        transport.push_ok(json!(1));

        assert_eq!(client.entry_count(), 0);
        client.get("http://upstream/v1/account", &[]).await.unwrap();
        assert_eq!(client.entry_count(), 1);

        // A hit adds nothing
        client.get("http://upstream/v1/account", &[]).await.unwrap();
        assert_eq!(client.entry_count(), 1);
    }

    #[test]
    fn test_fetched_map_keeps_provenance() {
        let fetched = Fetched {
            value: 2,
            from_cache: true,
        };
        let mapped = fetched.map(|n| n * 10);

        assert_eq!(mapped.value, 20);
        assert!(mapped.from_cache);
    }
}
