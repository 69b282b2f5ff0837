//! Session cache registry: one isolated cached client per credential
//!
//! The registry owns the shared unauthenticated client and lazily creates a
//! private client per credential partition. Check-and-insert runs under a
//! single lock, so concurrent first requests with the same credential always
//! observe the same client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::cache::client::CachedClient;
use crate::cache::key::{PartitionKey, partition_key};
use crate::cache::store::ResponseStore;
use crate::config::FacadeConfig;
use crate::error::{Error, Result};
use crate::transport::HttpTransport;

struct Session<T: HttpTransport> {
    client: Arc<CachedClient<T>>,
    last_used: u64,
}

struct Sessions<T: HttpTransport> {
    map: HashMap<PartitionKey, Session<T>>,
    // Monotonic use counter; higher = more recently used
    next_tick: u64,
}

/// Process-wide registry of per-credential cached clients
pub struct SessionRegistry<T: HttpTransport> {
    transport: Arc<T>,
    shared: Arc<CachedClient<T>>,
    sessions: Mutex<Sessions<T>>,
    private_ttl: Duration,
    max_sessions: usize,
}

impl<T: HttpTransport> SessionRegistry<T> {
    pub fn new(transport: T, config: &FacadeConfig) -> Self {
        let transport = Arc::new(transport);
        let shared = Arc::new(CachedClient::new(
            Arc::clone(&transport),
            ResponseStore::unbounded(),
        ));

        Self {
            transport,
            shared,
            sessions: Mutex::new(Sessions {
                map: HashMap::new(),
                next_tick: 0,
            }),
            private_ttl: config.private_ttl(),
            // Capacity floor of one, or insertion could never succeed
            max_sessions: config.max_sessions.max(1),
        }
    }

    /// Client for unauthenticated catalog calls; its entries never expire
    pub fn shared_client(&self) -> Arc<CachedClient<T>> {
        Arc::clone(&self.shared)
    }

    /// Resolve or create the private client for a credential.
    ///
    /// Empty credentials are rejected here as a defensive backstop; the route
    /// layer raises the authorization failure before reaching the core.
    pub fn client_for(&self, credential: &str) -> Result<Arc<CachedClient<T>>> {
        if credential.is_empty() {
            return Err(Error::MissingCredential);
        }

        let key = partition_key(credential);
        let mut sessions = self.lock_sessions();
        let tick = sessions.next_tick;
        sessions.next_tick += 1;

        if let Some(session) = sessions.map.get_mut(&key) {
            session.last_used = tick;
            return Ok(Arc::clone(&session.client));
        }

        if sessions.map.len() >= self.max_sessions {
            evict_least_recently_used(&mut sessions.map);
        }

        log::info!("Creating cached session for partition {}", key.as_hex());
        let client = Arc::new(CachedClient::new(
            Arc::clone(&self.transport),
            ResponseStore::with_ttl(self.private_ttl),
        ));
        sessions.map.insert(
            key,
            Session {
                client: Arc::clone(&client),
                last_used: tick,
            },
        );

        Ok(client)
    }

    /// Number of distinct private sessions currently registered
    pub fn session_count(&self) -> usize {
        self.lock_sessions().map.len()
    }

    /// Sum of live response entries across all private sessions
    pub fn total_cached_responses(&self) -> usize {
        self.lock_sessions()
            .map
            .values()
            .map(|session| session.client.entry_count())
            .sum()
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, Sessions<T>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn evict_least_recently_used<T: HttpTransport>(map: &mut HashMap<PartitionKey, Session<T>>) {
    let oldest = map
        .iter()
        .min_by_key(|(_, session)| session.last_used)
        .map(|(key, _)| key.clone());

    if let Some(key) = oldest {
        log::debug!("Evicting least recently used session {}", key.as_hex());
        map.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    fn registry_with_capacity(
        max_sessions: usize,
    ) -> (SessionRegistry<MockTransport>, MockTransport) {
        let config = FacadeConfig {
            max_sessions,
            ..FacadeConfig::default()
        };
        let transport = MockTransport::new();
        (SessionRegistry::new(transport.clone(), &config), transport)
    }

    #[test]
    fn test_same_credential_same_client() {
        let (registry, _transport) = registry_with_capacity(16);

        let first = registry.client_for("token-a").unwrap();
        let second = registry.client_for("token-a").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.session_count(), 1);
    }

    #[test]
    fn test_distinct_credentials_distinct_clients() {
        let (registry, _transport) = registry_with_capacity(16);

        let a = registry.client_for("token-a").unwrap();
        let b = registry.client_for("token-b").unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.session_count(), 2);
    }

    #[test]
    fn test_empty_credential_rejected() {
        let (registry, _transport) = registry_with_capacity(16);

        match registry.client_for("") {
            Err(Error::MissingCredential) => (),
            other => panic!("Expected MissingCredential, got {:?}", other.err()),
        }
        assert_eq!(registry.session_count(), 0);
    }

    #[test]
    fn test_concurrent_first_requests_create_one_client() {
        let (registry, _transport) = registry_with_capacity(16);
        let registry = Arc::new(registry);

        let clients: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let registry = Arc::clone(&registry);
                    scope.spawn(move || registry.client_for("shared-token").unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(registry.session_count(), 1);
        for client in &clients[1..] {
            assert!(Arc::ptr_eq(&clients[0], client));
        }
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let (registry, _transport) = registry_with_capacity(2);

        let a = registry.client_for("token-a").unwrap();
        registry.client_for("token-b").unwrap();

        // Touch a so b becomes the eviction candidate
        registry.client_for("token-a").unwrap();
        registry.client_for("token-c").unwrap();

        assert_eq!(registry.session_count(), 2);

        // a survived; asking again returns the same client
        let a_again = registry.client_for("token-a").unwrap();
        assert!(Arc::ptr_eq(&a, &a_again));
    }

    #[test]
    fn test_evicted_session_gets_fresh_client() {
        let (registry, _transport) = registry_with_capacity(1);

        let a = registry.client_for("token-a").unwrap();
        registry.client_for("token-b").unwrap();

        let a_fresh = registry.client_for("token-a").unwrap();
        assert!(!Arc::ptr_eq(&a, &a_fresh));
        assert_eq!(registry.session_count(), 1);
    }

    #[tokio::test]
    async fn test_total_cached_responses() {
        let (registry, transport) = registry_with_capacity(16);
        assert_eq!(registry.total_cached_responses(), 0);

        let a = registry.client_for("token-a").unwrap();
        transport.push_ok(json!(1));
        a.get("http://upstream/v1/project", &[]).await.unwrap();

        assert_eq!(registry.total_cached_responses(), 1);

        let b = registry.client_for("token-b").unwrap();
        transport.push_ok(json!(2));
        b.get("http://upstream/v1/account", &[]).await.unwrap();

        assert_eq!(registry.total_cached_responses(), 2);

        // A cache hit adds nothing
        a.get("http://upstream/v1/project", &[]).await.unwrap();
        assert_eq!(registry.total_cached_responses(), 2);
    }

    #[tokio::test]
    async fn test_shared_client_is_single_instance() {
        let (registry, transport) = registry_with_capacity(16);

        let shared1 = registry.shared_client();
        let shared2 = registry.shared_client();
        assert!(Arc::ptr_eq(&shared1, &shared2));

        // Shared entries are not counted as private responses
        transport.push_ok(json!({}));
        shared1
            .get("http://upstream/v1/service_types", &[])
            .await
            .unwrap();
        assert_eq!(registry.total_cached_responses(), 0);
    }
}
