//! In-memory TTL store for upstream response bodies
//!
//! Entries live in process memory only; nothing survives a restart.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// One cached response body with its capture time
#[derive(Debug, Clone)]
struct Entry {
    body: serde_json::Value,
    stored_at: DateTime<Utc>,
}

/// Response store with an optional store-wide TTL.
///
/// `None` means entries never expire (the shared catalog cache); with a TTL,
/// an entry older than it is never returned as a hit and is dropped on access.
#[derive(Debug, Default)]
pub struct ResponseStore {
    entries: HashMap<String, Entry>,
    ttl: Option<Duration>,
}

impl ResponseStore {
    /// Store whose entries never expire
    pub fn unbounded() -> Self {
        Self {
            entries: HashMap::new(),
            ttl: None,
        }
    }

    /// Store whose entries expire `ttl` after capture
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: Some(ttl),
        }
    }

    /// Get the stored body if the entry is still within its TTL.
    ///
    /// Expired entries are removed rather than returned.
    pub fn get(&mut self, key: &str) -> Option<serde_json::Value> {
        let fresh = self.entries.get(key).map(|entry| self.is_fresh(entry))?;

        if !fresh {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.body.clone())
    }

    /// Store a response body with the current time as capture time
    pub fn put(&mut self, key: String, body: serde_json::Value) {
        self.entries.insert(
            key,
            Entry {
                body,
                stored_at: Utc::now(),
            },
        );
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| self.is_fresh(entry))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        match self.ttl {
            None => true,
            Some(ttl) => {
                let max_age =
                    chrono::Duration::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX);
                Utc::now().signed_duration_since(entry.stored_at) < max_age
            }
        }
    }
}
