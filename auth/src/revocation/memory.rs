use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::revocation_key;
use crate::ports::RevocationError;
use crate::ports::RevocationStore;

/// Process-local revocation store.
///
/// Suitable for a single instance and for tests. Expired records are dropped
/// lazily on the next write.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRevocationStore {
    /// Map of revocation key -> instant the record lapses
    records: Arc<RwLock<HashMap<String, Instant>>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.records
            .read()
            .await
            .values()
            .filter(|lapses_at| **lapses_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn blacklist(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        let now = Instant::now();
        let lapses_at = now + ttl;

        let mut records = self.records.write().await;
        records.retain(|_, existing| *existing > now);

        // Never shorten an existing record.
        records
            .entry(revocation_key(token))
            .and_modify(|existing| *existing = (*existing).max(lapses_at))
            .or_insert(lapses_at);

        Ok(())
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, RevocationError> {
        let now = Instant::now();

        Ok(self
            .records
            .read()
            .await
            .get(&revocation_key(token))
            .is_some_and(|lapses_at| *lapses_at > now))
    }
}
