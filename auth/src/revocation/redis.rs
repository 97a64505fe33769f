use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::RedisError;

use super::revocation_key;
use crate::ports::RevocationError;
use crate::ports::RevocationStore;

/// Revocation store backed by Redis keys with per-key expiry.
///
/// `SET .. EX` is atomic with respect to its own expiry, and repeating it for the
/// same token just rewrites the same key.
#[derive(Clone)]
pub struct RedisRevocationStore {
    connection: ConnectionManager,
}

impl RedisRevocationStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    /// Open a managed (auto-reconnecting) connection.
    ///
    /// # Arguments
    /// * `url` - Redis URL, e.g. `redis://localhost:6379`
    ///
    /// # Errors
    /// * `ConnectionFailed` - URL invalid or server unreachable
    pub async fn connect(url: &str) -> Result<Self, RevocationError> {
        let client =
            redis::Client::open(url).map_err(|e| RevocationError::ConnectionFailed(e.to_string()))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| RevocationError::ConnectionFailed(e.to_string()))?;

        tracing::info!("Revocation store connected");

        Ok(Self::new(connection))
    }
}

/// Redis expiries are whole seconds and must be positive.
fn expiry_seconds(ttl: Duration) -> u64 {
    let seconds = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    seconds.max(1)
}

fn store_error(err: RedisError) -> RevocationError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        RevocationError::ConnectionFailed(err.to_string())
    } else {
        RevocationError::CommandFailed(err.to_string())
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn blacklist(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        let key = revocation_key(token);
        let seconds = expiry_seconds(ttl);
        let mut connection = self.connection.clone();

        redis::cmd("SET")
            .arg(&key)
            .arg("revoked")
            .arg("EX")
            .arg(seconds)
            .query_async::<_, ()>(&mut connection)
            .await
            .map_err(store_error)?;

        tracing::debug!(ttl_secs = seconds, "Token blacklisted");
        Ok(())
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, RevocationError> {
        let key = revocation_key(token);
        let mut connection = self.connection.clone();

        connection.exists(&key).await.map_err(store_error)
    }
}
