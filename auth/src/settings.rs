use std::fmt;
use std::time::Duration as StdDuration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Duration;

use crate::errors::AuthError;

/// Validated, immutable configuration of the token lifecycle.
///
/// Built once at startup and handed by reference to the codec and orchestrator.
#[derive(Clone)]
pub struct AuthSettings {
    signing_key: Vec<u8>,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
    revocation_timeout: StdDuration,
}

impl AuthSettings {
    /// HS256 needs a key at least as long as its 256-bit output.
    pub const MIN_SECRET_BYTES: usize = 32;

    /// Validate raw configuration values.
    ///
    /// # Arguments
    /// * `secret` - Signing secret, base64 (standard alphabet) encoded
    /// * `access_token_ttl` - Lifetime of access tokens
    /// * `refresh_token_ttl` - Lifetime of refresh tokens
    /// * `revocation_timeout` - Upper bound on each revocation store call
    ///
    /// # Errors
    /// * `ConfigInvalid` - Secret is not base64 or too short, a TTL is zero, out of
    ///   range or not a whole number of seconds, or the access TTL is not shorter
    ///   than the refresh TTL
    pub fn new(
        secret: &str,
        access_token_ttl: StdDuration,
        refresh_token_ttl: StdDuration,
        revocation_timeout: StdDuration,
    ) -> Result<Self, AuthError> {
        let signing_key = STANDARD.decode(secret.trim()).map_err(|e| {
            AuthError::ConfigInvalid(format!("signing secret is not valid base64: {}", e))
        })?;

        if signing_key.len() < Self::MIN_SECRET_BYTES {
            return Err(AuthError::ConfigInvalid(format!(
                "signing secret must decode to at least {} bytes, got {}",
                Self::MIN_SECRET_BYTES,
                signing_key.len()
            )));
        }

        let access_token_ttl = positive_duration("access token TTL", access_token_ttl)?;
        let refresh_token_ttl = positive_duration("refresh token TTL", refresh_token_ttl)?;

        if access_token_ttl >= refresh_token_ttl {
            return Err(AuthError::ConfigInvalid(format!(
                "access token TTL ({}s) must be shorter than refresh token TTL ({}s)",
                access_token_ttl.num_seconds(),
                refresh_token_ttl.num_seconds()
            )));
        }

        if revocation_timeout.is_zero() {
            return Err(AuthError::ConfigInvalid(
                "revocation timeout must be positive".to_string(),
            ));
        }

        Ok(Self {
            signing_key,
            access_token_ttl,
            refresh_token_ttl,
            revocation_timeout,
        })
    }

    pub fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        self.refresh_token_ttl
    }

    pub fn revocation_timeout(&self) -> StdDuration {
        self.revocation_timeout
    }
}

// Keeps the key out of logs.
impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("signing_key", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("revocation_timeout", &self.revocation_timeout)
            .finish()
    }
}

// Claims carry whole seconds, so a TTL must be one too.
fn positive_duration(name: &str, value: StdDuration) -> Result<Duration, AuthError> {
    if value.as_secs() == 0 {
        return Err(AuthError::ConfigInvalid(format!(
            "{} must be at least one second",
            name
        )));
    }

    if value.subsec_nanos() != 0 {
        return Err(AuthError::ConfigInvalid(format!(
            "{} must be a whole number of seconds, got {:?}",
            name, value
        )));
    }

    Duration::from_std(value)
        .map_err(|_| AuthError::ConfigInvalid(format!("{} is out of range", name)))
}
