use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::AuthError;
use crate::jwt::Claims;
use crate::orchestrator::TokenPair;
use crate::principal::Principal;
use crate::principal::UserCredentials;

/// Error for user store lookups.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

/// Error for revocation store operations.
#[derive(Debug, Clone, Error)]
pub enum RevocationError {
    #[error("Connection to revocation store failed: {0}")]
    ConnectionFailed(String),

    #[error("Revocation store command failed: {0}")]
    CommandFailed(String),
}

/// Read access to the user store needed by the token lifecycle.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Look up a user and its password hash for login.
    ///
    /// # Arguments
    /// * `username` - Username as presented by the client
    ///
    /// # Returns
    /// Credentials if a user with this username exists (enabled or not)
    ///
    /// # Errors
    /// * `Unavailable` - The store could not be queried
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DirectoryError>;

    /// Look up the current principal for a token subject.
    ///
    /// # Arguments
    /// * `subject` - Value of the `sub` claim
    ///
    /// # Returns
    /// Principal if it still exists (enabled or not)
    ///
    /// # Errors
    /// * `Unavailable` - The store could not be queried
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Principal>, DirectoryError>;
}

/// Record of revoked token strings.
///
/// Only read-your-writes is required: a `blacklist` that returned `Ok` must be
/// visible to a later `is_blacklisted` from the same caller. Replicas lagging
/// behind a write may still report a revoked token as live.
#[async_trait]
pub trait RevocationStore: Send + Sync + 'static {
    /// Record a token as revoked.
    ///
    /// Idempotent: revoking an already revoked token succeeds.
    ///
    /// # Arguments
    /// * `token` - Raw token string
    /// * `ttl` - How long the record must live, normally the token's remaining lifetime
    ///
    /// # Errors
    /// * `ConnectionFailed` - Store unreachable
    /// * `CommandFailed` - Store rejected the write
    async fn blacklist(&self, token: &str, ttl: Duration) -> Result<(), RevocationError>;

    /// Check whether a token has been revoked.
    ///
    /// # Errors
    /// * `ConnectionFailed` - Store unreachable
    /// * `CommandFailed` - Store rejected the read
    async fn is_blacklisted(&self, token: &str) -> Result<bool, RevocationError>;
}

/// Authentication flows offered to the transport layer.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Verify credentials and issue an access/refresh pair.
    ///
    /// # Errors
    /// * `CredentialsInvalid` - Unknown user, disabled user or wrong password
    /// * `DependencyUnavailable` - User store failed
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a new pair and revoke the presented token.
    ///
    /// # Errors
    /// * `TokenMalformed` / `TokenSignatureInvalid` / `TokenExpired` - Validation failed
    /// * `TokenKindMismatch` - Presented token is not a refresh token
    /// * `TokenRevoked` - Token was already rotated, logged out, or predates a
    ///   password change
    /// * `PrincipalNotFound` - Subject no longer exists or is disabled
    /// * `DependencyUnavailable` - User store or revocation store failed
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Revoke any presented token string.
    ///
    /// # Errors
    /// * `DependencyUnavailable` - Revocation store failed
    async fn logout(&self, token: &str) -> Result<(), AuthError>;

    /// Validate an access token for a protected request.
    ///
    /// # Errors
    /// * `TokenMalformed` / `TokenSignatureInvalid` / `TokenExpired` - Validation failed
    /// * `TokenKindMismatch` - Presented token is not an access token
    /// * `TokenRevoked` - Token was logged out
    /// * `DependencyUnavailable` - Revocation store failed
    async fn authorize(&self, access_token: &str) -> Result<Claims, AuthError>;
}
