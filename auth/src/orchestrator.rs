use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::credentials::CredentialVerifier;
use crate::errors::AuthError;
use crate::jwt::Claims;
use crate::jwt::TokenCodec;
use crate::jwt::TokenKind;
use crate::ports::AuthServicePort;
use crate::ports::RevocationError;
use crate::ports::RevocationStore;
use crate::ports::UserDirectory;
use crate::principal::Principal;
use crate::settings::AuthSettings;

/// Access/refresh pair handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Expiry of the access token
    pub expires_at: DateTime<Utc>,
    /// Principal both tokens were issued for
    pub subject: String,
}

/// Coordinates login, refresh (rotation) and logout.
///
/// Holds no mutable state of its own; the revocation store is the only shared
/// state and every call to it is bounded by the configured timeout.
pub struct AuthOrchestrator<D, R>
where
    D: UserDirectory,
    R: RevocationStore,
{
    credentials: CredentialVerifier<D>,
    directory: Arc<D>,
    codec: TokenCodec,
    revocations: Arc<R>,
    revocation_timeout: Duration,
    logout_ttl: Duration,
}

impl<D, R> AuthOrchestrator<D, R>
where
    D: UserDirectory,
    R: RevocationStore,
{
    /// Create an orchestrator reading the wall clock.
    ///
    /// # Arguments
    /// * `settings` - Validated signing key, TTLs and revocation timeout
    /// * `directory` - User store lookups
    /// * `revocations` - Blacklist of revoked token strings
    pub fn new(settings: &AuthSettings, directory: Arc<D>, revocations: Arc<R>) -> Self {
        Self::with_clock(settings, directory, revocations, Arc::new(SystemClock))
    }

    pub fn with_clock(
        settings: &AuthSettings,
        directory: Arc<D>,
        revocations: Arc<R>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let logout_ttl = settings
            .refresh_token_ttl()
            .to_std()
            .unwrap_or(Duration::from_secs(7 * 24 * 60 * 60));

        Self {
            credentials: CredentialVerifier::new(Arc::clone(&directory)),
            directory,
            codec: TokenCodec::with_clock(settings, clock),
            revocations,
            revocation_timeout: settings.revocation_timeout(),
            logout_ttl,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    fn issue_pair(&self, principal: &Principal) -> Result<TokenPair, AuthError> {
        let access = self.codec.issue(principal, TokenKind::Access)?;
        let refresh = self.codec.issue(principal, TokenKind::Refresh)?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "Bearer".to_string(),
            expires_at: access.claims.expires_at(),
            subject: principal.id.clone(),
        })
    }

    fn validate_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let claims = self.codec.validate(token)?;

        if claims.kind() != expected {
            return Err(AuthError::TokenKindMismatch {
                expected,
                actual: claims.kind(),
            });
        }

        Ok(claims)
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T, RevocationError>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.revocation_timeout, call).await {
            Ok(result) => result.map_err(|e| {
                tracing::error!(operation, error = %e, "Revocation store call failed");
                AuthError::from(e)
            }),
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_ms = self.revocation_timeout.as_millis() as u64,
                    "Revocation store call timed out"
                );
                Err(AuthError::DependencyUnavailable(format!(
                    "revocation store {} timed out after {:?}",
                    operation, self.revocation_timeout
                )))
            }
        }
    }

    async fn ensure_not_revoked(&self, token: &str) -> Result<(), AuthError> {
        let revoked = self
            .bounded("lookup", self.revocations.is_blacklisted(token))
            .await?;

        if revoked {
            return Err(AuthError::TokenRevoked);
        }
        Ok(())
    }
}

#[async_trait]
impl<D, R> AuthServicePort for AuthOrchestrator<D, R>
where
    D: UserDirectory,
    R: RevocationStore,
{
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let principal = self.credentials.verify(username, password).await.map_err(|e| {
            tracing::warn!(error = %e, "Login rejected");
            e
        })?;

        let pair = self.issue_pair(&principal)?;

        tracing::info!(subject = %principal.id, "Login succeeded");
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .validate_kind(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::warn!(error = %e, "Refresh token rejected");
                e
            })?;

        self.ensure_not_revoked(refresh_token).await.map_err(|e| {
            tracing::warn!(subject = %claims.subject(), error = %e, "Refresh token rejected");
            e
        })?;

        // Re-resolve so role changes and deactivation since issuance take effect.
        let principal = self
            .directory
            .find_by_subject(claims.subject())
            .await?
            .filter(|principal| principal.enabled)
            .ok_or_else(|| {
                tracing::warn!(subject = %claims.subject(), "Refresh for unknown or disabled principal");
                AuthError::PrincipalNotFound(claims.subject().to_string())
            })?;

        if claims.credential_version() != principal.credential_version {
            tracing::warn!(
                subject = %principal.id,
                token_version = claims.credential_version(),
                current_version = principal.credential_version,
                "Refresh token predates a credential change"
            );
            return Err(AuthError::TokenRevoked);
        }

        let pair = self.issue_pair(&principal)?;

        // Tokens stay valid through their whole `exp` second.
        let ttl = self.codec.remaining_lifetime(&claims) + Duration::from_secs(1);
        self.bounded("blacklist", self.revocations.blacklist(refresh_token, ttl))
            .await?;

        tracing::info!(subject = %principal.id, "Refresh token rotated");
        Ok(pair)
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        // The string is not parsed: even a token of doubtful validity is denied from
        // here on, for as long as any token we issue can live.
        self.bounded("blacklist", self.revocations.blacklist(token, self.logout_ttl))
            .await?;

        tracing::info!("Token revoked on logout");
        Ok(())
    }

    async fn authorize(&self, access_token: &str) -> Result<Claims, AuthError> {
        let claims = self.validate_kind(access_token, TokenKind::Access)?;
        self.ensure_not_revoked(access_token).await?;
        Ok(claims)
    }
}
