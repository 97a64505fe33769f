use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::principal::Principal;

/// Purpose of a token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("ACCESS"),
            TokenKind::Refresh => f.write_str("REFRESH"),
        }
    }
}

/// Payload of an issued token.
///
/// Fields are only set at issuance (or by deserializing a verified token), so
/// `exp - iat` is always the TTL of the token's kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (principal identifier)
    sub: String,

    /// Authorities snapshot taken at issuance
    authorities: Vec<String>,

    kind: TokenKind,

    /// Issued at (Unix timestamp)
    iat: i64,

    /// Expiration time (Unix timestamp)
    exp: i64,

    /// Unique token identifier
    jti: String,

    /// Credential generation of the principal at issuance
    ver: u32,
}

impl Claims {
    /// Build claims for a principal.
    ///
    /// # Arguments
    /// * `principal` - Identity the token is issued for
    /// * `kind` - Access or refresh
    /// * `issued_at` - Issuance instant (truncated to seconds)
    /// * `ttl` - Lifetime for this kind
    pub(crate) fn issue(
        principal: &Principal,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let iat = issued_at.timestamp();

        Self {
            sub: principal.id.clone(),
            authorities: principal.authorities.clone(),
            kind,
            iat,
            exp: iat + ttl.num_seconds(),
            jti: Uuid::new_v4().to_string(),
            ver: principal.credential_version,
        }
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn token_id(&self) -> &str {
        &self.jti
    }

    pub fn credential_version(&self) -> u32 {
        self.ver
    }

    pub fn issued_at_timestamp(&self) -> i64 {
        self.iat
    }

    pub fn expires_at_timestamp(&self) -> i64 {
        self.exp
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp > self.exp
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining_lifetime(&self, current_timestamp: i64) -> std::time::Duration {
        std::time::Duration::from_secs((self.exp - current_timestamp).max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal::new("u1", vec!["USER".to_string()])
    }

    #[test]
    fn test_issue() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::issue(&principal(), TokenKind::Access, now, Duration::minutes(15));

        assert_eq!(claims.subject(), "u1");
        assert_eq!(claims.authorities(), &["USER".to_string()]);
        assert_eq!(claims.kind(), TokenKind::Access);
        assert_eq!(claims.issued_at(), now);
        assert_eq!(claims.expires_at(), now + Duration::minutes(15));
        assert!(!claims.token_id().is_empty());
        assert_eq!(claims.credential_version(), 0);
    }

    #[test]
    fn test_issue_copies_credential_version() {
        let principal = principal().with_credential_version(3);
        let claims = Claims::issue(&principal, TokenKind::Refresh, Utc::now(), Duration::days(7));

        assert_eq!(claims.credential_version(), 3);
    }

    #[test]
    fn test_token_ids_are_unique() {
        let now = Utc::now();
        let a = Claims::issue(&principal(), TokenKind::Refresh, now, Duration::days(7));
        let b = Claims::issue(&principal(), TokenKind::Refresh, now, Duration::days(7));

        assert_ne!(a.token_id(), b.token_id());
    }

    #[test]
    fn test_is_expired() {
        let now = DateTime::from_timestamp(1000, 0).unwrap();
        let claims = Claims::issue(&principal(), TokenKind::Access, now, Duration::seconds(60));

        assert!(!claims.is_expired(1059)); // Not expired
        assert!(!claims.is_expired(1060)); // Exactly at expiration
        assert!(claims.is_expired(1061)); // Expired
    }

    #[test]
    fn test_remaining_lifetime_clamps_to_zero() {
        let now = DateTime::from_timestamp(1000, 0).unwrap();
        let claims = Claims::issue(&principal(), TokenKind::Access, now, Duration::seconds(60));

        assert_eq!(
            claims.remaining_lifetime(1010),
            std::time::Duration::from_secs(50)
        );
        assert_eq!(claims.remaining_lifetime(5000), std::time::Duration::ZERO);
    }

    #[test]
    fn test_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&TokenKind::Access).unwrap(),
            "\"ACCESS\""
        );
        assert_eq!(
            serde_json::from_str::<TokenKind>("\"REFRESH\"").unwrap(),
            TokenKind::Refresh
        );
    }
}
