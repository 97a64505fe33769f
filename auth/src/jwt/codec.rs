use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use jsonwebtoken::crypto;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;

use super::claims::Claims;
use super::claims::TokenKind;
use super::errors::JwtError;
use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::principal::Principal;
use crate::settings::AuthSettings;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs and verifies compact tokens.
///
/// The key and algorithm (HS256) are fixed at construction. The `alg` field of a
/// presented token's header is never read, so a token cannot choose how it is
/// verified.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec reading the wall clock.
    pub fn new(settings: &AuthSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Create a codec reading the given clock.
    ///
    /// # Arguments
    /// * `settings` - Validated key and TTLs
    /// * `clock` - Source of `iat` at issuance and of "now" at validation
    pub fn with_clock(settings: &AuthSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.signing_key()),
            decoding_key: DecodingKey::from_secret(settings.signing_key()),
            algorithm: Algorithm::HS256,
            access_token_ttl: settings.access_token_ttl(),
            refresh_token_ttl: settings.refresh_token_ttl(),
            clock,
        }
    }

    /// Lifetime of tokens of the given kind.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_token_ttl,
            TokenKind::Refresh => self.refresh_token_ttl,
        }
    }

    /// Issue a signed token for a principal.
    ///
    /// # Arguments
    /// * `principal` - Identity whose id and authorities are copied into the claims
    /// * `kind` - Access or refresh, selects the TTL
    ///
    /// # Returns
    /// Compact token and its claims
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn issue(&self, principal: &Principal, kind: TokenKind) -> Result<IssuedToken, JwtError> {
        let claims = Claims::issue(principal, kind, self.clock.now(), self.ttl(kind));
        let header = Header::new(self.algorithm);

        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify a token and return its claims.
    ///
    /// # Arguments
    /// * `token` - Compact token string
    ///
    /// # Errors
    /// * `Malformed` - Not three segments, or header/claims segment is not base64url
    /// * `SignatureInvalid` - MAC does not match; nothing else in the token is read
    /// * `Expired` - Current time is past `exp`
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let now = self.clock.now().timestamp();

        let segments: Vec<&str> = token.split('.').collect();
        let [header, payload, signature] = segments.as_slice() else {
            return Err(JwtError::Malformed(format!(
                "expected 3 segments, got {}",
                segments.len()
            )));
        };

        decode_segment("header", header)?;
        let payload_bytes = decode_segment("claims", payload)?;

        let signing_input_len = header.len() + 1 + payload.len();
        let signing_input = &token.as_bytes()[..signing_input_len];

        let verified = crypto::verify(signature, signing_input, &self.decoding_key, self.algorithm)
            .unwrap_or(false);
        if !verified {
            return Err(JwtError::SignatureInvalid);
        }

        let claims: Claims = serde_json::from_slice(&payload_bytes)
            .map_err(|e| JwtError::Malformed(format!("claims: {}", e)))?;

        if claims.is_expired(now) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    /// Time left on verified claims, by this codec's clock.
    pub fn remaining_lifetime(&self, claims: &Claims) -> std::time::Duration {
        claims.remaining_lifetime(self.clock.now().timestamp())
    }
}

fn decode_segment(name: &str, segment: &str) -> Result<Vec<u8>, JwtError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| JwtError::Malformed(format!("{}: {}", name, e)))?;

    if bytes.is_empty() {
        return Err(JwtError::Malformed(format!("{}: empty segment", name)));
    }

    Ok(bytes)
}
