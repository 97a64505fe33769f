use thiserror::Error;

use crate::jwt::JwtError;
use crate::jwt::TokenKind;
use crate::ports::DirectoryError;
use crate::ports::RevocationError;

/// Failure of a token lifecycle operation.
///
/// Every variant is terminal for the flow that produced it. Mapping to transport
/// status codes belongs to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialsInvalid,

    #[error("Token is malformed")]
    TokenMalformed,

    #[error("Token signature is invalid")]
    TokenSignatureInvalid,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Expected {expected} token, got {actual} token")]
    TokenKindMismatch {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Principal not found: {0}")]
    PrincipalNotFound(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Malformed(_) => AuthError::TokenMalformed,
            JwtError::SignatureInvalid => AuthError::TokenSignatureInvalid,
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::EncodingFailed(msg) => AuthError::TokenIssuance(msg),
        }
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        AuthError::DependencyUnavailable(err.to_string())
    }
}

impl From<RevocationError> for AuthError {
    fn from(err: RevocationError) -> Self {
        AuthError::DependencyUnavailable(err.to_string())
    }
}
