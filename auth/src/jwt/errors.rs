use thiserror::Error;

/// Error type for token encoding and validation.
///
/// Validation failures are reported in a fixed priority: `Malformed`, then
/// `SignatureInvalid`, then `Expired`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token is expired")]
    Expired,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}
