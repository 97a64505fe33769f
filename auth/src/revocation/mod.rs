//! Revocation (blacklist) stores.
//!
//! Records are keyed by the SHA-256 of the raw token string, so a store dump
//! never contains usable tokens and any presented string can be keyed without
//! being parsed.

use sha2::Digest;
use sha2::Sha256;

pub mod memory;
pub mod redis;

pub use self::memory::InMemoryRevocationStore;
pub use self::redis::RedisRevocationStore;

const KEY_PREFIX: &str = "blacklist:token:";

/// Store key for a raw token string.
pub fn revocation_key(token: &str) -> String {
    format!("{}{}", KEY_PREFIX, hex::encode(Sha256::digest(token.as_bytes())))
}
