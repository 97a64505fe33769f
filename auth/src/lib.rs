//! Token lifecycle library
//!
//! Provides the authentication core shared by services:
//! - Password hashing and credential verification (Argon2id)
//! - Signed access/refresh token issuance and validation (HS256)
//! - Revocation stores (in-memory, Redis)
//! - Login, refresh-with-rotation and logout coordination
//!
//! Services supply their own user store through [`UserDirectory`] and talk to
//! the flows through [`AuthServicePort`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use std::time::Duration;
//! use auth::{AuthSettings, Principal, TokenCodec, TokenKind};
//!
//! let settings = AuthSettings::new(
//!     "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=",
//!     Duration::from_secs(900),
//!     Duration::from_secs(604_800),
//!     Duration::from_millis(500),
//! )
//! .unwrap();
//!
//! let codec = TokenCodec::new(&settings);
//! let principal = Principal::new("user123", vec!["ROLE_USER".to_string()]);
//! let issued = codec.issue(&principal, TokenKind::Access).unwrap();
//!
//! let claims = codec.validate(&issued.token).unwrap();
//! assert_eq!(claims.subject(), "user123");
//! assert_eq!(claims.kind(), TokenKind::Access);
//! ```

pub mod clock;
pub mod credentials;
pub mod errors;
pub mod jwt;
pub mod orchestrator;
pub mod password;
pub mod ports;
pub mod principal;
pub mod revocation;
pub mod settings;

// Re-export commonly used items
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use credentials::CredentialVerifier;
pub use errors::AuthError;
pub use jwt::Claims;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::TokenCodec;
pub use jwt::TokenKind;
pub use orchestrator::AuthOrchestrator;
pub use orchestrator::TokenPair;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use ports::AuthServicePort;
pub use ports::DirectoryError;
pub use ports::RevocationError;
pub use ports::RevocationStore;
pub use ports::UserDirectory;
pub use principal::Principal;
pub use principal::UserCredentials;
pub use revocation::InMemoryRevocationStore;
pub use revocation::RedisRevocationStore;
pub use settings::AuthSettings;
