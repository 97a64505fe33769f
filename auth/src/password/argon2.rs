use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Argon2id with a random salt per hash; verification compares in constant time.
pub struct PasswordHasher {
    /// Hash of a throwaway password, verified against when a user does not exist
    /// so that unknown usernames cost the same as wrong passwords.
    dummy_hash: Option<String>,
}

impl PasswordHasher {
    pub const MIN_LENGTH: usize = 8;
    pub const MAX_LENGTH: usize = 128;

    pub fn new() -> Self {
        let mut hasher = Self { dummy_hash: None };
        hasher.dummy_hash = hasher.hash("timing-equalizer-password").ok();
        hasher
    }

    /// Check a new password against length limits.
    ///
    /// # Errors
    /// * `PolicyViolation` - Shorter than 8 or longer than 128 characters
    pub fn check_policy(&self, password: &str) -> Result<(), PasswordError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH || length > Self::MAX_LENGTH {
            return Err(PasswordError::PolicyViolation(format!(
                "password must be between {} and {} characters",
                Self::MIN_LENGTH,
                Self::MAX_LENGTH
            )));
        }
        Ok(())
    }

    /// Hash a plaintext password.
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored hash is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        let argon2 = Argon2::default();

        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Spend the cost of one verification without a real hash. Always false.
    pub fn verify_dummy(&self, password: &str) -> bool {
        if let Some(hash) = &self.dummy_hash {
            let _ = self.verify(password, hash);
        }
        false
    }
}

// Argon2 is CPU-bound by construction; the async variants run it on the
// blocking pool so request tasks keep their worker threads.
impl PasswordHasher {
    /// [`hash`](Self::hash) on a blocking thread.
    pub async fn hash_async(self: Arc<Self>, password: String) -> Result<String, PasswordError> {
        tokio::task::spawn_blocking(move || self.hash(&password))
            .await
            .map_err(|e| PasswordError::HashingFailed(format!("hashing task failed: {}", e)))?
    }

    /// [`verify`](Self::verify) on a blocking thread.
    pub async fn verify_async(
        self: Arc<Self>,
        password: String,
        hash: String,
    ) -> Result<bool, PasswordError> {
        tokio::task::spawn_blocking(move || self.verify(&password, &hash))
            .await
            .map_err(|e| {
                PasswordError::VerificationFailed(format!("verification task failed: {}", e))
            })?
    }

    /// [`verify_dummy`](Self::verify_dummy) on a blocking thread. Always false.
    pub async fn verify_dummy_async(self: Arc<Self>, password: String) -> bool {
        let _ = tokio::task::spawn_blocking(move || self.verify_dummy(&password)).await;
        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
