use std::sync::Arc;

use crate::errors::AuthError;
use crate::password::PasswordHasher;
use crate::ports::UserDirectory;
use crate::principal::Principal;

/// Checks a username/password pair against the user store.
pub struct CredentialVerifier<D>
where
    D: UserDirectory,
{
    directory: Arc<D>,
    password_hasher: Arc<PasswordHasher>,
}

impl<D> CredentialVerifier<D>
where
    D: UserDirectory,
{
    pub fn new(directory: Arc<D>) -> Self {
        Self {
            directory,
            password_hasher: Arc::new(PasswordHasher::new()),
        }
    }

    /// Verify credentials and return the matching principal.
    ///
    /// Unknown user, disabled user and wrong password all produce the same error.
    ///
    /// # Errors
    /// * `CredentialsInvalid` - Credentials do not identify an enabled user
    /// * `DependencyUnavailable` - User store lookup failed
    pub async fn verify(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let Some(credentials) = self.directory.find_by_username(username).await? else {
            Arc::clone(&self.password_hasher)
                .verify_dummy_async(password.to_string())
                .await;
            return Err(AuthError::CredentialsInvalid);
        };

        let matches = Arc::clone(&self.password_hasher)
            .verify_async(password.to_string(), credentials.password_hash.clone())
            .await
            .unwrap_or_else(|e| {
                tracing::error!(
                    subject = %credentials.principal.id,
                    error = %e,
                    "Stored password hash is unreadable"
                );
                false
            });

        if !matches || !credentials.principal.enabled {
            return Err(AuthError::CredentialsInvalid);
        }

        Ok(credentials.principal)
    }
}
