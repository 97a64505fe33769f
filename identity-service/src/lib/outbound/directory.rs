use std::sync::Arc;

use async_trait::async_trait;
use auth::DirectoryError;
use auth::Principal;
use auth::UserCredentials;
use auth::UserDirectory;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Exposes the user repository to the token lifecycle as a [`UserDirectory`].
///
/// Lookups of values that cannot name a stored user (a username that fails
/// validation, a subject that is not a UUID) resolve to "not found" without a
/// query.
pub struct RepositoryUserDirectory<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
}

impl<UR> RepositoryUserDirectory<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>) -> Self {
        Self { repository }
    }
}

fn directory_error(err: UserError) -> DirectoryError {
    DirectoryError::Unavailable(err.to_string())
}

impl From<User> for UserCredentials {
    fn from(user: User) -> Self {
        UserCredentials {
            principal: Principal::from(&user),
            password_hash: user.password_hash,
        }
    }
}

#[async_trait]
impl<UR> UserDirectory for RepositoryUserDirectory<UR>
where
    UR: UserRepository,
{
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DirectoryError> {
        let Ok(username) = Username::new(username.to_string()) else {
            return Ok(None);
        };

        let user = self
            .repository
            .find_by_username(&username)
            .await
            .map_err(directory_error)?;

        Ok(user.map(UserCredentials::from))
    }

    async fn find_by_subject(&self, subject: &str) -> Result<Option<Principal>, DirectoryError> {
        let Ok(id) = UserId::from_string(subject) else {
            return Ok(None);
        };

        let user = self
            .repository
            .find_by_id(&id)
            .await
            .map_err(directory_error)?;

        Ok(user.as_ref().map(Principal::from))
    }
}
