/// Identity a token is issued for.
///
/// Owned by the user store; the token lifecycle only reads it. Any concrete user
/// representation converts into this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Opaque subject identifier, copied into the `sub` claim
    pub id: String,
    /// Granted authorities, in the order the store reports them
    pub authorities: Vec<String>,
    pub enabled: bool,
    /// Bumped by the store whenever the password changes; refresh tokens carrying
    /// an older generation no longer rotate
    pub credential_version: u32,
}

impl Principal {
    pub fn new(id: impl ToString, authorities: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            authorities,
            enabled: true,
            credential_version: 0,
        }
    }

    pub fn with_credential_version(mut self, credential_version: u32) -> Self {
        self.credential_version = credential_version;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A principal together with its stored password hash, as looked up for login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub principal: Principal,
    /// PHC string produced by the password hasher
    pub password_hash: String,
}
