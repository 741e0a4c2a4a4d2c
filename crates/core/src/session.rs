use crate::traits::KeyValueStore;
use crate::ReviewError;
use tracing::warn;

pub const TOKEN_KEY: &str = "auth_token";

/// Supplies the bearer token for backend calls. `None` means signed out.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl CredentialSource for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone().filter(|token| !token.trim().is_empty())
    }
}

/// Token persisted under [`TOKEN_KEY`] by whatever signed the user in.
pub struct StoredCredentials<S> {
    store: S,
}

impl<S: KeyValueStore> StoredCredentials<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn set_token(&self, token: &str) -> Result<(), ReviewError> {
        if token.trim().is_empty() {
            return Err(ReviewError::InvalidArgument("token is empty".to_string()));
        }
        self.store.set(TOKEN_KEY, token.trim())
    }

    pub fn clear_token(&self) -> Result<(), ReviewError> {
        self.store.delete(TOKEN_KEY)
    }
}

impl<S: KeyValueStore> CredentialSource for StoredCredentials<S> {
    fn bearer_token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|token| !token.trim().is_empty()),
            Err(error) => {
                warn!(%error, "unable to read stored token");
                None
            }
        }
    }
}

impl<C: CredentialSource + ?Sized> CredentialSource for Box<C> {
    fn bearer_token(&self) -> Option<String> {
        (**self).bearer_token()
    }
}
