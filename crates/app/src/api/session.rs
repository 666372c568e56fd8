//! Session state persisted next to the cart.

use storefront::{storage::KeyValueStore, users::User};
use tracing::{error, warn};

/// Primary storage key for the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Fallback storage key for the bearer token.
pub const LEGACY_TOKEN_KEY: &str = "token";

/// Storage key for the signed-in user.
pub const USER_KEY: &str = "user";

/// Read access to the signed-in session. Nothing is cached; every call reads storage.
#[derive(Debug, Clone)]
pub struct Session<S> {
    storage: S,
}

impl<S: KeyValueStore> Session<S> {
    /// Wrap `storage`.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Bearer token, from `authToken` first and `token` second. Blank values are skipped.
    pub fn token(&self) -> Option<String> {
        [AUTH_TOKEN_KEY, LEGACY_TOKEN_KEY]
            .into_iter()
            .find_map(|key| self.read(key).filter(|token| !token.trim().is_empty()))
    }

    /// The signed-in user. Corrupt data reads as signed out.
    pub fn current_user(&self) -> Option<User> {
        let raw = self.read(USER_KEY)?;

        serde_json::from_str(&raw)
            .inspect_err(|source| warn!(%source, "ignoring corrupt user data"))
            .ok()
    }

    fn read(&self, key: &str) -> Option<String> {
        self.storage
            .get(key)
            .inspect_err(|source| error!(%source, key, "failed to read session storage"))
            .ok()
            .flatten()
    }
}
