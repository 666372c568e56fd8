//! App Context

use std::sync::Arc;

use storefront::{
    cart::CartStore,
    storage::{FileStore, StorageError},
};
use thiserror::Error;

use crate::{
    api::{ApiError, BackendClient, Session},
    config::AppConfig,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to open storage")]
    Storage(#[source] StorageError),

    #[error("failed to build backend client")]
    Client(#[source] ApiError),
}

/// Long-lived collaborators shared by every command.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub cart: Arc<CartStore<FileStore>>,
    pub session: Session<FileStore>,
    pub backend: BackendClient<FileStore>,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage directory cannot be created or the HTTP client cannot be
    /// built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let storage = FileStore::open(&config.storage_dir).map_err(AppInitError::Storage)?;
        let session = Session::new(storage.clone());

        let backend = BackendClient::new(&config.api_url, config.http_timeout(), session.clone())
            .map_err(AppInitError::Client)?;

        Ok(Self {
            cart: Arc::new(CartStore::new(storage)),
            session,
            backend,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn cart_and_session_share_the_storage_dir() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage_dir = dir.path().join("state");

        let config = AppConfig::try_parse_from([
            "storefront",
            "--storage-dir",
            storage_dir.to_str().ok_or("non-utf8 temp path")?,
        ])?;

        let context = AppContext::from_config(&config)?;

        assert!(storage_dir.is_dir());
        assert!(context.cart.get_cart().is_empty());
        assert_eq!(context.session.token(), None);
        assert_eq!(context.backend.base_url(), "http://localhost:8080/api");

        Ok(())
    }
}
