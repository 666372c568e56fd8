//! HTTP client for the storefront backend.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use storefront::storage::KeyValueStore;
use tracing::debug;

use crate::api::{errors::ApiError, session::Session};

/// Backend REST client.
///
/// The bearer token is read from storage on every request, so signing in or out takes effect
/// without rebuilding the client.
#[derive(Debug, Clone)]
pub struct BackendClient<S> {
    base_url: String,
    http: Client,
    session: Session<S>,
}

impl<S: KeyValueStore> BackendClient<S> {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration, session: Session<S>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session the client authenticates with.
    #[must_use]
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Start a request to `path`, relative to the base URL.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let builder = self.http.request(method, url);

        match self.session.token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Send `request` and decode a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedResponse`] for a non-2xx status, [`ApiError::Http`] on
    /// transport failure and [`ApiError::Decode`] if the body does not match `T`.
    pub async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        debug!(%status, url = %response.url(), "backend responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(ApiError::UnexpectedResponse {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}
