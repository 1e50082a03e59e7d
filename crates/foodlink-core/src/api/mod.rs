//! FoodLink REST client
//!
//! Thin wrapper around `reqwest` that:
//! - prefixes every path with the configured base URL
//! - attaches `Authorization: Bearer <token>` once a token is installed
//! - turns any non-2xx response into [`Error::Api`] carrying the server's
//!   `message` field, or `HTTP <status>` when the body has none

use std::sync::RwLock;
use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::{Error, Result};

/// HTTP client for the FoodLink backend
pub struct ApiClient {
    base_url: String,
    client: Client,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a client for `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client from resolved configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_timeout(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url: String = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install or clear the bearer token used by all subsequent requests
    pub fn set_token(&self, token: Option<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = token.filter(|t| !t.is_empty());
    }

    /// Currently installed bearer token
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::GET, path, None, None).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, Some(body), None).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PUT, path, Some(body), None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::DELETE, path, None, None).await
    }

    /// POST with an explicit bearer token instead of the installed one
    pub async fn post_with_auth<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: &str,
    ) -> Result<T> {
        self.request(Method::POST, path, Some(body), Some(token)).await
    }

    async fn request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token_override: Option<&str>,
    ) -> Result<T> {
        let url = self.url(path);
        log::debug!("[api] {} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);

        let token = match token_override {
            Some(token) => Some(token.to_string()),
            None => self.token(),
        };
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            log::warn!("[api] {} {} failed: {}", method, url, e);
            Error::from(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = extract_error_message(status, &bytes);
            log::warn!("[api] {} {} -> {}: {}", method, url, status.as_u16(), message);
            return Err(Error::api(status.as_u16(), message));
        }

        parse_body(&bytes)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Pull `message` out of an error body, falling back to `HTTP <status>`
pub(crate) fn extract_error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Decode a success body; an empty body decodes as JSON `null`
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };

    serde_json::from_slice(body)
        .map_err(|e| Error::invalid_response(format!("Unexpected response body: {}", e)))
}
