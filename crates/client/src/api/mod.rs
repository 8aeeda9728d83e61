//! REST client for the TechMart backend.
//!
//! # API Reference
//!
//! - Base URL: `<origin>/api`, product images under `<origin>/images`
//! - Authentication: `Authorization: Bearer <token>` whenever a token is
//!   persisted
//! - Any 401 response clears every persisted key and asks the
//!   [`Notifier`] to redirect to login

mod admin;
mod auth;
mod cart;
mod orders;
mod products;
mod reviews;
mod users;

pub use admin::{AdminRequestError, ProductImage};

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::notify::Notifier;
use crate::storage::SessionStorage;

/// Query parameters appended to a request.
pub(crate) type Query<'a> = &'a [(&'a str, String)];

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the session; persisted state has been cleared.
    #[error("Unauthorized: session expired or invalid")]
    Unauthorized,

    /// Backend returned an error response.
    #[error("API error: {status} - {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Message the backend attached to an error response, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// TechMart REST client.
///
/// Cheap to clone; clones share the HTTP pool, the session store, and the
/// notifier.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    api_base: String,
    images_base: String,
    storage: SessionStorage,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a client for the backend at `origin`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        origin: &Url,
        storage: SessionStorage,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let origin = origin.as_str().trim_end_matches('/');
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                api_base: format!("{origin}/api"),
                images_base: format!("{origin}/images"),
                storage,
                notifier,
            }),
        })
    }

    /// Persisted session the client reads its token from.
    #[must_use]
    pub fn storage(&self) -> &SessionStorage {
        &self.inner.storage
    }

    /// Where alerts and login redirects go.
    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    /// Resolve a product image reference to a fetchable URL.
    ///
    /// Empty stays empty, absolute `http…` URLs are returned unchanged, and
    /// anything else is treated as a file under the images base.
    #[must_use]
    pub fn image_url(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with("http") {
            return path.to_string();
        }
        format!("{}/{}", self.inner.images_base, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, query: Query<'_>) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.api_base);
        let mut builder = self.inner.client.request(method, &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(token) = self.inner.storage.token() {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }

    /// Execute a GET request and parse the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
    ) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path, query)).await?;
        Self::parse_json(response).await
    }

    /// Execute a POST request with a JSON body and parse the JSON response.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(self.request(Method::POST, path, &[]).json(body))
            .await?;
        Self::parse_json(response).await
    }

    /// Execute a PUT request with a JSON body and parse the JSON response.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(self.request(Method::PUT, path, &[]).json(body))
            .await?;
        Self::parse_json(response).await
    }

    /// Send a JSON body, discarding whatever the backend answers.
    pub(crate) async fn send_json<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: &B,
    ) -> Result<(), ApiError> {
        self.send(self.request(method, path, query).json(body))
            .await
            .map(drop)
    }

    /// Fire a bodiless request, discarding whatever the backend answers.
    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
    ) -> Result<(), ApiError> {
        self.send(self.request(method, path, query)).await.map(drop)
    }

    /// Send a multipart form, discarding whatever the backend answers.
    pub(crate) async fn send_multipart(
        &self,
        method: Method,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<(), ApiError> {
        self.send(self.request(method, path, &[]).multipart(form))
            .await
            .map(drop)
    }

    /// Send the request and turn non-success statuses into errors.
    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        if status.is_success() {
            return Ok(response);
        }

        Err(Self::parse_error(response).await)
    }

    /// Tear down every persisted key and bounce to login.
    fn handle_unauthorized(&self) {
        tracing::warn!("Backend rejected the session, clearing persisted state");
        if let Err(e) = self.inner.storage.clear_all() {
            tracing::error!(error = %e, "Failed to clear persisted state");
        }
        self.inner.notifier.redirect_to_login();
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")))
    }

    /// Parse an error response from the backend.
    async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ApiError::Api {
            status,
            message: error_message(&body),
        }
    }
}

/// Message from an error body: a plain string body, else its `error` field,
/// else its `message` field.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(message)) => Some(message),
        Ok(serde_json::Value::Object(fields)) => ["error", "message"]
            .into_iter()
            .find_map(|key| fields.get(key).and_then(serde_json::Value::as_str))
            .map(str::to_string),
        Ok(_) => None,
        Err(_) => Some(body.to_string()),
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_base", &self.inner.api_base)
            .field("images_base", &self.inner.images_base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::TracingNotifier;

    fn client(origin: &str) -> ApiClient {
        ApiClient::new(
            &Url::parse(origin).unwrap(),
            SessionStorage::in_memory(),
            Arc::new(TracingNotifier),
        )
        .unwrap()
    }

    #[test]
    fn test_bases_derive_from_origin() {
        let api = client("http://localhost:8080/");
        let debug = format!("{api:?}");
        assert!(debug.contains("http://localhost:8080/api"));
        assert!(debug.contains("http://localhost:8080/images"));
    }

    #[test]
    fn test_image_url_normalization() {
        let api = client("http://localhost:8080");
        assert_eq!(api.image_url(""), "");
        assert_eq!(
            api.image_url("https://cdn.example.com/x.jpg"),
            "https://cdn.example.com/x.jpg"
        );
        assert_eq!(
            api.image_url("headphones.jpg"),
            "http://localhost:8080/images/headphones.jpg"
        );
        assert_eq!(
            api.image_url("//products/phone.png"),
            "http://localhost:8080/images/products/phone.png"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(""), None);
        assert_eq!(
            error_message(r#""Insufficient stock""#).as_deref(),
            Some("Insufficient stock")
        );
        assert_eq!(
            error_message(r#"{"error":"Email already registered","message":"Bad Request"}"#)
                .as_deref(),
            Some("Email already registered")
        );
        assert_eq!(
            error_message(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(error_message("Out of stock").as_deref(), Some("Out of stock"));
        assert_eq!(error_message("[1,2]"), None);
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 400,
            message: Some("Out of stock".into()),
        };
        assert_eq!(err.to_string(), "API error: 400 - Out of stock");
        assert_eq!(err.backend_message(), Some("Out of stock"));
        assert_eq!(ApiError::Unauthorized.backend_message(), None);
    }
}
