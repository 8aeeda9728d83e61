//! Authentication endpoints.

use reqwest::Method;
use tracing::instrument;

use techmart_core::{AuthResponse, Credentials, Registration};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Exchange credentials for a user summary and bearer token.
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are rejected or the request fails.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login", credentials).await
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the registration.
    #[instrument(skip(self, registration), fields(email = %registration.email()))]
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/auth/register", &[], registration)
            .await
    }
}
