//! Profile endpoints.

use tracing::instrument;

use techmart_core::{ProfileUpdate, UserPatch, UserSummary};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// The signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserSummary, ApiError> {
        self.get("/users/profile", &[]).await
    }

    /// Save profile fields; the backend answers with the fields it changed.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserPatch, ApiError> {
        self.put("/users/profile", update).await
    }
}
