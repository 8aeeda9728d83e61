//! Profile and review operations tied to the signed-in user.

use tracing::instrument;

use techmart_core::{NewReview, ProductId, ProfileUpdate, Review, ReviewId, ReviewUpdate};

use super::AppContext;
use crate::error::ClientError;

const LOGIN_TO_REVIEW: &str = "Please login to submit a review";

impl AppContext {
    /// Save profile fields and merge the backend's answer into the session.
    ///
    /// # Errors
    ///
    /// Returns error when signed out, when the backend refuses, or when the
    /// merged user cannot be persisted. The in-memory user is only replaced
    /// after the backend accepted the change.
    #[instrument(skip_all)]
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<(), ClientError> {
        let user = self.require_user()?;
        let result = self.api.update_profile(update).await;
        let patch = self.call(result).inspect_err(|e| {
            tracing::error!(error = %e, "Error updating profile");
        })?;

        let merged = user.merged_with(patch);
        self.state.session.user = Some(merged.clone());
        self.storage().set_user(&merged)?;
        tracing::info!(user_id = %merged.id, "Profile updated");
        Ok(())
    }

    /// Publish a review of `product_id` as the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when signed out, a validation error for a
    /// missing rating or blank comment, or the backend's refusal.
    #[instrument(skip(self, comment))]
    pub async fn submit_review(
        &mut self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<(), ClientError> {
        if self.require_user().is_err() {
            self.notifier().alert(LOGIN_TO_REVIEW);
            return Err(ClientError::NotAuthenticated);
        }
        let review = NewReview::new(rating, comment)?;
        let result = self.api.add_review(product_id, &review).await;
        self.call(result)?;
        self.notifier().alert("Thank you for your review!");
        Ok(())
    }

    /// Replace the comment of one of the user's reviews.
    ///
    /// # Errors
    ///
    /// Returns error for a blank comment or if the backend refuses.
    #[instrument(skip(self, comment))]
    pub async fn edit_review(&mut self, id: ReviewId, comment: &str) -> Result<(), ClientError> {
        let update = ReviewUpdate::new(comment)?;
        let result = self.api.update_review(id, &update).await;
        if let Err(e) = self.call(result) {
            self.notifier().alert("Failed to update review");
            return Err(e);
        }
        self.notifier().alert("Review updated successfully!");
        Ok(())
    }

    /// Delete one of the user's reviews.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses.
    #[instrument(skip(self))]
    pub async fn delete_review(&mut self, id: ReviewId) -> Result<(), ClientError> {
        let result = self.api.delete_review(id).await;
        if let Err(e) = self.call(result) {
            self.notifier().alert("Failed to delete review");
            return Err(e);
        }
        self.notifier().alert("Review deleted successfully");
        Ok(())
    }

    /// Reviews written by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when signed out, or the fetch error.
    #[instrument(skip(self))]
    pub async fn my_reviews(&mut self) -> Result<Vec<Review>, ClientError> {
        self.require_user()?;
        let result = self.api.my_reviews().await;
        self.call(result)
    }
}
