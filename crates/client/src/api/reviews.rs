//! Review endpoints.

use reqwest::Method;
use tracing::instrument;

use techmart_core::{NewReview, ProductId, Review, ReviewId, ReviewUpdate};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Reviews of one product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, ApiError> {
        self.get(&format!("/reviews/product/{product_id}"), &[]).await
    }

    /// Reviews written by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.get("/reviews/my-reviews", &[]).await
    }

    /// Publish a review.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the review.
    #[instrument(skip(self, review), fields(product_id = %product_id))]
    pub async fn add_review(&self, product_id: ProductId, review: &NewReview) -> Result<(), ApiError> {
        self.send_json(
            Method::POST,
            &format!("/reviews/product/{product_id}"),
            &[],
            review,
        )
        .await
    }

    /// Replace a review's comment.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, update), fields(review_id = %id))]
    pub async fn update_review(&self, id: ReviewId, update: &ReviewUpdate) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &format!("/reviews/{id}"), &[], update)
            .await
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn delete_review(&self, id: ReviewId) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &format!("/reviews/{id}"), &[])
            .await
    }
}
