//! Product reviews.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{UserSummary, timestamp};
use crate::types::ReviewId;
use crate::validation::ValidationError;

/// A published review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

/// `POST /reviews/product/{id}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    rating: u8,
    comment: String,
}

impl NewReview {
    /// Validate the review form. A rating of zero means no star was picked.
    ///
    /// # Errors
    ///
    /// Returns `MissingRating`, `RatingOutOfRange`, or `EmptyComment`.
    pub fn new(rating: u8, comment: &str) -> Result<Self, ValidationError> {
        match rating {
            0 => return Err(ValidationError::MissingRating),
            1..=5 => {}
            other => return Err(ValidationError::RatingOutOfRange(other)),
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ValidationError::EmptyComment);
        }
        Ok(Self {
            rating,
            comment: comment.to_string(),
        })
    }
}

/// `PUT /reviews/{id}` body; only the comment is editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewUpdate {
    comment: String,
}

impl ReviewUpdate {
    /// # Errors
    ///
    /// Returns `EmptyComment` for a blank comment.
    pub fn new(comment: &str) -> Result<Self, ValidationError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ValidationError::EmptyComment);
        }
        Ok(Self {
            comment: comment.to_string(),
        })
    }
}

/// Star distribution and average over a product's reviews.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingSummary {
    /// Count of reviews per star, index 0 holding one-star reviews.
    pub counts: [usize; 5],
    pub total: usize,
    pub average: f64,
}

impl RatingSummary {
    /// Summarize `reviews`, ignoring ratings outside 1..=5.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(reviews: &[Review]) -> Self {
        let mut summary = Self::default();
        let mut stars = 0usize;
        for review in reviews {
            let Some(slot) = usize::from(review.rating)
                .checked_sub(1)
                .and_then(|index| summary.counts.get_mut(index))
            else {
                continue;
            };
            *slot += 1;
            summary.total += 1;
            stars += usize::from(review.rating);
        }
        if summary.total > 0 {
            summary.average = stars as f64 / summary.total as f64;
        }
        summary
    }

    /// Share of reviews with `star` stars, as a percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self, star: u8) -> f64 {
        let count = usize::from(star)
            .checked_sub(1)
            .and_then(|index| self.counts.get(index))
            .copied()
            .unwrap_or(0);
        if self.total == 0 {
            return 0.0;
        }
        count as f64 * 100.0 / self.total as f64
    }
}

/// Whether `user` already reviewed, judged by the name reviews are shown under.
#[must_use]
pub fn user_has_reviewed(reviews: &[Review], user: &UserSummary) -> bool {
    let name = user.full_name();
    reviews.iter().any(|review| review.user_name == name)
}
