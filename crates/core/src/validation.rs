//! Local form validation.
//!
//! These checks only keep obviously incomplete forms off the wire. The
//! `Display` text of each variant is what the shopper sees next to the form.

use thiserror::Error;

use crate::types::EmailError;

/// A form failed a local check; nothing was sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Email field is blank or malformed.
    #[error(transparent)]
    Email(#[from] EmailError),

    /// A required text field is blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// Registration password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Registration terms checkbox left unticked.
    #[error("Please agree to terms and conditions")]
    TermsNotAccepted,

    /// Street, state, or zip code missing at checkout.
    #[error("Please fill in all shipping details")]
    IncompleteShipping,

    /// Checkout attempted with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Review submitted without choosing stars.
    #[error("Please select a rating")]
    MissingRating,

    /// Star rating outside 1..=5.
    #[error("Rating must be between 1 and 5 (got {0})")]
    RatingOutOfRange(u8),

    /// Review comment is blank.
    #[error("Please write a comment")]
    EmptyComment,

    /// Cancellation or rejection reason is blank.
    #[error("Please provide a reason")]
    MissingReason,

    /// Return requested without picking a reason.
    #[error("Please select a reason")]
    MissingReturnReason,

    /// Order marked shipped without a tracking number.
    #[error("Tracking number is required when shipping an order")]
    MissingTrackingNumber,

    /// Cart quantity below one.
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// Product price below zero.
    #[error("Price cannot be negative")]
    NegativePrice,
}

/// Trim `value` and fail with [`ValidationError::Required`] when nothing is left.
///
/// # Errors
///
/// Returns `ValidationError::Required(field)` for blank input.
pub fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  Priya ", "First name").unwrap(), "Priya");
        assert_eq!(
            required(" \t", "First name"),
            Err(ValidationError::Required("First name"))
        );
    }

    #[test]
    fn test_messages_match_form_copy() {
        assert_eq!(
            ValidationError::PasswordMismatch.to_string(),
            "Passwords do not match"
        );
        assert_eq!(
            ValidationError::Required("Street").to_string(),
            "Street is required"
        );
        assert_eq!(
            ValidationError::from(EmailError::Empty).to_string(),
            "Email address is required"
        );
    }
}
