//! Client error type and Sentry breadcrumbs.

use techmart_core::ValidationError;
use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors returned by [`crate::AppContext`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Form failed a local check; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persisted state could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Operation needs a signed-in user.
    #[error("Please login to continue")]
    NotAuthenticated,

    /// Signed in, but the account may not do this.
    #[error("{0}")]
    Forbidden(String),
}

impl ClientError {
    /// Text to show the user: the backend's own message or a local one when
    /// there is one, otherwise `default`.
    #[must_use]
    pub fn user_message(&self, default: &str) -> String {
        match self {
            Self::Api(err) => err
                .backend_message()
                .map_or_else(|| default.to_string(), str::to_string),
            Self::Validation(err) => err.to_string(),
            Self::NotAuthenticated | Self::Forbidden(_) => self.to_string(),
            Self::Storage(_) => default.to_string(),
        }
    }

    /// Whether the backend rejected the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthorized))
    }
}

/// Add a breadcrumb for client actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = ClientError::from(ApiError::Api {
            status: 400,
            message: Some("Only 2 left in stock".into()),
        });
        assert_eq!(
            err.user_message("Failed to add product to cart"),
            "Only 2 left in stock"
        );

        let silent = ClientError::from(ApiError::Api {
            status: 500,
            message: None,
        });
        assert_eq!(
            silent.user_message("Failed to add product to cart"),
            "Failed to add product to cart"
        );
    }

    #[test]
    fn test_user_message_local_errors() {
        let err = ClientError::from(ValidationError::IncompleteShipping);
        assert_eq!(err.user_message("x"), "Please fill in all shipping details");

        let err = ClientError::Forbidden("Access denied – Admin account required.".into());
        assert_eq!(err.user_message("x"), "Access denied – Admin account required.");
        assert!(ClientError::from(ApiError::Unauthorized).is_unauthorized());
    }

    #[test]
    fn test_breadcrumb_without_client_is_noop() {
        add_breadcrumb("login", "Merged guest cart", Some(&[("lines", "2")]));
    }
}
