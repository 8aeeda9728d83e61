//! Application context: the single owner of session and cart state.
//!
//! # Lifecycle
//!
//! 1. [`AppContext::bootstrap`] restores a persisted session (and its server
//!    cart) or the guest cart.
//! 2. [`AppContext::login`] folds the guest cart and any pending add-to-cart
//!    intent into the server cart, then refreshes.
//! 3. Cart mutations go to the backend and are followed by a full refetch;
//!    nothing is updated optimistically.
//! 4. [`AppContext::logout`] drops everything, in memory and persisted.
//!
//! Mutators take `&mut self`, so there is exactly one writer at a time.

mod account;
mod cart;
mod login;
mod orders;

pub use cart::AddOutcome;
pub use login::{ADMIN_REQUIRED, LoginReport, StepOutcome};

use std::sync::Arc;

use secrecy::SecretString;
use serde::Serialize;
use techmart_core::{CartLine, CartTotals, Email, UserSummary};

use crate::api::{ApiClient, ApiError};
use crate::config::GuestCartRetention;
use crate::error::ClientError;
use crate::notify::Notifier;
use crate::storage::SessionStorage;

/// Who is signed in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    pub authenticated: bool,
    #[serde(skip)]
    pub token: Option<SecretString>,
    pub user: Option<UserSummary>,
}

impl Session {
    fn signed_in(user: UserSummary, token: SecretString) -> Self {
        Self {
            authenticated: true,
            token: Some(token),
            user: Some(user),
        }
    }
}

/// Everything the client holds in memory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub session: Session,
    /// Last server snapshot when signed in; the guest cart otherwise.
    pub cart: Vec<CartLine>,
}

/// Session and cart state plus the operations that change them.
#[derive(Debug)]
pub struct AppContext {
    api: ApiClient,
    retention: GuestCartRetention,
    state: AppState,
}

impl AppContext {
    /// Restore state from persisted storage.
    ///
    /// With both a token and a user persisted the session is authenticated,
    /// and non-admin users get their server cart. Otherwise the guest cart is
    /// loaded without touching the network. A failed cart fetch is logged and
    /// leaves the cart empty.
    #[tracing::instrument(skip_all)]
    pub async fn bootstrap(api: ApiClient, retention: GuestCartRetention) -> Self {
        let mut context = Self {
            api,
            retention,
            state: AppState::default(),
        };

        let storage = context.storage();
        match (storage.token(), storage.user()) {
            (Some(token), Some(user)) => {
                tracing::info!(user_id = %user.id, role = ?user.role, "Restored session");
                context.state.session = Session::signed_in(user, token);
                if let Err(e) = context.refresh_cart().await {
                    tracing::error!(error = %e, "Error loading cart");
                }
            }
            _ => {
                context.state.cart = storage.guest_cart().to_cart_lines();
                tracing::debug!(lines = context.state.cart.len(), "Loaded guest cart");
            }
        }

        context
    }

    /// In-memory state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.state.session.authenticated
    }

    /// The signed-in user.
    #[must_use]
    pub const fn user(&self) -> Option<&UserSummary> {
        self.state.session.user.as_ref()
    }

    /// Current cart lines.
    #[must_use]
    pub fn cart(&self) -> &[CartLine] {
        &self.state.cart
    }

    /// Subtotal, tax, and total of the current cart.
    #[must_use]
    pub fn cart_totals(&self) -> CartTotals {
        CartTotals::of(&self.state.cart)
    }

    /// The REST client this context drives.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Guest cart policy in effect.
    #[must_use]
    pub const fn retention(&self) -> GuestCartRetention {
        self.retention
    }

    /// Forget the session and cart, and delete `token`, `user`, and
    /// `localCart`. Storage failures are logged, never returned.
    pub fn logout(&mut self) {
        self.state = AppState::default();
        if let Err(e) = self.storage().clear_session() {
            tracing::error!(error = %e, "Failed to clear persisted session");
        }
        tracing::info!("Logged out");
    }

    /// Replace the in-memory cart with the server's.
    ///
    /// Admins and signed-out sessions have no server cart; this is a no-op
    /// for them. A successful load deletes the persisted guest cart.
    ///
    /// # Errors
    ///
    /// Returns error if the fetch fails; the cart is left as it was.
    pub async fn refresh_cart(&mut self) -> Result<(), ClientError> {
        let Some(email) = self.cart_owner() else {
            return Ok(());
        };
        let result = self.api.cart(&email).await;
        let lines = self.call(result)?;
        self.state.cart = lines;
        if let Err(e) = self.storage().remove_guest_cart() {
            tracing::warn!(error = %e, "Failed to delete guest cart");
        }
        Ok(())
    }

    /// Email of a signed-in user who owns a server cart.
    fn cart_owner(&self) -> Option<Email> {
        if !self.state.session.authenticated {
            return None;
        }
        self.user()
            .filter(|user| user.role.has_cart())
            .map(|user| user.email.clone())
    }

    fn storage(&self) -> SessionStorage {
        self.api.storage().clone()
    }

    fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(self.api.notifier())
    }

    /// Map an API result, dropping the in-memory session when the backend
    /// rejected it. Persisted state was already cleared by the client.
    fn call<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ClientError> {
        result.map_err(|e| {
            if matches!(e, ApiError::Unauthorized) {
                tracing::warn!("Session rejected, signing out locally");
                self.state = AppState::default();
            }
            ClientError::from(e)
        })
    }

    fn require_user(&self) -> Result<UserSummary, ClientError> {
        match self.user() {
            Some(user) if self.state.session.authenticated => Ok(user.clone()),
            _ => Err(ClientError::NotAuthenticated),
        }
    }
}
