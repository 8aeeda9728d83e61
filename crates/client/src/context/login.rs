//! Login reconciliation and credential sign-in.
//!
//! Login runs four steps in order. Each one is logged and may fail on its
//! own; a failure never stops the steps after it and nothing is rolled back.

use core::fmt;

use secrecy::SecretString;
use tracing::instrument;

use techmart_core::{Credentials, Email, RegistrationForm, UserSummary};

use super::{AppContext, Session};
use crate::config::GuestCartRetention;
use crate::error::{ClientError, add_breadcrumb};

/// Shown when a non-admin account signs in to the back office.
pub const ADMIN_REQUIRED: &str = "Access denied – Admin account required.";

const REGISTERED: &str = "Registration successful! Please login.";

/// Confirmation shown once an item lands in the server cart.
pub(super) const ADDED_TO_CART: &str = "Product added to cart!";

/// How one login step went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Nothing to do.
    Skipped,
    /// Attempted and failed; later steps still ran.
    Failed(String),
}

impl StepOutcome {
    /// Whether the step failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Per-step outcome of [`AppContext::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReport {
    pub persist_session: StepOutcome,
    pub merge_guest_cart: StepOutcome,
    pub pending_item: StepOutcome,
    pub refresh_cart: StepOutcome,
}

impl LoginReport {
    /// Steps in execution order.
    #[must_use]
    pub const fn steps(&self) -> [(&'static str, &StepOutcome); 4] {
        [
            ("persist_session", &self.persist_session),
            ("merge_guest_cart", &self.merge_guest_cart),
            ("pending_item", &self.pending_item),
            ("refresh_cart", &self.refresh_cart),
        ]
    }

    /// Whether no step failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.steps().iter().all(|(_, outcome)| !outcome.is_failed())
    }
}

fn record_step(step: &'static str, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Failed(reason) => tracing::error!(step, %reason, "Login step failed"),
        _ => tracing::info!(step, %outcome, "Login step"),
    }
    let outcome = outcome.to_string();
    add_breadcrumb("login", step, Some(&[("outcome", outcome.as_str())]));
}

impl AppContext {
    /// Establish a session and reconcile local cart state with the server.
    ///
    /// 1. Mark the session authenticated and persist `token` and `user`.
    /// 2. Merge a non-empty guest cart into the server cart.
    /// 3. Replay a pending add-to-cart intent, deleting it whatever happens.
    /// 4. Refresh the cart from the server (skipped for admins).
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn login(&mut self, user: UserSummary, token: SecretString) -> LoginReport {
        let persist_session = self.persist_session(&user, &token);
        record_step("persist_session", &persist_session);

        let merge_guest_cart = self.merge_guest_cart(&user.email).await;
        record_step("merge_guest_cart", &merge_guest_cart);

        let pending_item = self.apply_pending_intent(&user.email).await;
        record_step("pending_item", &pending_item);

        let refresh_cart = if !user.role.has_cart() || !self.is_authenticated() {
            StepOutcome::Skipped
        } else {
            match self.refresh_cart().await {
                Ok(()) => StepOutcome::Completed,
                Err(e) => StepOutcome::Failed(e.to_string()),
            }
        };
        record_step("refresh_cart", &refresh_cart);

        LoginReport {
            persist_session,
            merge_guest_cart,
            pending_item,
            refresh_cart,
        }
    }

    /// Sign in with email and password, then run [`Self::login`].
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the credentials; no session is
    /// created in that case.
    #[instrument(skip_all, fields(email = %credentials.email()))]
    pub async fn sign_in(&mut self, credentials: &Credentials) -> Result<LoginReport, ClientError> {
        let result = self.api.login(credentials).await;
        let auth = self.call(result)?;
        Ok(self.login(auth.user, SecretString::from(auth.token)).await)
    }

    /// Back-office sign-in: like [`Self::sign_in`], but only ADMIN accounts
    /// get a session.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin accounts, or the sign-in error.
    #[instrument(skip_all, fields(email = %credentials.email()))]
    pub async fn admin_sign_in(
        &mut self,
        credentials: &Credentials,
    ) -> Result<LoginReport, ClientError> {
        let result = self.api.login(credentials).await;
        let auth = self.call(result)?;
        if !auth.user.is_admin() {
            tracing::warn!(user_id = %auth.user.id, "Non-admin account refused back-office access");
            return Err(ClientError::Forbidden(ADMIN_REQUIRED.to_string()));
        }
        Ok(self.login(auth.user, SecretString::from(auth.token)).await)
    }

    /// Validate the registration form and create the account. The user
    /// still has to sign in afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first failing form rule, or the backend's refusal.
    #[instrument(skip_all)]
    pub async fn register(&mut self, form: &RegistrationForm) -> Result<(), ClientError> {
        let registration = form.validate()?;
        let result = self.api.register(&registration).await;
        self.call(result)?;
        tracing::info!(email = %registration.email(), "Registered account");
        self.notifier().alert(REGISTERED);
        Ok(())
    }

    fn persist_session(&mut self, user: &UserSummary, token: &SecretString) -> StepOutcome {
        self.state.session = Session::signed_in(user.clone(), token.clone());
        // Guest lines are keyed by product id; only a server snapshot may
        // fill the signed-in cart.
        self.state.cart.clear();
        let storage = self.storage();
        match storage.set_token(token).and_then(|()| storage.set_user(user)) {
            Ok(()) => StepOutcome::Completed,
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }

    async fn merge_guest_cart(&mut self, email: &Email) -> StepOutcome {
        let storage = self.storage();
        let guest = storage.guest_cart();
        if guest.is_empty() {
            return StepOutcome::Skipped;
        }

        let result = self.api.merge_cart(email, &guest.merge_lines()).await;
        let outcome = match self.call(result) {
            Ok(()) => StepOutcome::Completed,
            Err(e) => StepOutcome::Failed(e.to_string()),
        };

        if self.retention == GuestCartRetention::ClearAfterMerge {
            if let Err(e) = storage.remove_guest_cart() {
                tracing::warn!(error = %e, "Failed to delete guest cart");
            }
        }
        outcome
    }

    async fn apply_pending_intent(&mut self, email: &Email) -> StepOutcome {
        let storage = self.storage();
        let Some(intent) = storage.pending_intent() else {
            return StepOutcome::Skipped;
        };

        let result = self
            .api
            .add_to_cart(email, intent.product.id, intent.quantity)
            .await;
        if let Err(e) = storage.remove_pending_intent() {
            tracing::warn!(error = %e, "Failed to delete pending cart item");
        }

        match self.call(result) {
            Ok(()) => {
                self.notifier().alert(ADDED_TO_CART);
                StepOutcome::Completed
            }
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_order_and_cleanliness() {
        let report = LoginReport {
            persist_session: StepOutcome::Completed,
            merge_guest_cart: StepOutcome::Failed("HTTP error".into()),
            pending_item: StepOutcome::Skipped,
            refresh_cart: StepOutcome::Completed,
        };
        let names: Vec<_> = report.steps().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["persist_session", "merge_guest_cart", "pending_item", "refresh_cart"]
        );
        assert!(!report.is_clean());
        assert_eq!(
            report.merge_guest_cart.to_string(),
            "failed: HTTP error"
        );
    }
}
