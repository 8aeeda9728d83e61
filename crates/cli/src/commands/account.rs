//! Session and profile commands.
//!
//! # Usage
//!
//! ```bash
//! techmart login -e priya@techmart.in -p secret
//! techmart profile update --phone 9876543210 --address "12 MG Road, Bengaluru"
//! techmart logout
//! ```

use clap::Subcommand;

use techmart_client::{AppContext, ClientError, LoginReport};
use techmart_core::{Credentials, ProfileUpdate, RegistrationForm};

use super::{CommandError, print_json};

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Fetch the profile from the backend
    Show,
    /// Change profile fields; unset flags are left alone
    Update {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },
}

/// Sign in as a customer and reconcile the carts.
///
/// # Errors
///
/// Returns error if the credentials are malformed or rejected.
pub async fn login(context: &mut AppContext, email: &str, password: &str) -> Result<(), CommandError> {
    let credentials = Credentials::new(email, password)?;
    let result = context.sign_in(&credentials).await;
    finish_login(context, result)
}

/// Sign in to the back office.
///
/// # Errors
///
/// Returns error if the credentials are rejected or the account is not an
/// admin.
pub async fn admin_login(
    context: &mut AppContext,
    email: &str,
    password: &str,
) -> Result<(), CommandError> {
    let credentials = Credentials::new(email, password)?;
    let result = context.admin_sign_in(&credentials).await;
    finish_login(context, result)
}

fn finish_login(
    context: &AppContext,
    result: Result<LoginReport, ClientError>,
) -> Result<(), CommandError> {
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            context.api().notifier().alert(&e.user_message(LOGIN_FAILED));
            return Err(e.into());
        }
    };
    if !report.is_clean() {
        tracing::warn!("Signed in, but part of the cart could not be reconciled");
    }
    print_json(context.state())
}

/// Forget the session.
pub fn logout(context: &mut AppContext) {
    context.logout();
}

/// Create an account.
///
/// # Errors
///
/// Returns the first failing form rule, or the backend's refusal.
pub async fn register(context: &mut AppContext, form: &RegistrationForm) -> Result<(), CommandError> {
    if let Err(e) = context.register(form).await {
        context.api().notifier().alert(&e.user_message(REGISTER_FAILED));
        return Err(e.into());
    }
    Ok(())
}

/// Run a `profile` subcommand.
///
/// # Errors
///
/// Returns error when signed out, when no field was given, or if the backend
/// refuses.
pub async fn profile(context: &mut AppContext, action: ProfileAction) -> Result<(), CommandError> {
    match action {
        ProfileAction::Show => {
            if !context.is_authenticated() {
                return Err(ClientError::NotAuthenticated.into());
            }
            let user = context.api().profile().await?;
            print_json(&user)
        }
        ProfileAction::Update {
            first_name,
            last_name,
            phone,
            address,
        } => {
            let update = ProfileUpdate {
                first_name,
                last_name,
                phone,
                address,
            };
            if update.is_empty() {
                return Err(CommandError::Usage("Nothing to update"));
            }
            context.update_profile(&update).await?;
            print_json(&context.user())
        }
    }
}
