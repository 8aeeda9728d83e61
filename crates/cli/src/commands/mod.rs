//! Command implementations.

pub mod account;
pub mod admin;
pub mod orders;
pub mod shop;

use serde::Serialize;
use thiserror::Error;

use techmart_client::{AdminRequestError, ApiError, ClientError, Notifier};
use techmart_core::ValidationError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Admin(#[from] AdminRequestError),

    /// Nothing to send.
    #[error("{0}")]
    Usage(&'static str),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Prints alerts to stderr, keeping stdout for command output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    #[allow(clippy::print_stderr)]
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }

    #[allow(clippy::print_stderr)]
    fn redirect_to_login(&self) {
        eprintln!("Your session has expired. Run `techmart login` to sign in again.");
    }
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns error if `value` cannot be serialized.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
