//! User-facing notifications.
//!
//! The storefront surfaces outcomes as blocking alerts and bounces the user to
//! the login screen when the backend rejects the session. [`Notifier`] is the
//! seam for both; front-ends decide how to render them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Receives alerts and login redirects.
pub trait Notifier: Send + Sync {
    /// Show a message the user must acknowledge.
    fn alert(&self, message: &str);

    /// The session was rejected; send the user to the login screen.
    fn redirect_to_login(&self);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn alert(&self, message: &str) {
        tracing::info!(alert = message, "User notification");
    }

    fn redirect_to_login(&self) {
        tracing::warn!("Session rejected, login required");
    }
}

/// Keeps every notification for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
    redirects: AtomicUsize,
}

impl RecordingNotifier {
    /// Alerts received so far, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of login redirects requested.
    #[must_use]
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}
