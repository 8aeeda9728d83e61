//! TechMart client - session, cart, and back-office operations against the
//! storefront REST backend.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] - thin REST wrapper; attaches the persisted bearer
//!   token and tears the session down on any 401
//! - [`storage`] - the persisted key-value store standing in for browser local
//!   storage (`token`, `user`, `localCart`, `pendingCartItem`)
//! - [`context::AppContext`] - the single owner of session and cart state;
//!   bootstrap, login reconciliation, the cart mutation gateway, and logout
//! - [`notify::Notifier`] - where user-facing alerts and the login redirect go
//!
//! The backend is the source of truth for carts and orders. The client never
//! updates the cart optimistically: every mutation is followed by a refetch.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod notify;
pub mod storage;

pub use api::{AdminRequestError, ApiClient, ApiError, ProductImage};
pub use config::{ClientConfig, ConfigError, GuestCartRetention};
pub use context::{
    ADMIN_REQUIRED, AddOutcome, AppContext, AppState, LoginReport, Session, StepOutcome,
};
pub use error::ClientError;
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
pub use storage::{FileStore, LocalStore, MemoryStore, SessionStorage, StorageError};
