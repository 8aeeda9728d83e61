//! Persisted session state.
//!
//! [`LocalStore`] is a string key-value store with browser local-storage
//! semantics. [`SessionStorage`] layers the four keys the client uses on top
//! of it, with typed values:
//!
//! | Key | Value |
//! |---|---|
//! | `token` | bearer token, stored raw |
//! | `user` | JSON [`UserSummary`] |
//! | `localCart` | JSON [`GuestCart`] |
//! | `pendingCartItem` | JSON [`PendingCartIntent`] |

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use techmart_core::{GuestCart, PendingCartIntent, UserSummary};
use thiserror::Error;

/// Persisted key names.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER: &str = "user";
    pub const LOCAL_CART: &str = "localCart";
    pub const PENDING_CART_ITEM: &str = "pendingCartItem";
}

/// Errors writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A string key-value store.
///
/// Reads never fail: an unreadable store behaves like an empty one.
pub trait LocalStore: Send + Sync {
    /// Raw value under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrite `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be persisted.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the change cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every key.
    ///
    /// # Errors
    ///
    /// Returns error if the change cannot be persisted.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Typed access to the persisted session keys.
#[derive(Clone)]
pub struct SessionStorage {
    store: Arc<dyn LocalStore>,
}

impl SessionStorage {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// A storage backed by a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }

    /// Persisted bearer token.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.store
            .get(keys::TOKEN)
            .filter(|token| !token.is_empty())
            .map(SecretString::from)
    }

    /// # Errors
    ///
    /// Returns error if the token cannot be persisted.
    pub fn set_token(&self, token: &SecretString) -> Result<(), StorageError> {
        self.store
            .set(keys::TOKEN, token.expose_secret().to_string())
    }

    /// Persisted user summary.
    #[must_use]
    pub fn user(&self) -> Option<UserSummary> {
        self.read(keys::USER)
    }

    /// # Errors
    ///
    /// Returns error if the user cannot be persisted.
    pub fn set_user(&self, user: &UserSummary) -> Result<(), StorageError> {
        self.write(keys::USER, user)
    }

    /// Persisted guest cart; empty when absent or unreadable.
    #[must_use]
    pub fn guest_cart(&self) -> GuestCart {
        self.read(keys::LOCAL_CART).unwrap_or_default()
    }

    /// Whether a `localCart` entry exists at all.
    #[must_use]
    pub fn has_guest_cart(&self) -> bool {
        self.store.get(keys::LOCAL_CART).is_some()
    }

    /// Persist the guest cart. An empty cart deletes the key.
    ///
    /// # Errors
    ///
    /// Returns error if the cart cannot be persisted.
    pub fn set_guest_cart(&self, cart: &GuestCart) -> Result<(), StorageError> {
        if cart.is_empty() {
            return self.store.remove(keys::LOCAL_CART);
        }
        self.write(keys::LOCAL_CART, cart)
    }

    /// # Errors
    ///
    /// Returns error if the change cannot be persisted.
    pub fn remove_guest_cart(&self) -> Result<(), StorageError> {
        self.store.remove(keys::LOCAL_CART)
    }

    /// Persisted add-to-cart intent.
    #[must_use]
    pub fn pending_intent(&self) -> Option<PendingCartIntent> {
        self.read(keys::PENDING_CART_ITEM)
    }

    /// Record an intent, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns error if the intent cannot be persisted.
    pub fn set_pending_intent(&self, intent: &PendingCartIntent) -> Result<(), StorageError> {
        self.write(keys::PENDING_CART_ITEM, intent)
    }

    /// # Errors
    ///
    /// Returns error if the change cannot be persisted.
    pub fn remove_pending_intent(&self) -> Result<(), StorageError> {
        self.store.remove(keys::PENDING_CART_ITEM)
    }

    /// Delete `token`, `user`, and `localCart`. A pending intent survives.
    ///
    /// # Errors
    ///
    /// Returns the first error; every key is still attempted.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        let results = [keys::TOKEN, keys::USER, keys::LOCAL_CART].map(|key| self.store.remove(key));
        results.into_iter().collect()
    }

    /// Delete every persisted key.
    ///
    /// # Errors
    ///
    /// Returns error if the change cannot be persisted.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        self.store.clear()
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable stored value");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.store.set(key, serde_json::to_string(value)?)
    }
}

impl std::fmt::Debug for SessionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStorage")
            .field("has_token", &self.store.get(keys::TOKEN).is_some())
            .field("has_user", &self.store.get(keys::USER).is_some())
            .finish_non_exhaustive()
    }
}
