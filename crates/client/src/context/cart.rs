//! Cart mutation gateway.
//!
//! Signed in, every change goes to the backend and is followed by a full
//! refetch. Signed out, adds become a pending intent for the next login while
//! quantity changes and removals edit the persisted guest cart.

use tracing::instrument;

use techmart_core::{CartItemId, GuestCart, PendingCartIntent, Product, ProductId, ValidationError};

use super::AppContext;
use super::login::ADDED_TO_CART;
use crate::error::ClientError;

const LOGIN_TO_ADD: &str = "Please login to add items to cart";
const ADD_FAILED: &str = "Failed to add product to cart";
const UPDATE_FAILED: &str = "Failed to update quantity";
const REMOVE_FAILED: &str = "Failed to remove item";

/// What [`AppContext::add_to_cart`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The server cart now holds the item.
    Added,
    /// Signed out: saved as the pending intent, applied at the next login.
    Deferred,
}

impl AppContext {
    /// Add `quantity` units of `product`.
    ///
    /// # Errors
    ///
    /// Returns error for a zero quantity, if the intent cannot be saved, or
    /// if the backend refuses the add. Failures are also alerted.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_cart(
        &mut self,
        product: &Product,
        quantity: u32,
    ) -> Result<AddOutcome, ClientError> {
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity.into());
        }

        let Some(email) = self
            .user()
            .filter(|_| self.is_authenticated())
            .map(|user| user.email.clone())
        else {
            let intent = PendingCartIntent {
                product: product.clone(),
                quantity,
            };
            self.storage().set_pending_intent(&intent)?;
            tracing::info!("Saved pending cart item until login");
            self.notifier().alert(LOGIN_TO_ADD);
            return Ok(AddOutcome::Deferred);
        };

        let result = self.api.add_to_cart(&email, product.id, quantity).await;
        if let Err(e) = self.call(result) {
            tracing::error!(error = %e, "Error adding to cart");
            self.notifier().alert(ADD_FAILED);
            return Err(e);
        }

        self.refresh_after_mutation().await;
        self.notifier().alert(ADDED_TO_CART);
        Ok(AddOutcome::Added)
    }

    /// Change a line's quantity by `delta`.
    ///
    /// A result below one removes the line instead; a non-positive quantity
    /// is never sent. Unknown lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the change; it is also alerted.
    #[instrument(skip(self))]
    pub async fn update_quantity(&mut self, item_id: CartItemId, delta: i32) -> Result<(), ClientError> {
        let Some(line) = self.state.cart.iter().find(|line| line.id == item_id) else {
            tracing::debug!("Ignoring quantity change for unknown cart line");
            return Ok(());
        };
        let product_id = line.product_id;
        let next = i64::from(line.quantity) + i64::from(delta);
        let Some(quantity) = u32::try_from(next).ok().filter(|quantity| *quantity >= 1) else {
            return self.remove_item(item_id).await;
        };

        let Some(email) = self.cart_owner() else {
            let product_id = product_id.unwrap_or_else(|| ProductId::new(item_id.as_i64()));
            return self.edit_guest_cart(UPDATE_FAILED, |cart| {
                cart.adjust(product_id, delta);
            });
        };

        let result = self.api.update_cart_item(&email, item_id, quantity).await;
        if let Err(e) = self.call(result) {
            tracing::error!(error = %e, "Error updating quantity");
            self.notifier().alert(UPDATE_FAILED);
            return Err(e);
        }

        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the removal; it is also alerted.
    #[instrument(skip(self))]
    pub async fn remove_item(&mut self, item_id: CartItemId) -> Result<(), ClientError> {
        let Some(email) = self.cart_owner() else {
            let product_id = self
                .state
                .cart
                .iter()
                .find(|line| line.id == item_id)
                .and_then(|line| line.product_id)
                .unwrap_or_else(|| ProductId::new(item_id.as_i64()));
            return self.edit_guest_cart(REMOVE_FAILED, |cart| {
                cart.remove(product_id);
            });
        };

        let result = self.api.remove_cart_item(&email, item_id).await;
        if let Err(e) = self.call(result) {
            tracing::error!(error = %e, "Error removing item");
            self.notifier().alert(REMOVE_FAILED);
            return Err(e);
        }

        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Refetch after a successful mutation. A failed refetch is logged and
    /// leaves the last snapshot in place.
    async fn refresh_after_mutation(&mut self) {
        if let Err(e) = self.refresh_cart().await {
            tracing::error!(error = %e, "Error loading cart");
        }
    }

    /// Apply `edit` to the persisted guest cart and reload it into memory.
    fn edit_guest_cart(
        &mut self,
        failure: &str,
        edit: impl FnOnce(&mut GuestCart),
    ) -> Result<(), ClientError> {
        let storage = self.storage();
        let mut guest = storage.guest_cart();
        edit(&mut guest);
        if let Err(e) = storage.set_guest_cart(&guest) {
            tracing::error!(error = %e, "Error saving guest cart");
            self.notifier().alert(failure);
            return Err(e.into());
        }
        self.state.cart = guest.to_cart_lines();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use techmart_core::GuestCartEntry;

    use super::*;
    use crate::config::GuestCartRetention;
    use crate::context::tests::offline_api;
    use crate::storage::SessionStorage;

    fn headphones() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Noise Cancelling Headphones",
            "price": 7999,
            "stock": 12
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_guest_add_defers_without_network() {
        let storage = SessionStorage::in_memory();
        let (api, notifier) = offline_api(storage.clone());
        let mut context = AppContext::bootstrap(api, GuestCartRetention::default()).await;

        let outcome = context.add_to_cart(&headphones(), 2).await.unwrap();
        assert_eq!(outcome, AddOutcome::Deferred);

        let intent = storage.pending_intent().unwrap();
        assert_eq!(intent.product.id, ProductId::new(5));
        assert_eq!(intent.quantity, 2);
        assert_eq!(notifier.alerts(), vec![LOGIN_TO_ADD]);
        assert_eq!(notifier.redirects(), 0);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let (api, _) = offline_api(SessionStorage::in_memory());
        let mut context = AppContext::bootstrap(api, GuestCartRetention::default()).await;
        assert!(matches!(
            context.add_to_cart(&headphones(), 0).await,
            Err(ClientError::Validation(ValidationError::InvalidQuantity))
        ));
    }

    #[tokio::test]
    async fn test_guest_quantity_changes_edit_local_cart() {
        let storage = SessionStorage::in_memory();
        storage
            .set_guest_cart(&GuestCart::from_entries([
                GuestCartEntry::new(ProductId::new(5), 2),
                GuestCartEntry::new(ProductId::new(8), 1),
            ]))
            .unwrap();
        let (api, _) = offline_api(storage.clone());
        let mut context = AppContext::bootstrap(api, GuestCartRetention::default()).await;

        context.update_quantity(CartItemId::new(5), 1).await.unwrap();
        assert_eq!(storage.guest_cart().entries().first().unwrap().quantity, 3);

        context.update_quantity(CartItemId::new(8), -1).await.unwrap();
        assert_eq!(storage.guest_cart().len(), 1);
        assert_eq!(context.cart().len(), 1);

        context.update_quantity(CartItemId::new(99), 1).await.unwrap();
        assert_eq!(context.cart().len(), 1);

        context.remove_item(CartItemId::new(5)).await.unwrap();
        assert!(context.cart().is_empty());
        assert!(!storage.has_guest_cart());
    }
}
