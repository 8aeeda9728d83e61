//! Server cart lines, the guest cart, and the pending add-to-cart intent.
//!
//! The server cart is owned by the backend; the client only ever holds the
//! last snapshot it fetched. The guest cart and the pending intent live in
//! local storage until the next login folds them into the server cart.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Product;
use crate::types::{CartItemId, Price, ProductId};

/// One line of the authenticated user's cart (`GET /cart`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CartLine {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Subtotal, tax, and grand total of a set of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
    pub quantity: u32,
}

impl CartTotals {
    /// Totals for `lines`.
    #[must_use]
    pub fn of(lines: &[CartLine]) -> Self {
        let subtotal: Price = lines.iter().map(CartLine::line_total).sum();
        let tax = subtotal.tax();
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
            quantity: lines
                .iter()
                .fold(0, |count, line| count.saturating_add(line.quantity)),
        }
    }
}

/// One entry of the guest cart (`localCart`).
///
/// Only `productId` and `quantity` are required; the snapshot fields let the
/// cart be displayed without a network call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCartEntry {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl GuestCartEntry {
    /// An entry with no product snapshot.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            name: None,
            price: None,
            image: None,
        }
    }
}

impl From<&GuestCartEntry> for CartLine {
    fn from(entry: &GuestCartEntry) -> Self {
        Self {
            id: CartItemId::from(entry.product_id),
            product_id: Some(entry.product_id),
            name: entry.name.clone().unwrap_or_default(),
            price: entry.price.unwrap_or_default(),
            image: entry.image.clone(),
            quantity: entry.quantity,
            brand: None,
            category: None,
        }
    }
}

/// Body element of `POST /cart/merge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The cart a shopper builds before signing in.
///
/// Entries are unique by product and always have a quantity of at least one.
/// Both rules are re-established whenever a stored cart is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GuestCart(Vec<GuestCartEntry>);

impl GuestCart {
    /// Build a cart from raw entries, merging duplicates and dropping empty ones.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = GuestCartEntry>) -> Self {
        let mut cart = Self::default();
        for entry in entries {
            cart.insert(entry);
        }
        cart
    }

    /// Add an entry, summing quantities when the product is already present.
    pub fn insert(&mut self, entry: GuestCartEntry) {
        if entry.quantity == 0 {
            return;
        }
        match self
            .0
            .iter_mut()
            .find(|existing| existing.product_id == entry.product_id)
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(entry.quantity),
            None => self.0.push(entry),
        }
    }

    /// Change a product's quantity by `delta`, removing it once it drops below one.
    ///
    /// Returns `false` when the product is not in the cart.
    pub fn adjust(&mut self, product_id: ProductId, delta: i32) -> bool {
        let Some(position) = self.position(product_id) else {
            return false;
        };
        let Some(entry) = self.0.get_mut(position) else {
            return false;
        };
        let next = i64::from(entry.quantity) + i64::from(delta);
        match u32::try_from(next) {
            Ok(quantity) if quantity >= 1 => entry.quantity = quantity,
            _ => {
                self.0.remove(position);
            }
        }
        true
    }

    /// Remove a product. Returns `false` when it was not in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        match self.position(product_id) {
            Some(position) => {
                self.0.remove(position);
                true
            }
            None => false,
        }
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.0.iter().position(|entry| entry.product_id == product_id)
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[GuestCartEntry] {
        &self.0
    }

    /// Whether the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Payload for `POST /cart/merge`.
    #[must_use]
    pub fn merge_lines(&self) -> Vec<MergeLine> {
        self.0
            .iter()
            .map(|entry| MergeLine {
                product_id: entry.product_id,
                quantity: entry.quantity,
            })
            .collect()
    }

    /// Display lines for the in-memory cart.
    #[must_use]
    pub fn to_cart_lines(&self) -> Vec<CartLine> {
        self.0.iter().map(CartLine::from).collect()
    }
}

impl<'de> Deserialize<'de> for GuestCart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<GuestCartEntry>::deserialize(deserializer).map(Self::from_entries)
    }
}

/// An add-to-cart attempted while signed out (`pendingCartItem`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCartIntent {
    pub product: Product,
    pub quantity: u32,
}
