//! Wire models exchanged with the storefront backend.
//!
//! Field names follow the backend's camelCase JSON. Optional fields default to
//! `None` so older responses without them still parse.

pub mod admin;
pub mod cart;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use admin::{DashboardStats, ProductForm, StockSummary};
pub use cart::{CartLine, CartTotals, GuestCart, GuestCartEntry, MergeLine, PendingCartIntent};
pub use order::{
    NewOrder, Order, OrderCustomer, OrderFilter, OrderItem, OrderItemProduct, ReturnReason,
    ReturnRequest, ShippingDetails, StatusUpdate, cancellation_reason,
};
pub use product::Product;
pub use review::{NewReview, RatingSummary, Review, ReviewUpdate, user_has_reviewed};
pub use user::{
    AuthResponse, Credentials, ProfileUpdate, Registration, RegistrationForm, UserPatch, UserSummary,
};

/// Timestamps arrive as zone-less `LocalDateTime` strings, occasionally with an offset.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        raw.parse::<NaiveDateTime>()
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }
}
