//! Orders, checkout payloads, cancellations, and return requests.

use core::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::timestamp;
use crate::types::{
    Email, OrderId, OrderStatus, PaymentMethod, PaymentStatus, Price, ProductId, ReturnStatus,
    ShopSettings,
};
use crate::validation::{ValidationError, required};

/// Product snapshot embedded in an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: OrderItemProduct,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

/// Customer attached to an order in admin listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: Email,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub order_date: Option<NaiveDateTime>,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub total_amount: Price,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub delivered_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub return_status: Option<ReturnStatus>,
    #[serde(default)]
    pub return_reason: Option<String>,
    #[serde(default)]
    pub return_rejection_reason: Option<String>,
    #[serde(default)]
    pub refunded_amount: Option<Price>,
    #[serde(default)]
    pub user: Option<OrderCustomer>,
}

impl Order {
    /// Whether a cancel action should be offered.
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        !self.status.is_final()
    }

    /// Whether a return can still be requested at `now`.
    ///
    /// Requires a delivered order with no return on file, delivered within
    /// [`ShopSettings::RETURN_WINDOW_DAYS`].
    #[must_use]
    pub fn can_request_return(&self, now: NaiveDateTime) -> bool {
        if self.status != OrderStatus::Delivered || self.return_status.is_some() {
            return false;
        }
        self.delivered_at.is_some_and(|delivered| {
            delivered >= now - Duration::days(ShopSettings::RETURN_WINDOW_DAYS)
        })
    }

    fn is_cash_on_delivery(&self) -> bool {
        self.payment_method == PaymentMethod::CashOnDelivery
    }

    /// Prepaid order still waiting for payment confirmation.
    #[must_use]
    pub fn can_confirm_payment(&self) -> bool {
        !self.is_cash_on_delivery() && self.payment_status == PaymentStatus::Pending
    }

    /// Whether the status picker should be offered to an administrator.
    #[must_use]
    pub fn can_update_status(&self) -> bool {
        (self.is_cash_on_delivery() || self.payment_status == PaymentStatus::Confirmed)
            && !self.status.is_final()
    }

    /// Delivered cash-on-delivery order whose cash has not been recorded.
    #[must_use]
    pub fn can_confirm_cod_payment(&self) -> bool {
        self.is_cash_on_delivery()
            && self.status == OrderStatus::Delivered
            && self.payment_status == PaymentStatus::Pending
    }

    /// Whether any money went back to the customer.
    #[must_use]
    pub fn has_refund(&self) -> bool {
        self.refunded_amount.is_some_and(|amount| amount.is_positive())
    }
}

/// Admin order list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
    #[default]
    All,
    /// Not delivered, not cancelled, not fully refunded.
    Active,
    /// Refund completed.
    Refunded,
}

impl OrderFilter {
    /// Whether `order` belongs in this view.
    #[must_use]
    pub fn matches(self, order: &Order) -> bool {
        let refunded = order.return_status == Some(ReturnStatus::RefundCompleted);
        match self {
            Self::All => true,
            Self::Active => !order.status.is_final() && !refunded,
            Self::Refunded => refunded,
        }
    }
}

impl core::str::FromStr for OrderFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid order filter: {s}")),
        }
    }
}

/// Checkout shipping form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingDetails {
    pub street: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl Default for ShippingDetails {
    fn default() -> Self {
        Self {
            street: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: "India".to_string(),
        }
    }
}

impl ShippingDetails {
    /// Single-line address as stored on the order.
    ///
    /// # Errors
    ///
    /// Returns `IncompleteShipping` when street, state, or zip code is blank.
    pub fn to_address_line(&self) -> Result<String, ValidationError> {
        let street = self.street.trim();
        let state = self.state.trim();
        let zip_code = self.zip_code.trim();
        if street.is_empty() || state.is_empty() || zip_code.is_empty() {
            return Err(ValidationError::IncompleteShipping);
        }
        let country = match self.country.trim() {
            "" => "India",
            country => country,
        };
        Ok(format!("{street}, {state}, {zip_code}, {country}"))
    }
}

/// `POST /orders` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
    pub total_amount: Price,
}

/// Preset return reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnReason {
    WrongItem,
    Damaged,
    NotWorking,
    ChangeOfMind,
    Other,
}

impl ReturnReason {
    /// Every reason, in the order they are offered.
    pub const ALL: [Self; 5] = [
        Self::WrongItem,
        Self::Damaged,
        Self::NotWorking,
        Self::ChangeOfMind,
        Self::Other,
    ];

    /// Human-readable label sent to the backend.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WrongItem => "Wrong item received",
            Self::Damaged => "Damaged product",
            Self::NotWorking => "Not working properly",
            Self::ChangeOfMind => "Change of mind",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ReturnReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for ReturnReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|reason| reason.label().to_ascii_lowercase() == wanted)
            .or(match wanted.as_str() {
                "wrong-item" => Some(Self::WrongItem),
                "damaged" => Some(Self::Damaged),
                "not-working" => Some(Self::NotWorking),
                "change-of-mind" => Some(Self::ChangeOfMind),
                _ => None,
            })
            .ok_or_else(|| format!("invalid return reason: {s}"))
    }
}

/// A customer's return request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnRequest {
    reason: ReturnReason,
    details: Option<String>,
}

impl ReturnRequest {
    /// Validate the return form.
    ///
    /// # Errors
    ///
    /// Returns `MissingReturnReason` when no reason was picked.
    pub fn new(reason: Option<ReturnReason>, details: &str) -> Result<Self, ValidationError> {
        let reason = reason.ok_or(ValidationError::MissingReturnReason)?;
        let details = details.trim();
        Ok(Self {
            reason,
            details: (!details.is_empty()).then(|| details.to_string()),
        })
    }

    /// Reason text as sent to the backend: `reason` or `reason: details`.
    #[must_use]
    pub fn wire_reason(&self) -> String {
        match &self.details {
            Some(details) => format!("{}: {details}", self.reason.label()),
            None => self.reason.label().to_string(),
        }
    }
}

/// Validate a free-text cancellation or rejection reason.
///
/// # Errors
///
/// Returns `MissingReason` for blank input.
pub fn cancellation_reason(input: &str) -> Result<String, ValidationError> {
    required(input, "Reason").map_err(|_| ValidationError::MissingReason)
}

/// Admin status change, with the tracking number shipping requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
}

impl StatusUpdate {
    /// Validate a status change.
    ///
    /// # Errors
    ///
    /// Returns `MissingTrackingNumber` when moving to `SHIPPED` without one.
    pub fn new(status: OrderStatus, tracking_number: Option<&str>) -> Result<Self, ValidationError> {
        let tracking_number = tracking_number
            .map(str::trim)
            .filter(|tracking| !tracking.is_empty())
            .map(str::to_string);
        if status == OrderStatus::Shipped && tracking_number.is_none() {
            return Err(ValidationError::MissingTrackingNumber);
        }
        Ok(Self {
            status,
            tracking_number,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(json: serde_json::Value) -> Order {
        let mut base = serde_json::json!({
            "id": 41,
            "status": "DELIVERED",
            "paymentMethod": "Cash on Delivery",
            "paymentStatus": "PENDING",
            "totalAmount": 1180,
            "shippingAddress": "12 MG Road, Karnataka, 560001, India",
            "deliveredAt": "2025-03-01T10:00:00",
            "items": [{"product": {"id": 5, "name": "Headphones"}, "quantity": 1}]
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), json.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    fn at(raw: &str) -> NaiveDateTime {
        raw.parse().unwrap()
    }

    #[test]
    fn test_return_window_is_fifteen_days() {
        let delivered = order(serde_json::json!({}));
        assert!(delivered.can_request_return(at("2025-03-16T10:00:00")));
        assert!(!delivered.can_request_return(at("2025-03-16T10:00:01")));
    }

    #[test]
    fn test_return_requires_delivery_and_no_existing_return() {
        let shipped = order(serde_json::json!({"status": "SHIPPED"}));
        assert!(!shipped.can_request_return(at("2025-03-02T00:00:00")));

        let returned = order(serde_json::json!({"returnStatus": "REQUESTED"}));
        assert!(!returned.can_request_return(at("2025-03-02T00:00:00")));

        let undated = order(serde_json::json!({"deliveredAt": null}));
        assert!(!undated.can_request_return(at("2025-03-02T00:00:00")));
    }

    #[test]
    fn test_admin_payment_actions() {
        let cod_delivered = order(serde_json::json!({}));
        assert!(cod_delivered.can_confirm_cod_payment());
        assert!(!cod_delivered.can_confirm_payment());
        assert!(!cod_delivered.can_update_status());

        let upi_pending = order(serde_json::json!({"status": "ORDER_PLACED", "paymentMethod": "UPI"}));
        assert!(upi_pending.can_confirm_payment());
        assert!(!upi_pending.can_update_status());

        let upi_paid = order(serde_json::json!({
            "status": "PROCESSING",
            "paymentMethod": "UPI",
            "paymentStatus": "CONFIRMED"
        }));
        assert!(upi_paid.can_update_status());
        assert!(upi_paid.can_cancel());
    }

    #[test]
    fn test_order_filters() {
        let delivered = order(serde_json::json!({}));
        let refunded = order(serde_json::json!({"returnStatus": "REFUND_COMPLETED"}));
        let processing = order(serde_json::json!({"status": "PROCESSING"}));

        assert!(OrderFilter::All.matches(&delivered));
        assert!(!OrderFilter::Active.matches(&delivered));
        assert!(OrderFilter::Active.matches(&processing));
        assert!(OrderFilter::Refunded.matches(&refunded));
        assert!(!OrderFilter::Refunded.matches(&processing));
    }

    #[test]
    fn test_shipping_address_line() {
        let details = ShippingDetails {
            street: " 12 MG Road ".into(),
            state: "Karnataka".into(),
            zip_code: "560001".into(),
            ..ShippingDetails::default()
        };
        assert_eq!(
            details.to_address_line().unwrap(),
            "12 MG Road, Karnataka, 560001, India"
        );

        let missing = ShippingDetails {
            zip_code: String::new(),
            ..details
        };
        assert_eq!(
            missing.to_address_line(),
            Err(ValidationError::IncompleteShipping)
        );
    }

    #[test]
    fn test_new_order_body() {
        let body = NewOrder {
            shipping_address: "12 MG Road, Karnataka, 560001, India".into(),
            payment_method: PaymentMethod::Upi,
            total_amount: Price::from_rupees(1180),
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["paymentMethod"], "UPI");
        assert_eq!(json["totalAmount"], 1180.0);
    }

    #[test]
    fn test_return_request_reason_text() {
        let plain = ReturnRequest::new(Some(ReturnReason::Damaged), "  ").unwrap();
        assert_eq!(plain.wire_reason(), "Damaged product");

        let detailed = ReturnRequest::new(Some(ReturnReason::Other), "Box was open").unwrap();
        assert_eq!(detailed.wire_reason(), "Other: Box was open");

        assert_eq!(
            ReturnRequest::new(None, "whatever"),
            Err(ValidationError::MissingReturnReason)
        );
        assert_eq!(
            "change-of-mind".parse::<ReturnReason>().unwrap(),
            ReturnReason::ChangeOfMind
        );
    }

    #[test]
    fn test_status_update_requires_tracking_for_shipping() {
        assert_eq!(
            StatusUpdate::new(OrderStatus::Shipped, Some(" ")),
            Err(ValidationError::MissingTrackingNumber)
        );
        let shipped = StatusUpdate::new(OrderStatus::Shipped, Some("AWB123")).unwrap();
        assert_eq!(shipped.tracking_number.as_deref(), Some("AWB123"));
        assert!(StatusUpdate::new(OrderStatus::Processing, None).is_ok());
    }

    #[test]
    fn test_cancellation_reason() {
        assert_eq!(cancellation_reason(" late "), Ok("late".to_string()));
        assert_eq!(cancellation_reason(""), Err(ValidationError::MissingReason));
    }
}
