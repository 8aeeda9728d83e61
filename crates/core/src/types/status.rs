//! Status enums for users, orders, payments, and returns.
//!
//! The backend enforces every transition. The helpers here only answer "which
//! actions should be offered", the same way button visibility does on a screen.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// A shopper with a cart.
    #[default]
    Customer,
    /// A back-office operator. Administrators have no shopping cart.
    Admin,
}

impl Role {
    /// Whether this role owns a server-side cart.
    #[must_use]
    pub const fn has_cart(self) -> bool {
        matches!(self, Self::Customer)
    }
}

/// Order fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    OrderPlaced,
    PaymentPending,
    PaymentConfirmed,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Statuses an administrator can move an order to.
    pub const ADMIN_TARGETS: [Self; 5] = [
        Self::PaymentConfirmed,
        Self::Processing,
        Self::Shipped,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Whether the order has reached a final state.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Wire name, e.g. `OUT_FOR_DELIVERY`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderPlaced => "ORDER_PLACED",
            Self::PaymentPending => "PAYMENT_PENDING",
            Self::PaymentConfirmed => "PAYMENT_CONFIRMED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().replace('_', " "))
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        [
            Self::OrderPlaced,
            Self::PaymentPending,
            Self::PaymentConfirmed,
            Self::Processing,
            Self::Shipped,
            Self::OutForDelivery,
            Self::Delivered,
            Self::Cancelled,
        ]
        .into_iter()
        .find(|status| status.as_str() == wanted)
        .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Confirmed,
    Refunded,
}

/// How the shopper pays. Serialized with the human-readable labels the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

impl PaymentMethod {
    /// Wire label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on Delivery",
            Self::Upi => "UPI",
            Self::BankTransfer => "Bank Transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" | "cash on delivery" | "cash-on-delivery" => Ok(Self::CashOnDelivery),
            "upi" => Ok(Self::Upi),
            "bank" | "bank transfer" | "bank-transfer" => Ok(Self::BankTransfer),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Stage of the return workflow.
///
/// requested → approved / rejected → received → refund initiated → refund completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    Requested,
    Approved,
    Rejected,
    ReturnReceived,
    RefundInitiated,
    RefundCompleted,
    ReturnRejected,
}

/// Back-office action on a return request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnAction {
    Approve,
    Reject,
    MarkReceived,
    InitiateRefund,
    CompleteRefund,
}

impl ReturnStatus {
    /// Actions worth offering an administrator at this stage.
    #[must_use]
    pub const fn admin_actions(self) -> &'static [ReturnAction] {
        match self {
            Self::Requested => &[ReturnAction::Approve, ReturnAction::Reject],
            Self::Approved => &[ReturnAction::MarkReceived],
            Self::ReturnReceived => &[ReturnAction::InitiateRefund],
            Self::RefundInitiated => &[ReturnAction::CompleteRefund],
            Self::Rejected | Self::RefundCompleted | Self::ReturnRejected => &[],
        }
    }

    /// Short badge text for listings.
    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Requested => "Awaiting Approval",
            Self::Approved => "Awaiting Product",
            Self::Rejected => "Rejected",
            Self::ReturnReceived => "Product Received",
            Self::RefundInitiated => "Refund Processing",
            Self::RefundCompleted => "Refund Complete",
            Self::ReturnRejected => "Return Rejected",
        }
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.badge())
    }
}

/// Condition of a returned item on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCondition {
    Good,
    Damaged,
}

impl ItemCondition {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Damaged => "DAMAGED",
        }
    }
}

impl FromStr for ItemCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "damaged" => Ok(Self::Damaged),
            _ => Err(format!("invalid item condition: {s}")),
        }
    }
}
