//! Order snapshot types as reported by the active-order endpoint.
//!
//! Each poll replaces the whole snapshot — there is no partial merge, so
//! these types carry everything the presentation layer reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery status of an order.
///
/// Statuses progress forward through the delivery lifecycle; the backend is
/// the authority and the client never transitions an order locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Preparing,
    Assigning,
    Assigned,
    OutForDelivery,
    Delivered,
    Arrived,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Assigning => "assigning",
            Self::Assigned => "assigned",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Arrived => "arrived",
        }
    }

    /// Whether a delivery countdown makes sense for this status.
    ///
    /// Only orders with a partner actually en route get a ticking ETA.
    pub fn countdown_eligible(&self) -> bool {
        matches!(self, Self::Assigned | Self::OutForDelivery)
    }

    /// Whether the order has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Arrived)
    }
}

/// The delivery partner assigned to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPartner {
    /// Partner display name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Average rating, if the partner has any reviews yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Lifetime completed deliveries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliveries: Option<u32>,
}

/// A single line item on the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    /// Unit price in minor currency units.
    pub unit_price: u32,
}

/// Pricing breakdown as computed server-side.
///
/// Carried verbatim for display; the client performs no price arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OrderPricing {
    pub item_total: u32,
    pub delivery_fee: u32,
    pub taxes: u32,
    pub discount: u32,
    pub grand_total: u32,
}

/// Delivery destination with its optional descriptive fields.
///
/// The backend populates these inconsistently depending on how the address
/// was captured, so display fallbacks are centralized in
/// [`DeliveryAddress::display_line`] rather than scattered at call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeliveryAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
}

impl DeliveryAddress {
    /// Single display line for the address.
    ///
    /// Precedence: label, then street, then landmark, then a generic
    /// placeholder. Empty strings count as absent.
    pub fn display_line(&self) -> String {
        [&self.label, &self.street, &self.landmark]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("Selected location")
            .to_string()
    }
}

/// A full active-order snapshot.
///
/// This is the authoritative shape returned by `GET /orders/active`; the
/// tracking layer swaps the whole value on every successful poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Server-assigned order id.
    pub id: String,
    /// Current delivery status.
    pub status: OrderStatus,
    /// Assigned delivery partner, present from `assigned` onward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_partner: Option<DeliveryPartner>,
    /// When the partner was assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    /// Server ETA in minutes. Always minutes on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_minutes: Option<i64>,
    /// Tip added to this order, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_amount: Option<u32>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub pricing: OrderPricing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddress>,
}
