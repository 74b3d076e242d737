//! Orders placed through the storefront or the point-of-sale checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AddonId, FlavorId, ItemId, OrderId, OrderStatus, UserId, VendorId};

/// A placed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "order_id")]
    pub id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "order_number")]
    pub order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "customer_id")]
    pub customer_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "customer_name")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "vendor_id")]
    pub vendor_id: Option<VendorId>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, alias = "total_amount", with = "super::money")]
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "payment_method")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "payment_method_id")]
    pub payment_method_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "delivery_address")]
    pub delivery_address: Option<String>,
    #[serde(default, alias = "order_items")]
    pub items: Vec<OrderLine>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of the line totals, for cross-checking `total_amount`.
    #[must_use]
    pub fn lines_total(&self) -> Decimal {
        self.items.iter().map(OrderLine::total).sum()
    }
}

/// One line of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(alias = "item_id")]
    pub item_id: ItemId,
    #[serde(default, alias = "item_name")]
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, alias = "unit_price", with = "super::money")]
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "addon_ids")]
    pub addon_ids: Vec<AddonId>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "flavor_id")]
    pub flavor_id: Option<FlavorId>,
}

impl OrderLine {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

const fn default_quantity() -> u32 {
    1
}
