//! Point-of-sale cart lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AddonId, CartItemId, FlavorId, ItemId};

/// One line of the server-side cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "cart_item_id")]
    pub id: Option<CartItemId>,
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
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "line_total",
        with = "super::money::option"
    )]
    pub line_total: Option<Decimal>,
}

impl CartItem {
    /// Line total as reported, or `unit_price * quantity` when absent.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.line_total
            .unwrap_or_else(|| self.unit_price * Decimal::from(self.quantity))
    }
}

const fn default_quantity() -> u32 {
    1
}

/// Sum of all line totals.
#[must_use]
pub fn cart_total(lines: &[CartItem]) -> Decimal {
    lines.iter().map(CartItem::total).sum()
}
