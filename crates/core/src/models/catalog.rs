//! Catalog entities: categories, items and their customizations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AddonId, CategoryId, FlavorId, ItemId, VendorId};

/// A menu category owned by a vendor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "category_id")]
    pub id: Option<CategoryId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "image_url")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "vendor_id")]
    pub vendor_id: Option<VendorId>,
    #[serde(default = "default_true", alias = "is_active")]
    pub is_active: bool,
    #[serde(default, alias = "sort_order")]
    pub sort_order: i32,
}

/// A sellable menu item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "item_id")]
    pub id: Option<ItemId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "super::money")]
    pub price: Decimal,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "discount_price",
        with = "super::money::option"
    )]
    pub discount_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "category_id")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "vendor_id")]
    pub vendor_id: Option<VendorId>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "image_url")]
    pub image_url: Option<String>,
    #[serde(default = "default_true", alias = "is_available")]
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "addon_ids")]
    pub addon_ids: Vec<AddonId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "flavor_ids")]
    pub flavor_ids: Vec<FlavorId>,
}

impl Item {
    /// Price a customer pays before add-ons.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price
            .filter(|d| *d > Decimal::ZERO && *d < self.price)
            .unwrap_or(self.price)
    }
}

/// A paid extra that can be attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "addon_id")]
    pub id: Option<AddonId>,
    pub name: String,
    #[serde(default, with = "super::money")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "vendor_id")]
    pub vendor_id: Option<VendorId>,
    #[serde(default = "default_true", alias = "is_active")]
    pub is_active: bool,
}

/// A flavor variant of an item, optionally with a surcharge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flavor {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "flavor_id")]
    pub id: Option<FlavorId>,
    pub name: String,
    #[serde(default, alias = "extra_price", with = "super::money")]
    pub extra_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "vendor_id")]
    pub vendor_id: Option<VendorId>,
    #[serde(default = "default_true", alias = "is_active")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}
