//! Read-only aggregates for the dashboard landing page.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ItemId;

/// Headline counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    #[serde(alias = "total_orders")]
    pub total_orders: u64,
    #[serde(alias = "total_revenue", with = "super::money")]
    pub total_revenue: Decimal,
    #[serde(alias = "total_vendors")]
    pub total_vendors: u64,
    #[serde(alias = "total_items")]
    pub total_items: u64,
    #[serde(alias = "pending_orders")]
    pub pending_orders: u64,
    #[serde(alias = "today_orders")]
    pub today_orders: u64,
    #[serde(alias = "today_revenue", with = "super::money")]
    pub today_revenue: Decimal,
}

/// One bucket of a sales report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesPoint {
    #[serde(alias = "date")]
    pub label: String,
    pub orders: u64,
    #[serde(with = "super::money")]
    pub revenue: Decimal,
}

/// A best-selling item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopItem {
    #[serde(alias = "item_id")]
    pub item_id: ItemId,
    #[serde(alias = "item_name")]
    pub name: String,
    #[serde(alias = "quantity_sold")]
    pub quantity_sold: u64,
    #[serde(with = "super::money")]
    pub revenue: Decimal,
}
