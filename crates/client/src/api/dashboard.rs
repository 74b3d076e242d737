//! Read-only dashboard aggregates.

use pantry_core::Envelope;
use tracing::instrument;

use super::{ApiClient, RequestOptions};
use crate::error::ApiError;

/// Bucket size for the sales report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SalesPeriod {
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
}

impl SalesPeriod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for SalesPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SalesPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" => Ok(Self::Yearly),
            _ => Err(format!("invalid sales period: {s}")),
        }
    }
}

impl ApiClient {
    /// Headline counters.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<Envelope, ApiError> {
        self.send_envelope("/dashboard/stats", RequestOptions::get())
            .await
    }

    /// Sales series bucketed by `period`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(period = %period))]
    pub async fn sales_report(&self, period: SalesPeriod) -> Result<Envelope, ApiError> {
        let options = RequestOptions::get().query("period", period);
        self.send_envelope("/dashboard/sales", options).await
    }

    /// Best-selling items.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn top_items(&self, limit: u32) -> Result<Envelope, ApiError> {
        let options = RequestOptions::get().query("limit", limit);
        self.send_envelope("/dashboard/top-items", options).await
    }

    /// Most recent orders.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn recent_orders(&self, limit: u32) -> Result<Envelope, ApiError> {
        let options = RequestOptions::get().query("limit", limit);
        self.send_envelope("/dashboard/recent-orders", options)
            .await
    }
}
