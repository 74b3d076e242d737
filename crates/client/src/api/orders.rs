//! Order operations.

use chrono::NaiveDate;
use pantry_core::{Envelope, OrderId, OrderStatus, VendorId};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use super::{ApiClient, RequestOptions, segment};
use crate::error::ApiError;

/// Optional filters for order listings. Unset fields are not sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    #[must_use]
    pub const fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    #[must_use]
    pub const fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Query parameters in wire order.
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(date) = self.start_date {
            pairs.push(("startDate", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.end_date {
            pairs.push(("endDate", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }

    fn apply(&self, options: RequestOptions) -> RequestOptions {
        self.pairs()
            .into_iter()
            .fold(options, |options, (key, value)| options.query(key, value))
    }
}

impl ApiClient {
    /// Place an order from an arbitrary payload.
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be encoded or the API request fails.
    #[instrument(skip(self, payload))]
    pub async fn create_order<P>(&self, payload: &P) -> Result<Envelope, ApiError>
    where
        P: Serialize + Sync + ?Sized,
    {
        let options = RequestOptions::post().json(payload)?;
        self.send_envelope("/orders", options).await
    }

    /// List orders.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Envelope, ApiError> {
        self.send_envelope("/orders", filter.apply(RequestOptions::get()))
            .await
    }

    /// List one vendor's orders.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(vendor_id = %vendor_id))]
    pub async fn vendor_orders(
        &self,
        vendor_id: VendorId,
        filter: &OrderFilter,
    ) -> Result<Envelope, ApiError> {
        let path = format!("/orders/vendor/{}", segment(vendor_id));
        self.send_envelope(&path, filter.apply(RequestOptions::get()))
            .await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Envelope, ApiError> {
        let path = format!("/orders/{}", segment(id));
        self.send_envelope(&path, RequestOptions::get()).await
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for [`OrderStatus::Unknown`], or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Envelope, ApiError> {
        if status == OrderStatus::Unknown {
            return Err(ApiError::InvalidRequest(
                "Cannot set an order to an unknown status".to_string(),
            ));
        }
        let path = format!("/orders/{}/status", segment(id));
        let body = json!({ "status": status });
        self.send_envelope(&path, RequestOptions::put().body(body))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_sends_nothing() {
        assert!(OrderFilter::default().pairs().is_empty());
    }

    #[test]
    fn test_filter_pairs() {
        let filter = OrderFilter::default()
            .between(
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            )
            .page(2, 25)
            .status(OrderStatus::OutForDelivery);

        assert_eq!(
            filter.pairs(),
            vec![
                ("startDate", "2026-03-01".to_string()),
                ("endDate", "2026-03-31".to_string()),
                ("page", "2".to_string()),
                ("limit", "25".to_string()),
                ("status", "out_for_delivery".to_string()),
            ]
        );
    }

    #[test]
    fn test_partial_filter() {
        let filter = OrderFilter {
            limit: Some(10),
            ..OrderFilter::default()
        };
        assert_eq!(filter.pairs(), vec![("limit", "10".to_string())]);
    }
}
