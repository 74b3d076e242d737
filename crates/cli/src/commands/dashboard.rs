//! Dashboard summary.

use pantry_client::{ApiClient, SalesPeriod};
use pantry_core::models::{DashboardStats, SalesPoint};

use super::{CliError, accepted, print_json};

/// Stats and sales fetched concurrently.
pub async fn show(client: &ApiClient, period: SalesPeriod) -> Result<(), CliError> {
    let (stats, sales) = tokio::join!(client.dashboard_stats(), client.sales_report(period));

    let stats: DashboardStats = accepted(stats?)?.data_as()?;
    let sales: Vec<SalesPoint> = accepted(sales?)?.list_as()?;

    tracing::info!(
        "{} orders, {} revenue, {} pending",
        stats.total_orders,
        stats.total_revenue,
        stats.pending_orders
    );
    print_json(&sales)
}
