//! Order listing and status changes.

use pantry_client::{ApiClient, OrderFilter};
use pantry_core::models::Order;
use pantry_core::{OrderId, OrderStatus};

use super::{CliError, accepted, print_json};

pub async fn list(client: &ApiClient, filter: &OrderFilter) -> Result<(), CliError> {
    let orders: Vec<Order> = accepted(client.list_orders(filter).await?)?.list_as()?;
    tracing::info!("{} orders", orders.len());
    print_json(&orders)
}

pub async fn get(client: &ApiClient, id: OrderId) -> Result<(), CliError> {
    let order: Order = accepted(client.get_order(id).await?)?.data_as()?;
    if !order.items.is_empty() && order.lines_total() != order.total_amount {
        tracing::warn!(
            "Order {id}: line items sum to {} but total is {}",
            order.lines_total(),
            order.total_amount
        );
    }
    print_json(&order)
}

pub async fn set_status(
    client: &ApiClient,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), CliError> {
    accepted(client.update_order_status(id, status).await?)?;
    tracing::info!("Order {id} is now {status}");
    Ok(())
}
