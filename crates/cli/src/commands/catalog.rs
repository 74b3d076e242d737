//! Categories, items and vendors.

use pantry_client::ApiClient;
use pantry_core::CategoryId;
use pantry_core::models::{Category, Item, User};

use super::{CliError, accepted, print_json};

pub async fn list_categories(client: &ApiClient) -> Result<(), CliError> {
    let categories: Vec<Category> = accepted(client.list_categories().await?)?.list_as()?;
    tracing::info!("{} categories", categories.len());
    print_json(&categories)
}

pub async fn get_category(client: &ApiClient, id: CategoryId) -> Result<(), CliError> {
    let category: Category = accepted(client.get_category(id).await?)?.data_as()?;
    print_json(&category)
}

pub async fn delete_category(client: &ApiClient, id: CategoryId) -> Result<(), CliError> {
    accepted(client.delete_category(id).await?)?;
    tracing::info!("Category {id} deleted");
    Ok(())
}

/// All items, or only those in `category`.
pub async fn list_items(client: &ApiClient, category: Option<CategoryId>) -> Result<(), CliError> {
    let envelope = match category {
        Some(id) => client.items_by_category(id).await?,
        None => client.list_items().await?,
    };
    let items: Vec<Item> = accepted(envelope)?.list_as()?;
    tracing::info!("{} items", items.len());
    print_json(&items)
}

pub async fn list_vendors(client: &ApiClient) -> Result<(), CliError> {
    let vendors: Vec<User> = accepted(client.list_vendors().await?)?.list_as()?;
    tracing::info!("{} vendors", vendors.len());
    print_json(&vendors)
}
