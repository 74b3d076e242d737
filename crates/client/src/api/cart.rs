//! Cart operations. Each is one round trip; the client keeps no cart copy.

use pantry_core::{AddonId, CartItemId, Envelope, FlavorId, ItemId};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use super::{ApiClient, RequestOptions, segment};
use crate::error::ApiError;

/// A line to add to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddition {
    pub item_id: ItemId,
    pub quantity: u32,
    pub addon_ids: Vec<AddonId>,
    pub flavor_id: Option<FlavorId>,
}

impl CartAddition {
    /// `quantity` of `item_id` with no addons or flavor.
    #[must_use]
    pub const fn new(item_id: ItemId, quantity: u32) -> Self {
        Self {
            item_id,
            quantity,
            addon_ids: Vec::new(),
            flavor_id: None,
        }
    }

    #[must_use]
    pub fn with_addons(mut self, addon_ids: impl IntoIterator<Item = AddonId>) -> Self {
        self.addon_ids.extend(addon_ids);
        self
    }

    #[must_use]
    pub const fn with_flavor(mut self, flavor_id: FlavorId) -> Self {
        self.flavor_id = Some(flavor_id);
        self
    }
}

impl ApiClient {
    /// The current user's cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Envelope, ApiError> {
        self.send_envelope("/cart", RequestOptions::get()).await
    }

    /// Add a line to the cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, addition: &CartAddition) -> Result<Envelope, ApiError> {
        let options = RequestOptions::post().json(addition)?;
        self.send_envelope("/cart/add", options).await
    }

    /// Change the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn update_cart_quantity(
        &self,
        cart_item_id: CartItemId,
        quantity: u32,
    ) -> Result<Envelope, ApiError> {
        let body = json!({ "cartItemId": cart_item_id, "quantity": quantity });
        self.send_envelope("/cart/update", RequestOptions::put().body(body))
            .await
    }

    /// Remove one cart line.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, cart_item_id: CartItemId) -> Result<Envelope, ApiError> {
        let path = format!("/cart/remove/{}", segment(cart_item_id));
        self.send_envelope(&path, RequestOptions::delete()).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Envelope, ApiError> {
        self.send_envelope("/cart/clear", RequestOptions::delete())
            .await
    }
}
