//! List/get/save/delete for the dashboard's catalog and account resources.
//!
//! Every resource follows the same four routes under `/{resource}`. Save is
//! an upsert: the backend creates when the payload has no `id` and updates
//! when it does, so both cases go to `POST /{resource}/save`.

use pantry_core::{AddonId, CategoryId, Envelope, FlavorId, ItemId, UserId, VendorId};
use serde::Serialize;
use tracing::instrument;

use super::{ApiClient, RequestOptions, segment};
use crate::error::ApiError;

macro_rules! resource_ops {
    (
        $resource:literal, $id:ty,
        list = $list:ident, get = $get:ident, save = $save:ident, delete = $delete:ident
    ) => {
        impl ApiClient {
            #[doc = concat!("List ", $resource, ".")]
            ///
            /// # Errors
            ///
            /// Returns error if the API request fails.
            #[instrument(skip(self))]
            pub async fn $list(&self) -> Result<Envelope, ApiError> {
                self.send_envelope(concat!("/", $resource), RequestOptions::get())
                    .await
            }

            #[doc = concat!("Fetch one of ", $resource, " by ID.")]
            ///
            /// # Errors
            ///
            /// Returns error if the API request fails.
            #[instrument(skip(self), fields(id = %id))]
            pub async fn $get(&self, id: $id) -> Result<Envelope, ApiError> {
                let path = format!(concat!("/", $resource, "/{}"), segment(id));
                self.send_envelope(&path, RequestOptions::get()).await
            }

            #[doc = concat!("Create or update one of ", $resource, ".")]
            ///
            /// The payload is sent as given; its `id` decides create vs update.
            ///
            /// # Errors
            ///
            /// Returns error if the payload cannot be encoded or the API
            /// request fails.
            #[instrument(skip(self, payload))]
            pub async fn $save<P>(&self, payload: &P) -> Result<Envelope, ApiError>
            where
                P: Serialize + Sync + ?Sized,
            {
                let options = RequestOptions::post().json(payload)?;
                self.send_envelope(concat!("/", $resource, "/save"), options)
                    .await
            }

            #[doc = concat!("Delete one of ", $resource, " by ID.")]
            ///
            /// # Errors
            ///
            /// Returns error if the API request fails.
            #[instrument(skip(self), fields(id = %id))]
            pub async fn $delete(&self, id: $id) -> Result<Envelope, ApiError> {
                let path = format!(concat!("/", $resource, "/{}"), segment(id));
                self.send_envelope(&path, RequestOptions::delete()).await
            }
        }
    };
}

resource_ops!("users", UserId,
    list = list_users, get = get_user, save = save_user, delete = delete_user);
resource_ops!("vendors", VendorId,
    list = list_vendors, get = get_vendor, save = save_vendor, delete = delete_vendor);
resource_ops!("categories", CategoryId,
    list = list_categories, get = get_category, save = save_category, delete = delete_category);
resource_ops!("items", ItemId,
    list = list_items, get = get_item, save = save_item, delete = delete_item);
resource_ops!("addons", AddonId,
    list = list_addons, get = get_addon, save = save_addon, delete = delete_addon);
resource_ops!("flavors", FlavorId,
    list = list_flavors, get = get_flavor, save = save_flavor, delete = delete_flavor);

impl ApiClient {
    /// Items filed under one category.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn items_by_category(&self, category_id: CategoryId) -> Result<Envelope, ApiError> {
        let path = format!("/items/category/{}", segment(category_id));
        self.send_envelope(&path, RequestOptions::get()).await
    }

    /// Items sold by one vendor.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(vendor_id = %vendor_id))]
    pub async fn items_by_vendor(&self, vendor_id: VendorId) -> Result<Envelope, ApiError> {
        let path = format!("/items/vendor/{}", segment(vendor_id));
        self.send_envelope(&path, RequestOptions::get()).await
    }
}
