//! Users, vendors and the cached session profile.

use serde::{Deserialize, Serialize};

use crate::types::{UserId, UserRole};

/// A dashboard account: admin, vendor or customer.
///
/// Vendors are users with the `vendor` role plus store details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "user_id")]
    pub id: Option<UserId>,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "full_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "phone_number")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "store_name")]
    pub store_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "image_url")]
    pub image_url: Option<String>,
    #[serde(default = "default_true", alias = "is_active")]
    pub is_active: bool,
    /// Vendors only: password on create, never returned by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub password: Option<String>,
}

impl User {
    /// Whether this account owns a store.
    #[must_use]
    pub fn is_vendor(&self) -> bool {
        self.role == Some(UserRole::Vendor)
    }
}

const fn default_true() -> bool {
    true
}

/// The denormalized profile cached next to the auth token.
///
/// Every field is optional: reading the cache must never fail, so a missing
/// or partially written profile decodes to the empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    #[serde(alias = "user_id")]
    pub id: Option<UserId>,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "full_name")]
    pub name: Option<String>,
}

impl UserProfile {
    /// True when nothing is cached.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.id.is_none() && self.email.is_none() && self.role.is_none() && self.name.is_none()
    }

    /// Parsed role, if it is one the dashboard knows.
    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }
}
