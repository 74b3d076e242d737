//! Per-entity mapping of backend payloads.
//!
//! The backend mixes `camelCase` and `snake_case` field names depending on
//! the endpoint. Each model here serializes with the canonical `camelCase`
//! names and accepts the `snake_case` spelling through serde aliases, so the
//! aliasing lives in exactly one place per entity.
//!
//! Models double as upsert payloads: a `None` id is skipped on
//! serialization, which is how the backend tells a create from an update.

pub mod cart;
pub mod catalog;
pub mod dashboard;
mod money;
pub mod order;
pub mod user;

pub use cart::CartItem;
pub use catalog::{Addon, Category, Flavor, Item};
pub use dashboard::{DashboardStats, SalesPoint, TopItem};
pub use order::{Order, OrderLine};
pub use user::{User, UserProfile};
