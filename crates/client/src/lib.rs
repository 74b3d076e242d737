//! Pantry Client - HTTP client and session layer for the dashboard backend.
//!
//! # Architecture
//!
//! - [`api`] - [`ApiClient`] and one module per backend area (auth, catalog
//!   resources, cart, orders, dashboard, upload, payments)
//! - [`session`] - Durable token/profile storage and the session-expired hook
//! - [`config`] - Environment-driven configuration
//! - [`error`] - The single [`ApiError`] type every call returns
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use pantry_client::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::new(ClientConfig::from_env()?)?;
//! let categories = client.list_categories().await?;
//! if categories.is_success() {
//!     let rows: Vec<pantry_core::models::Category> = categories.list_as()?;
//!     tracing::info!(count = rows.len(), "Loaded categories");
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod session;

pub use api::{
    ApiClient, ApiClientBuilder, CardDetails, CartAddition, OrderFilter, PaymentMethod,
    RequestOptions, SalesPeriod, UploadResponse,
};
pub use config::{ClientConfig, ConfigError, PaymentConfig};
pub use error::ApiError;
pub use session::{
    FileStore, LogRedirect, MemoryStore, Session, SessionExpiredHandler, SessionStore, StoreError,
};
