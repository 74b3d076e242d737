//! Pantry Core - Shared types library.
//!
//! This crate provides the types shared by every Pantry component:
//! - `client` - HTTP client for the dashboard backend
//! - `cli` - Command-line host for the client
//!
//! # Architecture
//!
//! The core crate contains only types and payload mapping - no I/O and no
//! HTTP clients. The client hands backend payloads over as opaque JSON; the
//! [`models`] layer is the one place where field-name drift is normalized.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and order status
//! - [`envelope`] - The `{errorCode, errorMessage, data}` response wrapper
//! - [`models`] - Per-entity mapping of backend payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod envelope;
pub mod models;
pub mod types;

pub use envelope::{Envelope, MappingError};
pub use types::*;
