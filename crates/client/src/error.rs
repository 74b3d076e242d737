//! Error type for every call the client makes.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::session::StoreError;

/// Errors surfaced to callers of the API client.
///
/// Every failure arrives through this one type. Callers that only need the
/// message/status/code view use the accessors; callers that need to tell a
/// timeout from a dead network from a server rejection match on the variant.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The call did not receive a response before its deadline.
    #[error("Request timeout after {} ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    /// The transport failed before any response arrived.
    #[error("Network error: unable to reach the server")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Http {
        /// Server-supplied message, or a generic one naming the status.
        message: String,
        /// HTTP status code.
        status: u16,
        /// Application `errorCode` from the body, when present.
        code: Option<i64>,
        /// The full decoded body.
        details: Value,
    },

    /// Image upload failed. Deliberately coarse.
    #[error("Image upload failed")]
    Upload { status: Option<u16> },

    /// Payment-method creation was requested without a configured secret.
    #[error("Payment provider is not configured: STRIPE_SECRET_KEY is missing")]
    PaymentNotConfigured,

    /// The payment provider rejected the call.
    #[error("Payment provider error ({status}): {message}")]
    Payment { status: u16, message: String },

    /// Any other HTTP client failure.
    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body claimed to be JSON but was not.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A payload could not be mapped onto the expected model.
    #[error(transparent)]
    Mapping(#[from] pantry_core::MappingError),

    /// Session storage failed during login or logout.
    #[error("Session storage error: {0}")]
    Session(#[from] StoreError),

    /// The request could not be built from the given input.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Build the error for a non-success response from its decoded body.
    ///
    /// Prefers a non-empty `errorMessage`, then a non-empty `message`, then a
    /// generic message naming the status.
    #[must_use]
    pub fn from_response(status: u16, body: Value) -> Self {
        let message = string_field(&body, "errorMessage")
            .or_else(|| string_field(&body, "message"))
            .map_or_else(|| format!("Request failed with status {status}"), String::from);
        let code = body.get("errorCode").and_then(Value::as_i64);

        Self::Http {
            message,
            status,
            code,
            details: body,
        }
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Payment { status, .. } => Some(*status),
            Self::Upload { status } => *status,
            _ => None,
        }
    }

    /// Application error code from the response body.
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Http { code, .. } => *code,
            _ => None,
        }
    }

    /// Full decoded body of a failed response.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        match self {
            Self::Http { details, .. } => Some(details),
            _ => None,
        }
    }

    /// Whether the deadline elapsed.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the server could not be reached at all.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the backend rejected the session (the session is already
    /// torn down by the time the caller sees this).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }
}

fn string_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
