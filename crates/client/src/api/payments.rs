//! Card payment-method creation against the payment provider.
//!
//! Talks to the provider directly: its own URL, its own secret in the
//! `Authorization` header, a form-encoded body, and never the session
//! token.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::ApiClient;
use crate::error::ApiError;

const PAYMENT_FAILED: &str = "Payment method creation failed";

/// Raw card data.
///
/// Implements `Debug` manually to redact the number and CVC.
#[derive(Clone)]
pub struct CardDetails {
    pub number: SecretString,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: SecretString,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &"[REDACTED]")
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

impl CardDetails {
    #[must_use]
    pub fn new(number: &str, exp_month: u8, exp_year: u16, cvc: &str) -> Self {
        Self {
            number: SecretString::from(number.replace([' ', '-'], "")),
            exp_month,
            exp_year,
            cvc: SecretString::from(cvc.trim().to_string()),
        }
    }

    fn form(&self) -> [(&'static str, String); 5] {
        [
            ("type", "card".to_string()),
            ("card[number]", self.number.expose_secret().to_string()),
            ("card[exp_month]", self.exp_month.to_string()),
            ("card[exp_year]", self.exp_year.to_string()),
            ("card[cvc]", self.cvc.expose_secret().to_string()),
        ]
    }
}

/// A payment method created by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ApiClient {
    /// Create a card payment method with the provider.
    ///
    /// # Errors
    ///
    /// - `ApiError::PaymentNotConfigured` if no secret key is configured;
    ///   nothing is sent
    /// - `ApiError::Timeout` / `ApiError::Network` on transport failure
    /// - `ApiError::Payment` on any non-success status, with the provider's
    ///   message when its body carries one
    #[instrument(skip(self, card))]
    pub async fn create_payment_method(
        &self,
        card: &CardDetails,
    ) -> Result<PaymentMethod, ApiError> {
        let payment = &self.inner.config.payment;
        let secret = payment
            .secret_key
            .as_ref()
            .filter(|key| !key.expose_secret().is_empty())
            .ok_or(ApiError::PaymentNotConfigured)?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", secret.expose_secret()))
            .map_err(|_| {
                ApiError::InvalidRequest("Payment secret is not a valid header value".to_string())
            })?;
        bearer.set_sensitive(true);

        let builder = self
            .inner
            .http
            .post(&payment.api_url)
            .header(AUTHORIZATION, bearer)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .form(&card.form());

        let timeout = self.inner.config.request_timeout;
        let response = match tokio::time::timeout(timeout, builder.send()).await {
            Err(_) => return Err(ApiError::Timeout { timeout }),
            Ok(Err(e)) => return Err(super::classify_send_error(e, timeout)),
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Payment provider body unreadable");
                String::new()
            }
        };

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| {
                    body.pointer("/error/message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| PAYMENT_FAILED.to_string());
            warn!(status = status.as_u16(), message = %message, "Payment provider rejected card");
            return Err(ApiError::Payment {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
        let method: PaymentMethod = pantry_core::envelope::decode(body)?;
        info!(payment_method_id = %method.id, "Payment method created");
        Ok(method)
    }
}
