//! Authentication: login, logout, OTP and password reset.

use pantry_core::Envelope;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use super::{ApiClient, RequestOptions};
use crate::error::ApiError;

impl ApiClient {
    /// Log in and persist the returned session.
    ///
    /// The token and `data.user` are stored together only when the envelope
    /// reports `errorCode == 0` and carries a token; any other outcome
    /// leaves storage untouched and is returned for the caller to inspect.
    ///
    /// # Errors
    ///
    /// Returns error if the call fails or the session cannot be stored.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        identifier: &str,
        password: &SecretString,
    ) -> Result<Envelope, ApiError> {
        let body = json!({
            "identifier": identifier,
            "password": password.expose_secret(),
        });
        let envelope = self
            .send_envelope("/auth/login", RequestOptions::post().body(body))
            .await?;

        if !envelope.is_success() {
            warn!(
                error_code = envelope.code(),
                message = envelope.message().unwrap_or_default(),
                "Login rejected"
            );
            return Ok(envelope);
        }

        let data = envelope.data.as_ref();
        let token = data
            .and_then(|d| d.get("token"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());

        if let Some(token) = token {
            let user = data
                .and_then(|d| d.get("user"))
                .cloned()
                .unwrap_or(Value::Null);
            self.session().set(token, &user)?;
            info!("Session stored");
        } else {
            warn!("Login succeeded without a token, nothing stored");
        }

        Ok(envelope)
    }

    /// Forget the session. Local only; safe to call when logged out.
    ///
    /// # Errors
    ///
    /// Returns error if the session store cannot be written.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Ask the backend to send a one-time password to `identifier`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn request_otp(&self, identifier: &str) -> Result<Envelope, ApiError> {
        self.send_envelope(
            "/auth/send-otp",
            RequestOptions::post().body(json!({ "identifier": identifier })),
        )
        .await
    }

    /// Check a one-time password.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, otp))]
    pub async fn verify_otp(&self, identifier: &str, otp: &str) -> Result<Envelope, ApiError> {
        self.send_envelope(
            "/auth/verify-otp",
            RequestOptions::post().body(json!({ "identifier": identifier, "otp": otp })),
        )
        .await
    }

    /// Set a new password using a verified one-time password.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, otp, new_password))]
    pub async fn reset_password(
        &self,
        identifier: &str,
        otp: &str,
        new_password: &SecretString,
    ) -> Result<Envelope, ApiError> {
        let body = json!({
            "identifier": identifier,
            "otp": otp,
            "newPassword": new_password.expose_secret(),
        });
        self.send_envelope("/auth/reset-password", RequestOptions::post().body(body))
            .await
    }
}
