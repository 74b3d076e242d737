//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PANTRY_API_BASE_URL` - Backend base URL (e.g., `https://api.example.com/api`)
//!
//! ## Optional
//! - `PANTRY_REQUEST_TIMEOUT_MS` - Default per-call timeout (default: 15000)
//! - `PANTRY_UPLOAD_TIMEOUT_MS` - Image upload timeout (default: 60000)
//! - `PANTRY_LOGIN_PATH` - Login entry point reported on session expiry (default: /login)
//! - `PANTRY_SESSION_FILE` - Session file for hosts with durable storage
//!   (default: `$HOME/.pantry/session.json`)
//!
//! ## Optional (payments - enables payment-method creation at the POS)
//! - `STRIPE_SECRET_KEY` - Payment provider secret key
//! - `STRIPE_API_URL` - Payment-method endpoint (default: Stripe's)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Default per-call timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(15_000);

const DEFAULT_UPLOAD_TIMEOUT_MS: &str = "60000";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_PAYMENT_API_URL: &str = "https://api.stripe.com/v1/payment_methods";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &["your-", "changeme", "replace", "placeholder", "xxx"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash
    pub base_url: String,
    /// Timeout applied to calls that don't override it
    pub request_timeout: Duration,
    /// Upper bound for the multipart image upload
    pub upload_timeout: Duration,
    /// Login entry point handed to the session-expired handler
    pub login_path: String,
    /// Where file-backed hosts persist the session
    pub session_file: PathBuf,
    /// Third-party payment configuration
    pub payment: PaymentConfig,
}

/// Payment provider configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct PaymentConfig {
    /// Secret key; `None` disables payment-method creation
    pub secret_key: Option<SecretString>,
    /// Payment-method endpoint
    pub api_url: String,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field(
                "secret_key",
                &self.secret_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            api_url: DEFAULT_PAYMENT_API_URL.to_string(),
        }
    }
}

impl PaymentConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let secret_key = lookup("STRIPE_SECRET_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|key| {
                if let Some(pattern) = placeholder_pattern(&key) {
                    tracing::warn!(
                        "STRIPE_SECRET_KEY appears to be a placeholder (contains '{pattern}')"
                    );
                }
                SecretString::from(key)
            });

        Self {
            secret_key,
            api_url: lookup("STRIPE_API_URL")
                .unwrap_or_else(|| DEFAULT_PAYMENT_API_URL.to_string()),
        }
    }

    /// Whether payment-method creation can run.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.secret_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty())
    }
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            upload_timeout: Duration::from_millis(60_000),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            session_file: default_session_file(None),
            payment: PaymentConfig::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("PANTRY_API_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("PANTRY_API_BASE_URL".to_string()))?;
        let request_timeout = parse_millis(
            "PANTRY_REQUEST_TIMEOUT_MS",
            &lookup("PANTRY_REQUEST_TIMEOUT_MS").unwrap_or_else(|| "15000".to_string()),
        )?;
        let upload_timeout = parse_millis(
            "PANTRY_UPLOAD_TIMEOUT_MS",
            &lookup("PANTRY_UPLOAD_TIMEOUT_MS")
                .unwrap_or_else(|| DEFAULT_UPLOAD_TIMEOUT_MS.to_string()),
        )?;
        let session_file = lookup("PANTRY_SESSION_FILE")
            .map_or_else(|| default_session_file(lookup("HOME")), PathBuf::from);

        Ok(Self {
            base_url: normalize_base_url(&base_url)?,
            request_timeout,
            upload_timeout,
            login_path: lookup("PANTRY_LOGIN_PATH")
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            session_file,
            payment: PaymentConfig::from_lookup(&lookup),
        })
    }

    /// Override the default per-call timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the upload timeout.
    #[must_use]
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Override the login entry point.
    #[must_use]
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Override the session file location.
    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    /// Replace the payment configuration.
    #[must_use]
    pub fn with_payment(mut self, payment: PaymentConfig) -> Self {
        self.payment = payment;
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate the base URL and trim any trailing slash so `base + "/path"` is
/// well-formed.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).map_err(|e| {
        ConfigError::InvalidEnvVar("PANTRY_API_BASE_URL".to_string(), e.to_string())
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "PANTRY_API_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(trimmed.to_string())
}

/// Parse a positive millisecond count.
fn parse_millis(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let millis = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if millis == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_millis(millis))
}

fn default_session_file(home: Option<String>) -> PathBuf {
    home.or_else(|| std::env::var("HOME").ok())
        .map_or_else(|| PathBuf::from(".pantry"), |h| PathBuf::from(h).join(".pantry"))
        .join("session.json")
}

fn placeholder_pattern(secret: &str) -> Option<&'static str> {
    let lower = secret.to_lowercase();
    PLACEHOLDER_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lower.contains(pattern))
}
