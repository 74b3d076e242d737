//! Dashboard backend API client.
//!
//! Every backend call goes through [`ApiClient::request`], which owns URL
//! resolution, default headers, bearer-token injection, the per-call
//! timeout, body decoding and error translation. The endpoint modules are
//! thin wrappers that fix a method, a path and a payload shape.
//!
//! Two calls deliberately bypass `request`: the multipart image upload
//! (coarse errors, no session teardown) and payment-method creation (a
//! third-party API with its own credentials).

mod auth;
mod cart;
mod dashboard;
mod orders;
mod payments;
mod resources;
mod upload;

pub use cart::CartAddition;
pub use dashboard::SalesPeriod;
pub use orders::OrderFilter;
pub use payments::{CardDetails, PaymentMethod};
pub use upload::UploadResponse;

use std::sync::Arc;
use std::time::Duration;

use pantry_core::Envelope;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::{LogRedirect, Session, SessionExpiredHandler, SessionStore};

/// Options for a single call: method, extra headers, JSON body, query and
/// an optional timeout override.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    headers: HeaderMap,
    omit_headers: Vec<HeaderName>,
    body: Option<Value>,
    query: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    /// Options for `method` with no body.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            omit_headers: Vec::new(),
            body: None,
            query: Vec::new(),
            timeout: None,
        }
    }

    /// `GET` options.
    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// `POST` options.
    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// `PUT` options.
    #[must_use]
    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    /// `DELETE` options.
    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach any serializable payload as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the payload cannot be encoded.
    pub fn json<B: Serialize + ?Sized>(self, payload: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(payload)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode payload: {e}")))?;
        Ok(self.body(value))
    }

    /// Add or override a header. Caller headers win over the defaults.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Drop a default header (e.g. `Content-Type` for non-JSON bodies).
    #[must_use]
    pub fn without_header(mut self, name: HeaderName) -> Self {
        self.omit_headers.push(name);
        self
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Override the client's default timeout for this call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }
}

/// Dashboard backend API client.
///
/// Cheap to clone; clones share the HTTP connection pool and the session.
/// The client imposes no queueing or concurrency limit: calls are
/// independent and may be in flight simultaneously.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    session: Session,
    on_expired: Arc<dyn SessionExpiredHandler>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn SessionStore>>,
    on_expired: Arc<dyn SessionExpiredHandler>,
}

impl ApiClientBuilder {
    /// Persist the session in `store`. Defaults to an in-memory store.
    #[must_use]
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register the host's reaction to a rejected session.
    /// Defaults to [`LogRedirect`].
    #[must_use]
    pub fn on_session_expired(mut self, handler: Arc<dyn SessionExpiredHandler>) -> Self {
        self.on_expired = handler;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let http = reqwest::Client::builder().build()?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(crate::session::MemoryStore::new()));

        Ok(ApiClient {
            inner: Arc::new(ApiClientInner {
                http,
                config: self.config,
                session: Session::new(store),
                on_expired: self.on_expired,
            }),
        })
    }
}

impl ApiClient {
    /// Start building a client for `config`.
    #[must_use]
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            store: None,
            on_expired: Arc::new(LogRedirect),
        }
    }

    /// Client with an in-memory session and the default expiry handler.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Self::builder(config).build()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The session this client reads and writes.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Token presence only; no expiry or signature check.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.session.is_authenticated()
    }

    /// The cached user profile, or the empty profile.
    #[must_use]
    pub fn user_data(&self) -> pantry_core::models::UserProfile {
        self.inner.session.user_data()
    }

    /// Resolve an endpoint against the base URL.
    ///
    /// Absolute http(s) URLs are used verbatim; anything else is appended to
    /// the base URL as-is.
    #[must_use]
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if is_absolute_url(endpoint) {
            endpoint.to_string()
        } else {
            format!("{}{endpoint}", self.inner.config.base_url)
        }
    }

    /// Issue a call and return the decoded body.
    ///
    /// Success statuses return the body untouched, including any non-zero
    /// `errorCode` inside it. A 401 tears the session down and notifies the
    /// session-expired handler before the error is returned.
    ///
    /// # Errors
    ///
    /// - `ApiError::Timeout` if no response arrives within the timeout
    /// - `ApiError::Network` if the server cannot be reached
    /// - `ApiError::Http` for any non-success status
    /// - `ApiError::Decode` if a JSON-typed body does not parse
    #[instrument(skip(self, options), fields(method = %options.method, endpoint = %endpoint))]
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let url = self.build_url(endpoint, &options.query)?;
        let timeout = options.timeout.unwrap_or(self.inner.config.request_timeout);
        let headers = self.build_headers(&options)?;

        let mut builder = self
            .inner
            .http
            .request(options.method.clone(), url)
            .headers(headers);
        if let Some(body) = &options.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {e}")))?;
            builder = builder.body(bytes);
        }

        // The deadline covers dispatch up to the response head; it is gone
        // before the body is read.
        let response = match tokio::time::timeout(timeout, builder.send()).await {
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis(), "Request timed out");
                return Err(ApiError::Timeout { timeout });
            }
            Ok(Err(e)) => return Err(classify_send_error(e, timeout)),
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
        }

        let body = decode_body(response).await?;

        if status.is_success() {
            debug!(status = status.as_u16(), "Request succeeded");
            return Ok(body);
        }

        let error = ApiError::from_response(status.as_u16(), body);
        warn!(status = status.as_u16(), error = %error, "Request failed");
        Err(error)
    }

    /// `request` followed by envelope decoding.
    pub(crate) async fn send_envelope(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Envelope, ApiError> {
        let body = self.request(endpoint, options).await?;
        Ok(Envelope::try_from(body)?)
    }

    /// Clear the session and hand control to the host. Best-effort: a
    /// storage failure is logged, never raised.
    fn expire_session(&self) {
        if let Err(e) = self.inner.session.clear() {
            warn!(error = %e, "Failed to clear session after 401");
        }
        warn!("Session rejected by backend, session cleared");
        self.inner
            .on_expired
            .session_expired(&self.inner.config.login_path);
    }

    fn build_url(&self, endpoint: &str, query: &[(String, String)]) -> Result<String, ApiError> {
        let resolved = self.resolve_url(endpoint);
        if query.is_empty() {
            return Ok(resolved);
        }

        let mut url = url::Url::parse(&resolved)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid URL {resolved}: {e}")))?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url.into())
    }

    fn build_headers(&self, options: &RequestOptions) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        headers.extend(options.headers.clone());
        for name in &options.omit_headers {
            headers.remove(name);
        }

        if let Some(value) = self.bearer_header()? {
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// `Bearer <token>` when a token is stored.
    fn bearer_header(&self) -> Result<Option<HeaderValue>, ApiError> {
        let Some(token) = self.inner.session.token() else {
            return Ok(None);
        };
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| {
                ApiError::InvalidRequest("Stored auth token is not a valid header value".to_string())
            })?;
        value.set_sensitive(true);
        Ok(Some(value))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn is_absolute_url(endpoint: &str) -> bool {
    url::Url::parse(endpoint).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Map a failed `send` onto the error taxonomy.
fn classify_send_error(error: reqwest::Error, timeout: Duration) -> ApiError {
    if error.is_timeout() {
        warn!(timeout_ms = timeout.as_millis(), "Request timed out");
        ApiError::Timeout { timeout }
    } else if error.is_builder() {
        ApiError::Transport(error)
    } else {
        warn!(error = %error, "Network failure before any response");
        ApiError::Network(error)
    }
}

/// JSON bodies are parsed; anything else is wrapped as `{"message": text}`.
async fn decode_body(response: reqwest::Response) -> Result<Value, ApiError> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));

    let text = response.text().await?;

    if !is_json {
        return Ok(json!({ "message": text }));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Percent-free path segment for an ID or other caller-supplied value.
pub(crate) fn segment(value: impl std::fmt::Display) -> String {
    url::form_urlencoded::byte_serialize(value.to_string().as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::session::{MemoryStore, TOKEN_KEY};

    fn client_with_store(store: Arc<MemoryStore>) -> ApiClient {
        let config = ClientConfig::new("https://api.pantry.test/api/").unwrap();
        ApiClient::builder(config).session_store(store).build().unwrap()
    }

    #[test]
    fn test_resolve_relative_endpoint() {
        let client = client_with_store(Arc::new(MemoryStore::new()));
        assert_eq!(
            client.resolve_url("/categories"),
            "https://api.pantry.test/api/categories"
        );
    }

    #[test]
    fn test_resolve_absolute_endpoint() {
        let client = client_with_store(Arc::new(MemoryStore::new()));
        assert_eq!(
            client.resolve_url("https://cdn.pantry.test/upload"),
            "https://cdn.pantry.test/upload"
        );
        assert_eq!(
            client.resolve_url("http://localhost:9000/x"),
            "http://localhost:9000/x"
        );
    }

    #[test]
    fn test_build_url_appends_query() {
        let client = client_with_store(Arc::new(MemoryStore::new()));
        let url = client
            .build_url(
                "/orders",
                &[
                    ("status".to_string(), "pending".to_string()),
                    ("page".to_string(), "2".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(url, "https://api.pantry.test/api/orders?status=pending&page=2");
    }

    #[test]
    fn test_default_headers_without_token() {
        let client = client_with_store(Arc::new(MemoryStore::new()));
        let headers = client.build_headers(&RequestOptions::get()).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[ACCEPT], "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_token_injected_as_bearer() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "t1").unwrap();
        let client = client_with_store(store);

        let headers = client.build_headers(&RequestOptions::get()).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer t1");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(client.session().token().unwrap().expose_secret(), "t1");
    }

    #[test]
    fn test_caller_headers_override_and_omit_defaults() {
        let client = client_with_store(Arc::new(MemoryStore::new()));
        let options = RequestOptions::post()
            .header(ACCEPT, HeaderValue::from_static("text/csv"))
            .header(
                HeaderName::from_static("x-vendor"),
                HeaderValue::from_static("9"),
            )
            .without_header(CONTENT_TYPE);

        let headers = client.build_headers(&options).unwrap();
        assert_eq!(headers[ACCEPT], "text/csv");
        assert_eq!(headers.get_all(ACCEPT).iter().count(), 1);
        assert_eq!(headers["x-vendor"], "9");
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_invalid_stored_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "bad\ntoken").unwrap();
        let client = client_with_store(store);
        let result = client.build_headers(&RequestOptions::get());
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_segment_escapes() {
        assert_eq!(segment(42), "42");
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("https://x.test/a"));
        assert!(!is_absolute_url("/relative"));
        assert!(!is_absolute_url("mailto:ops@pantry.test"));
    }

    #[test]
    fn test_json_options() {
        let options = RequestOptions::post()
            .json(&serde_json::json!({"id": 1}))
            .unwrap()
            .timeout(Duration::from_millis(50));
        assert_eq!(options.method(), &Method::POST);
        assert_eq!(options.body, Some(serde_json::json!({"id": 1})));
        assert_eq!(options.timeout, Some(Duration::from_millis(50)));
    }
}
