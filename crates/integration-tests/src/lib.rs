//! Integration test support for the Pantry API client.
//!
//! [`MockBackend`] is an `axum` server on an ephemeral loopback port. It
//! records every request it receives and answers from a table of scripted
//! responses keyed by method and path; unscripted routes get a 404.
//! [`Harness`] wires an [`ApiClient`] to a fresh backend with an in-memory
//! session and a counting session-expired handler.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pantry-integration-tests
//! ```

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use pantry_client::{ApiClient, ClientConfig, MemoryStore, SessionStore};
use serde_json::Value;
use tokio::task::JoinHandle;

// =============================================================================
// Scripted responses
// =============================================================================

/// A canned answer for one route.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: String,
    delay: Option<Duration>,
}

impl MockResponse {
    /// A JSON body with `application/json`.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status: status_code(status),
            content_type: Some("application/json"),
            body: body.to_string(),
            delay: None,
        }
    }

    /// A `{errorCode: 0, errorMessage: null, data}` envelope with status 200.
    #[must_use]
    pub fn envelope(data: Value) -> Self {
        Self::json(
            200,
            &serde_json::json!({ "errorCode": 0, "errorMessage": null, "data": data }),
        )
    }

    /// A plain-text body.
    #[must_use]
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status: status_code(status),
            content_type: Some("text/plain; charset=utf-8"),
            body: body.to_string(),
            delay: None,
        }
    }

    /// A body labelled JSON that is not.
    #[must_use]
    pub fn raw_json(status: u16, body: &str) -> Self {
        Self {
            status: status_code(status),
            content_type: Some("application/json"),
            body: body.to_string(),
            delay: None,
        }
    }

    /// Hold the response back for `delay`.
    #[must_use]
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// A header value as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body parsed as JSON, or `Null`.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// The body as lossy UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// =============================================================================
// Mock backend
// =============================================================================

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(Method, String), MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Loopback HTTP server with scripted routes. Shuts down on drop.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind `127.0.0.1:0` and start serving.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn start() -> io::Result<Self> {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Script the answer for `method path`. Later calls replace earlier ones.
    pub fn respond(&self, method: Method, path: &str, response: MockResponse) {
        self.state
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((method, path.to_string()), response);
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let path = parts.uri.path().to_string();
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: parts.method.clone(),
            path: path.clone(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        });

    let scripted = state
        .routes
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&(parts.method, path))
        .cloned();

    let Some(scripted) = scripted else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if let Some(delay) = scripted.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = Response::new(Body::from(scripted.body));
    *response.status_mut() = scripted.status;
    if let Some(content_type) = scripted.content_type {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

/// A loopback URL nothing is listening on.
///
/// # Errors
///
/// Returns error if a probe listener cannot be bound.
pub fn closed_port_url() -> io::Result<String> {
    let probe = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = probe.local_addr()?.port();
    drop(probe);
    Ok(format!("http://127.0.0.1:{port}"))
}

// =============================================================================
// Harness
// =============================================================================

/// Base path the harness mounts the API under.
pub const API_PREFIX: &str = "/api";

/// A client wired to a fresh mock backend.
pub struct Harness {
    pub backend: MockBackend,
    pub client: ApiClient,
    pub store: Arc<MemoryStore>,
    expirations: Arc<AtomicUsize>,
    login_paths: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    /// Backend plus a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the backend or client cannot be started.
    pub async fn start() -> io::Result<Self> {
        Self::with_config(|config| config).await
    }

    /// Backend plus a client whose configuration is adjusted by `tweak`.
    ///
    /// # Errors
    ///
    /// Returns error if the backend or client cannot be started.
    pub async fn with_config(
        tweak: impl FnOnce(ClientConfig) -> ClientConfig,
    ) -> io::Result<Self> {
        let backend = MockBackend::start().await?;
        let config =
            ClientConfig::new(&backend.url(API_PREFIX)).map_err(io::Error::other)?;
        let config = tweak(config);

        let store = Arc::new(MemoryStore::new());
        let expirations = Arc::new(AtomicUsize::new(0));
        let login_paths = Arc::new(Mutex::new(Vec::new()));

        let handler = {
            let expirations = Arc::clone(&expirations);
            let login_paths = Arc::clone(&login_paths);
            move |login_path: &str| {
                expirations.fetch_add(1, Ordering::SeqCst);
                login_paths
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(login_path.to_string());
            }
        };

        let client = ApiClient::builder(config)
            .session_store(Arc::clone(&store) as Arc<dyn SessionStore>)
            .on_session_expired(Arc::new(handler))
            .build()
            .map_err(io::Error::other)?;

        Ok(Self {
            backend,
            client,
            store,
            expirations,
            login_paths,
        })
    }

    /// Script a route under the API prefix.
    pub fn respond(&self, method: Method, endpoint: &str, response: MockResponse) {
        self.backend
            .respond(method, &format!("{API_PREFIX}{endpoint}"), response);
    }

    /// Store a token (and an empty profile) as if a login had happened.
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects the write.
    pub fn seed_session(&self, token: &str) -> Result<(), pantry_client::StoreError> {
        self.client
            .session()
            .set(token, &serde_json::json!({ "id": 1, "email": "ops@pantry.test" }))
    }

    /// How many times the session-expired handler ran.
    #[must_use]
    pub fn expirations(&self) -> usize {
        self.expirations.load(Ordering::SeqCst)
    }

    /// Login paths handed to the session-expired handler.
    #[must_use]
    pub fn login_paths(&self) -> Vec<String> {
        self.login_paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request the backend saw.
    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.backend.last_request()
    }
}
