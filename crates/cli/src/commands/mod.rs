//! Command implementations.

pub mod catalog;
pub mod dashboard;
pub mod orders;
pub mod session;
pub mod upload;

use std::sync::Arc;

use pantry_client::{ApiClient, ApiError, ClientConfig, ConfigError, FileStore};
use pantry_core::{Envelope, MappingError};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend answered with a non-zero `errorCode`.
    #[error("Rejected by backend (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// The response did not match the expected shape.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// No password on the command line or in `PANTRY_PASSWORD`.
    #[error("Password required: pass -p or set PANTRY_PASSWORD")]
    MissingPassword,

    /// Local file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Output could not be rendered.
    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

/// Build a client with a file-backed session.
pub fn client() -> Result<ApiClient, CliError> {
    let config = ClientConfig::from_env()?;
    let store = Arc::new(FileStore::new(config.session_file.clone()));

    let client = ApiClient::builder(config)
        .session_store(store)
        .on_session_expired(Arc::new(|login_path: &str| {
            tracing::warn!(
                "Session expired. Log in again with `pantry login` ({login_path})"
            );
        }))
        .build()?;
    Ok(client)
}

/// Fail on a non-zero `errorCode`.
pub fn accepted(envelope: Envelope) -> Result<Envelope, CliError> {
    if envelope.is_success() {
        return Ok(envelope);
    }
    Err(CliError::Rejected {
        code: envelope.code(),
        message: envelope
            .message()
            .unwrap_or("no message from backend")
            .to_string(),
    })
}

/// Log a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    tracing::info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
