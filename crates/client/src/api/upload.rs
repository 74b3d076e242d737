//! Multipart image upload.
//!
//! Does not go through `request`: the body is multipart, the JSON
//! content-type is never sent, a 401 does not tear the session down, and
//! every failure collapses into the coarse [`ApiError::Upload`].

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::ApiClient;
use crate::error::ApiError;

const UPLOAD_PATH: &str = "/upload/image";
const PART_NAME: &str = "image";

/// Body returned by the upload endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadResponse {
    pub success: bool,
    pub url: Option<String>,
    pub message: Option<String>,
}

impl ApiClient {
    /// Upload an image and return the stored URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Upload` on any failure, with the status when one
    /// was received.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime_type: &str,
    ) -> Result<UploadResponse, ApiError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| {
                warn!(error = %e, mime_type, "Rejected upload MIME type");
                ApiError::Upload { status: None }
            })?;
        let form = Form::new().part(PART_NAME, part);

        let mut builder = self
            .inner
            .http
            .post(self.resolve_url(UPLOAD_PATH))
            .multipart(form);
        let bearer = self.bearer_header().map_err(|e| {
            warn!(error = %e, "Upload not sent");
            ApiError::Upload { status: None }
        })?;
        if let Some(bearer) = bearer {
            builder = builder.header(AUTHORIZATION, bearer);
        }

        let timeout = self.inner.config.upload_timeout;
        let response = match tokio::time::timeout(timeout, builder.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, "Upload transport failure");
                return Err(ApiError::Upload { status: None });
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis(), "Upload timed out");
                return Err(ApiError::Upload { status: None });
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Upload rejected");
            return Err(ApiError::Upload {
                status: Some(status.as_u16()),
            });
        }

        let body: UploadResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Upload response unreadable");
            ApiError::Upload {
                status: Some(status.as_u16()),
            }
        })?;
        debug!(url = body.url.as_deref().unwrap_or_default(), "Image uploaded");
        Ok(body)
    }
}
