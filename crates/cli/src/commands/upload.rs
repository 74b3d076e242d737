//! Image upload from a local file.

use std::path::Path;

use pantry_client::ApiClient;

use super::{CliError, print_json};

pub async fn image(client: &ApiClient, path: &Path) -> Result<(), CliError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());

    let uploaded = client
        .upload_image(bytes, &file_name, mime_for(path))
        .await?;
    print_json(&uploaded)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
