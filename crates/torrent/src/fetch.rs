//! Full download of the `.torrent` file into memory

use reqwest::{Client, Request, Response};

use crate::error::{ValidationError, ValidationResult};

/// Execute a prepared GET request and buffer the whole body
///
/// The request goes through the shared client, so any tracker session
/// cookies are attached. Reading stops with `TooLarge` once the body grows
/// past `max_bytes`, which covers servers that lied in the HEAD probe.
///
/// # Errors
/// * `DownloadFailed` on transport errors and non-success statuses
/// * `TooLarge` when the body exceeds `max_bytes`
pub async fn fetch(client: &Client, request: Request, max_bytes: u64) -> ValidationResult<Vec<u8>> {
    let url = request.url().clone();
    tracing::debug!("Downloading {}", url);

    let mut response = client
        .execute(request)
        .await
        .and_then(Response::error_for_status)
        .map_err(|e| ValidationError::download(&url, e))?;

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ValidationError::download(&url, e))?
    {
        let received = (body.len() + chunk.len()) as u64;
        if received > max_bytes {
            tracing::warn!("{} exceeded {} bytes while downloading", url, max_bytes);
            return Err(ValidationError::too_large(&url, received, max_bytes));
        }
        body.extend_from_slice(&chunk);
    }

    tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
    Ok(body)
}
