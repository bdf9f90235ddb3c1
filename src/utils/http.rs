//! Shared HTTP clients and the retrying GET used by every API call

use crate::constants::{HTTP_MAX_ATTEMPTS, HTTP_TIMEOUT_SECS};
use crate::utils::errors::ApiError;
use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::time::Duration;

static API_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .default_headers(headers)
        .user_agent(concat!("OpenSpot/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            log::error!("[Http] Failed to build API client, using defaults: {}", e);
            reqwest::Client::new()
        })
});

// No overall timeout: audio downloads can legitimately run for minutes
static STREAMING_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(concat!("OpenSpot/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            log::error!("[Http] Failed to build streaming client, using defaults: {}", e);
            reqwest::Client::new()
        })
});

/// Client for JSON API calls (30s timeout, JSON headers)
pub fn client() -> &'static reqwest::Client {
    &API_CLIENT
}

/// Client for long-running media downloads
pub fn streaming_client() -> &'static reqwest::Client {
    &STREAMING_CLIENT
}

/// GET with retry on transport errors (linear backoff).
/// HTTP error statuses are returned as `ApiError::Status` without retrying.
pub async fn retry_get(url: &str) -> Result<reqwest::Response, ApiError> {
    let mut last_error = None;

    for attempt in 1..=HTTP_MAX_ATTEMPTS {
        log::debug!("[Http] GET {} (attempt {}/{})", url, attempt, HTTP_MAX_ATTEMPTS);
        match client().get(url).send().await {
            Ok(response) => return check_status(response).await,
            Err(e) => {
                log::warn!(
                    "[Http] Request failed on attempt {}/{}: {}",
                    attempt,
                    HTTP_MAX_ATTEMPTS,
                    e
                );
                last_error = Some(e);
            }
        }
        if attempt < HTTP_MAX_ATTEMPTS {
            tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
        }
    }

    match last_error {
        Some(e) => Err(ApiError::Http(e)),
        None => Err(ApiError::Status {
            code: 0,
            message: "no attempts made".to_string(),
        }),
    }
}

/// Convert non-success responses into `ApiError::Status`, pulling a message
/// from the JSON body when the server provides one
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("An error occurred")
                .to_string()
        });

    let error = ApiError::Status {
        code: status.as_u16(),
        message,
    };
    if error.is_not_found() {
        log::debug!("[Http] Not found: {}", error);
    } else {
        log::error!("[Http] API Error: code={} message={}", error.code(), error);
    }
    Err(error)
}

/// Decode a JSON body into `T`, mapping failures into `ApiError::Decode`
pub async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
