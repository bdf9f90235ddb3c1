// Stream URL resolution and raw downloads
use crate::models::StreamUrlResponse;
use crate::utils::errors::ApiError;
use crate::utils::http::{read_json, retry_get, streaming_client};

/// `GET /stream?trackId=` -> playable URL
pub async fn get_stream_url(track_id: &str) -> Result<String, ApiError> {
    let url = super::endpoint("/stream", &[("trackId", track_id)]);
    log::debug!("[Api] GET /stream trackId={}", track_id);

    let response = retry_get(&url).await?;
    let body: StreamUrlResponse = read_json(response).await?;
    stream_url_from(body)
}

fn stream_url_from(body: StreamUrlResponse) -> Result<String, ApiError> {
    match body.url {
        Some(url) if !url.trim().is_empty() => Ok(url),
        _ => {
            let error = ApiError::StreamUrlNotFound;
            log::error!("[Api] API Error: code={} message={}", error.code(), error);
            Err(error)
        }
    }
}

/// Fetch a whole file into memory (used for downloads)
pub async fn download_track_bytes(url: &str) -> Result<Vec<u8>, ApiError> {
    log::debug!("[Api] Downloading audio file");
    let response = streaming_client().get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            code: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("download failed")
                .to_string(),
        });
    }
    let bytes = response.bytes().await?;
    log::info!("[Api] Downloaded {} KB", bytes.len() / 1024);
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_url_is_not_found() {
        let ok = stream_url_from(StreamUrlResponse {
            url: Some("https://cdn/1.flac".to_string()),
        });
        assert_eq!(ok.unwrap(), "https://cdn/1.flac");

        for url in [None, Some(String::new()), Some("  ".to_string())] {
            let err = stream_url_from(StreamUrlResponse { url }).unwrap_err();
            assert_eq!(err.code(), "STREAM_URL_NOT_FOUND");
        }
    }
}
