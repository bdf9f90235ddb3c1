use thiserror::Error;

/// Errors returned by the streaming API client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Stream URL not found in API response")]
    StreamUrlNotFound,

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Stable machine-readable code, logged alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Http(_) => "HTTP_ERROR",
            ApiError::Status { .. } => "API_STATUS",
            ApiError::StreamUrlNotFound => "STREAM_URL_NOT_FOUND",
            ApiError::Decode(_) => "DECODE_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { code: 404, .. })
    }
}

/// Errors raised by an audio deck
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio output device available: {0}")]
    NoOutputDevice(String),

    #[error("failed to create audio sink: {0}")]
    Sink(#[from] rodio::PlayError),

    #[error("nothing loaded on this deck")]
    NothingLoaded,

    #[error("decoder error: {0}")]
    Decode(String),

    #[error("stream error: {0}")]
    Stream(String),
}

/// Errors raised by the key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no data directory available on this platform")]
    NoDataDir,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while saving a track to disk
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("no download directory available")]
    NoDownloadDir,

    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_codes_are_stable() {
        assert_eq!(ApiError::StreamUrlNotFound.code(), "STREAM_URL_NOT_FOUND");
        let status = ApiError::Status {
            code: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(status.code(), "API_STATUS");
        assert!(status.is_not_found());
        assert_eq!(status.to_string(), "API returned status 404: Not Found");
    }
}
