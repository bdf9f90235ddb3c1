// Synchronised lyrics lookup
use crate::models::LyricsResponse;
use crate::utils::errors::ApiError;
use crate::utils::http::{read_json, retry_get};

/// `GET /lyrics?artist=&title=` -> raw LRC text.
/// `Ok(None)` when the API has no lyrics for the track.
pub async fn get_lyrics(artist: &str, title: &str) -> Result<Option<String>, ApiError> {
    let url = super::endpoint("/lyrics", &[("artist", artist), ("title", title)]);
    log::debug!("[Api] GET /lyrics artist={:?} title={:?}", artist, title);

    let response = match retry_get(&url).await {
        Ok(response) => response,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    };
    let body: LyricsResponse = read_json(response).await?;
    Ok(body.lyrics.filter(|text| !text.trim().is_empty()))
}
