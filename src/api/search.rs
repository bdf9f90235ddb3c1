// Track search endpoint
use crate::models::SearchResponse;
use crate::utils::errors::ApiError;
use crate::utils::http::{read_json, retry_get};

/// `GET /search?q=&offset=&limit=&type=track`.
///
/// The echoed `offset`/`limit` are replaced by the requested ones; the API
/// does not always return them.
pub async fn search_tracks(
    query: &str,
    offset: u32,
    limit: u32,
) -> Result<SearchResponse, ApiError> {
    let offset_param = offset.to_string();
    let limit_param = limit.to_string();
    let url = super::endpoint(
        "/search",
        &[
            ("q", query),
            ("offset", &offset_param),
            ("limit", &limit_param),
            ("type", "track"),
        ],
    );

    log::debug!(
        "[Api] GET /search q={:?} offset={} limit={}",
        query,
        offset,
        limit
    );

    let response = retry_get(&url).await?;
    let mut result: SearchResponse = read_json(response).await?;
    result.offset = offset;
    result.limit = limit;

    log::info!(
        "[Api] Search {:?} returned {} tracks (total {})",
        query,
        result.tracks.len(),
        result.total
    );
    Ok(result)
}
