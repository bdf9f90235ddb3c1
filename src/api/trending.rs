// Trending list (country -> "Title - Artist" search queries)
use crate::utils::errors::ApiError;
use crate::utils::http::{read_json, retry_get};
use std::collections::HashMap;

pub type TrendingMap = HashMap<String, Vec<String>>;

pub async fn fetch_trending() -> Result<TrendingMap, ApiError> {
    let url = &crate::config::get().trending_url;
    log::debug!("[Api] GET trending list");
    let response = retry_get(url).await?;
    let map: TrendingMap = read_json(response).await?;
    log::info!("[Api] Trending list covers {} regions", map.len());
    Ok(map)
}
