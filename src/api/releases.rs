// Latest published release (update check)
use crate::models::ReleaseResponse;
use crate::utils::errors::ApiError;
use crate::utils::http::{read_json, retry_get};

/// Tag of the latest release, `None` when nothing was published yet
pub async fn fetch_latest_release() -> Result<Option<String>, ApiError> {
    let url = &crate::config::get().releases_api_url;
    log::debug!("[Api] GET latest release");

    let response = match retry_get(url).await {
        Ok(response) => response,
        Err(e) if e.is_not_found() => {
            log::info!("[Api] No releases published yet");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let release: ReleaseResponse = read_json(response).await?;
    Ok(release.tag_name)
}
