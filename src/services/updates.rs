/// Release check against the published releases
use std::sync::mpsc::Sender;

pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateStatus {
    UpToDate,
    Available { latest: String },
}

fn strip_v(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag)
}

/// Any difference from the running version counts as an update
pub fn compare_versions(current: &str, latest_tag: Option<&str>) -> UpdateStatus {
    match latest_tag {
        Some(tag) if strip_v(tag) != strip_v(current) => UpdateStatus::Available {
            latest: strip_v(tag).to_string(),
        },
        _ => UpdateStatus::UpToDate,
    }
}

pub fn spawn_update_check(tx: Sender<Result<UpdateStatus, String>>) {
    crate::utils::async_helper::spawn_and_send(
        move || {
            Box::pin(async move {
                let latest = crate::api::fetch_latest_release().await.map_err(|e| {
                    log::error!("[Updates] Update check failed: {}", e);
                    format!("Failed to check for updates: {}", e)
                })?;
                let status = compare_versions(CURRENT_VERSION, latest.as_deref());
                log::info!("[Updates] Current {} -> {:?}", CURRENT_VERSION, status);
                Ok(status)
            })
        },
        tx,
    );
}

pub fn open_releases_page() {
    let url = &crate::config::get().releases_page_url;
    if let Err(e) = webbrowser::open(url) {
        log::warn!("[Updates] Could not open {}: {}", url, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_v_is_ignored() {
        assert_eq!(compare_versions("0.3.0", Some("v0.3.0")), UpdateStatus::UpToDate);
        assert_eq!(
            compare_versions("0.3.0", Some("v0.4.1")),
            UpdateStatus::Available {
                latest: "0.4.1".to_string()
            }
        );
    }

    #[test]
    fn no_release_means_latest() {
        assert_eq!(compare_versions("0.3.0", None), UpdateStatus::UpToDate);
    }
}
