/// Save tracks as `<Title> - <Artist>.flac` in the user's download folder
use crate::models::Track;
use crate::utils::errors::DownloadError;
use crate::utils::formatting::safe_file_name;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

pub fn download_file_name(track: &Track) -> String {
    format!("{}.flac", safe_file_name(&track.display_name()))
}

/// Resolve, fetch and write the track. Returns the written path.
pub async fn download_track(track: &Track) -> Result<PathBuf, DownloadError> {
    let dir = dirs::download_dir().ok_or(DownloadError::NoDownloadDir)?;
    let url = crate::api::get_stream_url(&track.id).await?;
    let bytes = crate::api::download_track_bytes(&url).await?;
    let path = write_download(&dir, track, &bytes)?;
    log::info!("[Downloads] Saved {}", path.display());
    Ok(path)
}

fn write_download(dir: &Path, track: &Track, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(download_file_name(track));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Download in the background; the result arrives on `tx`
pub fn spawn_download(track: Track, tx: Sender<Result<PathBuf, String>>) {
    log::info!("[Downloads] Downloading {}", track.display_name());
    crate::utils::async_helper::spawn_and_send(
        move || {
            Box::pin(async move {
                download_track(&track).await.map_err(|e| {
                    log::error!("[Downloads] Failed to download {}: {}", track.id, e);
                    e.to_string()
                })
            })
        },
        tx,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn track() -> Track {
        Track {
            id: "1".to_string(),
            title: "What/Is: Love?".to_string(),
            artist: "Haddaway".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn file_name_is_sanitised() {
        assert_eq!(download_file_name(&track()), "What-Is- Love- - Haddaway.flac");
    }

    #[test]
    fn bytes_are_written_under_dir() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("Downloads");
        let path = write_download(&target, &track(), b"fLaC").unwrap();
        assert_eq!(path.parent(), Some(target.as_path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"fLaC");
    }
}
