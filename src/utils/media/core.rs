// Download side of a deck: pulls the audio file into a SharedBuffer while
// the decoder reads from the front of it.

use super::buffer::SharedBuffer;
use futures_util::StreamExt;
use std::sync::Arc;

/// Stream `url` into `buffer` until the body ends, the request fails or the
/// buffer is cancelled. The buffer is always marked finished on return.
pub async fn download_into(url: &str, buffer: Arc<SharedBuffer>) {
    let result = fetch(url, &buffer).await;
    match result {
        Ok(total) => {
            log::info!("[Streaming] Download complete: {} KB", total / 1024);
            buffer.finish(None);
        }
        Err(e) => {
            log::error!("[Streaming] Download failed: {}", e);
            buffer.finish(Some(e));
        }
    }
}

async fn fetch(url: &str, buffer: &SharedBuffer) -> Result<usize, String> {
    let client = crate::utils::http::streaming_client();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("request failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("CDN status {}", status));
    }

    let expected = response.content_length();
    buffer.set_content_length(expected);
    match expected {
        Some(size) => log::info!("[Streaming] Expected file size: {} KB", size / 1024),
        None => log::warn!("[Streaming] No Content-Length header, duration will be estimated late"),
    }

    let mut total = 0usize;
    let mut stream = response.bytes_stream();
    while let Some(item) = stream.next().await {
        if buffer.is_cancelled() {
            log::debug!("[Streaming] Download cancelled after {} KB", total / 1024);
            return Ok(total);
        }
        let chunk = item.map_err(|e| format!("stream error: {}", e))?;
        total += chunk.len();
        buffer.append(&chunk);
    }

    if let Some(expected) = expected {
        let percent = total as f64 / expected.max(1) as f64 * 100.0;
        if percent < 95.0 {
            log::warn!(
                "[Streaming] Stream ended prematurely: {} KB / {} KB ({:.1}%)",
                total / 1024,
                expected / 1024,
                percent
            );
        }
    }
    Ok(total)
}

/// Run [`download_into`] on its own thread with a private runtime
pub fn spawn_download(url: String, buffer: Arc<SharedBuffer>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let rt = match crate::utils::error_handling::create_runtime() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("[Streaming] {}", e);
                buffer.finish(Some(e));
                return;
            }
        };
        rt.block_on(download_into(&url, buffer));
    })
}
