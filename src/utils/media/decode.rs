// Decoder thread: turns the bytes of a SharedBuffer into PCM chunks.
// MP3 goes through minimp3 frame by frame; anything else (FLAC, WAV, Ogg)
// goes through rodio's format probing.

use super::buffer::{GrowingReader, SharedBuffer};
use crate::constants::DECODE_CHUNK_SAMPLES;
use crate::utils::error_handling::safe_lock;
use minimp3::{Decoder as Mp3Decoder, Frame};
use rodio::Source;
use std::sync::mpsc::SyncSender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Give up on an MP3 stream after this many consecutive frames without audio
const MAX_MP3_SKIPS: usize = 64;

/// Interleaved PCM with the format it was decoded in
pub struct DecodedChunk {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// State the decoder reports back to the owning deck
#[derive(Default)]
pub struct StreamStatus {
    error: Mutex<Option<String>>,
    duration: Mutex<Option<Duration>>,
}

impl StreamStatus {
    pub fn set_error(&self, message: String) {
        *safe_lock(&self.error, "StreamStatus") = Some(message);
    }

    pub fn take_error(&self) -> Option<String> {
        safe_lock(&self.error, "StreamStatus").take()
    }

    pub fn set_duration(&self, duration: Duration) {
        *safe_lock(&self.duration, "StreamStatus") = Some(duration);
    }

    pub fn duration(&self) -> Option<Duration> {
        *safe_lock(&self.duration, "StreamStatus")
    }
}

#[derive(Debug, PartialEq)]
enum Container {
    Mp3,
    Other,
}

fn sniff(header: &[u8]) -> Container {
    let mpeg_sync = header.len() >= 2 && header[0] == 0xFF && header[1] & 0xE0 == 0xE0;
    if header.starts_with(b"ID3") || mpeg_sync {
        Container::Mp3
    } else {
        Container::Other
    }
}

/// Decode `buffer` from `start_at` onwards, sending chunks until the stream
/// ends or the receiving source is dropped
pub fn spawn_decoder(
    buffer: Arc<SharedBuffer>,
    start_at: Duration,
    tx: SyncSender<DecodedChunk>,
    status: Arc<StreamStatus>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let header = buffer.peek(4);
        if header.is_empty() {
            let message = buffer
                .error()
                .unwrap_or_else(|| "stream ended before any audio arrived".to_string());
            log::error!("[Decoder] {}", message);
            status.set_error(message);
            return;
        }

        let container = sniff(&header);
        log::debug!("[Decoder] Detected {:?} stream, starting at {:?}", container, start_at);
        let result = match container {
            Container::Mp3 => decode_mp3(&buffer, start_at, &tx, &status),
            Container::Other => decode_with_rodio(&buffer, start_at, &tx, &status),
        };

        if let Err(e) = result {
            log::error!("[Decoder] {}", e);
            status.set_error(e);
        } else if let Some(e) = buffer.error() {
            // Decoded what arrived; the download itself failed part way
            log::warn!("[Decoder] Stream truncated: {}", e);
        }
    })
}

fn decode_mp3(
    buffer: &Arc<SharedBuffer>,
    start_at: Duration,
    tx: &SyncSender<DecodedChunk>,
    status: &StreamStatus,
) -> Result<(), String> {
    let mut decoder = Mp3Decoder::new(GrowingReader::new(Arc::clone(buffer)));
    let mut to_skip = start_at.as_secs_f64();
    let mut duration_known = status.duration().is_some();
    let mut skips = 0;

    loop {
        match decoder.next_frame() {
            Ok(Frame {
                data,
                sample_rate,
                channels,
                bitrate,
                ..
            }) => {
                if sample_rate <= 0 || channels == 0 || data.is_empty() {
                    continue;
                }
                skips = 0;

                if !duration_known {
                    if let Some(length) = buffer.content_length() {
                        if bitrate > 0 {
                            let secs = length as f64 * 8.0 / (bitrate as f64 * 1000.0);
                            status.set_duration(Duration::from_secs_f64(secs));
                        }
                    }
                    duration_known = true;
                }

                let frames_per_sec = sample_rate as f64;
                let frame_secs = data.len() as f64 / channels as f64 / frames_per_sec;
                if to_skip >= frame_secs {
                    to_skip -= frame_secs;
                    continue;
                }

                let mut samples = data;
                if to_skip > 0.0 {
                    let drop = (to_skip * frames_per_sec) as usize * channels;
                    samples.drain(..drop.min(samples.len()));
                    to_skip = 0.0;
                }

                let chunk = DecodedChunk {
                    samples,
                    sample_rate: sample_rate as u32,
                    channels: channels as u16,
                };
                if tx.send(chunk).is_err() {
                    return Ok(());
                }
            }
            Err(minimp3::Error::Eof) => return Ok(()),
            Err(minimp3::Error::Io(e)) => return Err(format!("read error: {}", e)),
            Err(minimp3::Error::SkippedData) | Err(minimp3::Error::InsufficientData) => {
                skips += 1;
                if skips > MAX_MP3_SKIPS {
                    return Err("no decodable MP3 frames in stream".to_string());
                }
            }
        }
    }
}

fn decode_with_rodio(
    buffer: &Arc<SharedBuffer>,
    start_at: Duration,
    tx: &SyncSender<DecodedChunk>,
    status: &StreamStatus,
) -> Result<(), String> {
    let reader = GrowingReader::new(Arc::clone(buffer));
    let decoder =
        rodio::Decoder::new(reader).map_err(|e| format!("unsupported audio format: {}", e))?;

    let sample_rate = decoder.sample_rate();
    let channels = decoder.channels();
    if sample_rate == 0 || channels == 0 {
        return Err("decoder reported an empty audio format".to_string());
    }
    if let Some(total) = decoder.total_duration() {
        status.set_duration(total);
    }

    let skip = (start_at.as_secs_f64() * sample_rate as f64) as usize * channels as usize;
    let mut samples = decoder.skip(skip);

    loop {
        let chunk: Vec<i16> = samples.by_ref().take(DECODE_CHUNK_SAMPLES).collect();
        if chunk.is_empty() {
            return Ok(());
        }
        let chunk = DecodedChunk {
            samples: chunk,
            sample_rate,
            channels,
        };
        if tx.send(chunk).is_err() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_mp3_headers() {
        assert_eq!(sniff(b"ID3\x04"), Container::Mp3);
        assert_eq!(sniff(&[0xFF, 0xFB, 0x90, 0x00]), Container::Mp3);
        assert_eq!(sniff(b"fLaC"), Container::Other);
        assert_eq!(sniff(b"RIFF"), Container::Other);
    }

    #[test]
    fn empty_stream_reports_download_error() {
        let buffer = SharedBuffer::new();
        buffer.finish(Some("CDN status 403 Forbidden".to_string()));
        let status = Arc::new(StreamStatus::default());
        let (tx, _rx) = std::sync::mpsc::sync_channel(1);

        spawn_decoder(buffer, Duration::ZERO, tx, Arc::clone(&status))
            .join()
            .unwrap();

        assert_eq!(
            status.take_error().as_deref(),
            Some("CDN status 403 Forbidden")
        );
        assert!(status.take_error().is_none());
    }
}
