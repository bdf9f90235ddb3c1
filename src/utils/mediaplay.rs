use crate::utils::error_handling::{load_f64_atomic, store_f64_atomic};
use crate::utils::errors::PlaybackError;
use crate::utils::media::buffer::SharedBuffer;
use crate::utils::media::core::spawn_download;
use crate::utils::media::decode::{spawn_decoder, DecodedChunk, StreamStatus};
use crate::utils::media::MediaEngine;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::sync::atomic::AtomicU64;
use std::sync::mpsc::{sync_channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// Decoded chunks buffered ahead of the output
const DECODE_QUEUE_CHUNKS: usize = 32;
/// Frames of silence emitted per underrun (10ms at 44.1kHz)
const SILENCE_FRAMES: usize = 441;
/// Publish the playback position every N samples
const POSITION_UPDATE_SAMPLES: usize = 1024;

/// Open the default output device. The returned `OutputStream` must stay
/// alive for as long as anything plays through the handle.
pub fn open_output() -> Result<(OutputStream, OutputStreamHandle), PlaybackError> {
    OutputStream::try_default().map_err(|e| PlaybackError::NoOutputDevice(e.to_string()))
}

/// Progressive source fed by the decoder thread.
///
/// Plays silence while the decoder is behind and ends when the decoder hangs
/// up. Position is derived from the samples actually handed to the output.
struct StreamingSource {
    chunks: Receiver<DecodedChunk>,
    samples: Vec<i16>,
    index: usize,
    sample_rate: u32,
    channels: u16,
    is_silence: bool,
    ended: bool,
    start_at: f64,
    played_secs: f64,
    position: Arc<AtomicU64>,
}

impl StreamingSource {
    fn new(chunks: Receiver<DecodedChunk>, start_at: f64, position: Arc<AtomicU64>) -> Self {
        let mut source = Self {
            chunks,
            samples: Vec::new(),
            index: 0,
            sample_rate: 44100,
            channels: 2,
            is_silence: true,
            ended: false,
            start_at,
            played_secs: 0.0,
            position,
        };
        source.advance();
        source
    }

    fn chunk_secs(&self) -> f64 {
        self.samples.len() as f64 / self.channels as f64 / self.sample_rate as f64
    }

    fn publish_position(&self) {
        let mut secs = self.start_at + self.played_secs;
        if !self.is_silence {
            secs += (self.index / self.channels as usize) as f64 / self.sample_rate as f64;
        }
        store_f64_atomic(&self.position, secs);
    }

    /// Move to the next chunk (or a block of silence). Returns false once the
    /// decoder has finished and everything was played.
    fn advance(&mut self) -> bool {
        if self.ended {
            return false;
        }
        if !self.is_silence {
            self.played_secs += self.chunk_secs();
        }
        self.index = 0;

        loop {
            match self.chunks.try_recv() {
                Ok(chunk) => {
                    if chunk.samples.is_empty() || chunk.channels == 0 || chunk.sample_rate == 0 {
                        continue;
                    }
                    self.samples = chunk.samples;
                    self.sample_rate = chunk.sample_rate;
                    self.channels = chunk.channels;
                    self.is_silence = false;
                    self.publish_position();
                    return true;
                }
                Err(TryRecvError::Empty) => {
                    self.samples.clear();
                    self.samples
                        .resize(SILENCE_FRAMES * self.channels as usize, 0);
                    self.is_silence = true;
                    return true;
                }
                Err(TryRecvError::Disconnected) => {
                    self.samples.clear();
                    self.is_silence = true;
                    self.ended = true;
                    self.publish_position();
                    log::debug!("[StreamingSource] Decoder finished, source ends");
                    return false;
                }
            }
        }
    }
}

impl Iterator for StreamingSource {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        if self.index >= self.samples.len() && !self.advance() {
            return None;
        }
        let sample = self.samples[self.index];
        self.index += 1;

        // Advance eagerly so current_frame_len always describes the next sample
        if self.index >= self.samples.len() {
            self.advance();
        } else if !self.is_silence && self.index % POSITION_UPDATE_SAMPLES == 0 {
            self.publish_position();
        }
        Some(sample)
    }
}

impl Source for StreamingSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.samples.len().saturating_sub(self.index))
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

struct LoadedStream {
    url: String,
    buffer: Arc<SharedBuffer>,
    status: Arc<StreamStatus>,
    position: Arc<AtomicU64>,
    sink: Sink,
}

/// A single deck: one rodio `Sink` playing a progressively downloaded file
pub struct AudioPlayer {
    handle: OutputStreamHandle,
    volume: f32,
    stream: Option<LoadedStream>,
}

impl AudioPlayer {
    pub fn new(handle: OutputStreamHandle) -> Self {
        Self {
            handle,
            volume: 1.0,
            stream: None,
        }
    }

    /// New paused sink decoding `buffer` from `start_at`
    fn start_sink(
        &self,
        buffer: &Arc<SharedBuffer>,
        status: &Arc<StreamStatus>,
        position: &Arc<AtomicU64>,
        start_at: Duration,
    ) -> Result<Sink, PlaybackError> {
        let sink = Sink::try_new(&self.handle)?;
        sink.pause();
        sink.set_volume(self.volume);

        let (tx, rx) = sync_channel(DECODE_QUEUE_CHUNKS);
        spawn_decoder(Arc::clone(buffer), start_at, tx, Arc::clone(status));
        store_f64_atomic(position, start_at.as_secs_f64());
        sink.append(StreamingSource::new(
            rx,
            start_at.as_secs_f64(),
            Arc::clone(position),
        ));
        Ok(sink)
    }
}

impl MediaEngine for AudioPlayer {
    fn load(&mut self, url: &str) -> Result<(), PlaybackError> {
        self.stop();
        log::info!("[AudioPlayer] Loading stream");

        let buffer = SharedBuffer::new();
        let status = Arc::new(StreamStatus::default());
        let position = Arc::new(AtomicU64::new(0));

        let sink = match self.start_sink(&buffer, &status, &position, Duration::ZERO) {
            Ok(sink) => sink,
            Err(e) => {
                buffer.cancel();
                return Err(e);
            }
        };
        spawn_download(url.to_string(), Arc::clone(&buffer));

        self.stream = Some(LoadedStream {
            url: url.to_string(),
            buffer,
            status,
            position,
            sink,
        });
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let stream = self.stream.as_ref().ok_or(PlaybackError::NothingLoaded)?;
        stream.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(stream) = &self.stream {
            stream.sink.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            log::debug!("[AudioPlayer] Stopping playback");
            stream.sink.stop();
            stream.buffer.cancel();
        }
    }

    /// Restart decoding from the buffered bytes and skip to `position`
    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        let stream = self.stream.as_ref().ok_or(PlaybackError::NothingLoaded)?;
        log::info!("[AudioPlayer] Seeking to {:?}", position);

        let was_paused = stream.sink.is_paused();
        let sink = self.start_sink(&stream.buffer, &stream.status, &stream.position, position)?;
        if !was_paused {
            sink.play();
        }

        if let Some(stream) = self.stream.as_mut() {
            let old = std::mem::replace(&mut stream.sink, sink);
            old.stop();
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(stream) = &self.stream {
            stream.sink.set_volume(volume);
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn is_paused(&self) -> bool {
        self.stream.as_ref().map_or(true, |s| s.sink.is_paused())
    }

    fn is_finished(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.sink.empty())
    }

    fn take_error(&mut self) -> Option<PlaybackError> {
        self.stream
            .as_ref()
            .and_then(|s| s.status.take_error())
            .map(PlaybackError::Stream)
    }

    fn position(&self) -> Duration {
        self.stream.as_ref().map_or(Duration::ZERO, |s| {
            Duration::from_secs_f64(load_f64_atomic(&s.position).max(0.0))
        })
    }

    fn duration(&self) -> Option<Duration> {
        self.stream.as_ref().and_then(|s| s.status.duration())
    }

    fn loaded_source(&self) -> Option<&str> {
        self.stream.as_ref().map(|s| s.url.as_str())
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::mpsc::sync_channel;

    fn chunk(len: usize) -> DecodedChunk {
        DecodedChunk {
            samples: vec![1; len],
            sample_rate: 1000,
            channels: 2,
        }
    }

    #[test]
    fn plays_silence_while_waiting_then_real_audio() {
        let (tx, rx) = sync_channel(4);
        let position = Arc::new(AtomicU64::new(0));
        let mut source = StreamingSource::new(rx, 0.0, Arc::clone(&position));

        assert_eq!(source.next(), Some(0));

        tx.send(chunk(2000)).unwrap();
        // drain the rest of the silence block
        let mut first_real = None;
        for _ in 0..SILENCE_FRAMES * 2 {
            if let Some(1) = source.next() {
                first_real = Some(1);
                break;
            }
        }
        assert_eq!(first_real, Some(1));
        assert_eq!(source.sample_rate(), 1000);
    }

    #[test]
    fn position_counts_consumed_audio_only() {
        let (tx, rx) = sync_channel(4);
        tx.send(chunk(2000)).unwrap();
        tx.send(chunk(2000)).unwrap();
        drop(tx);

        let position = Arc::new(AtomicU64::new(0));
        let source = StreamingSource::new(rx, 10.0, Arc::clone(&position));
        let played: Vec<i16> = source.collect();

        assert_eq!(played.len(), 4000);
        // two chunks of 1000 stereo frames at 1kHz
        assert_relative_eq!(load_f64_atomic(&position), 12.0);
    }

    #[test]
    fn frame_len_tracks_current_chunk() {
        let (tx, rx) = sync_channel(4);
        tx.send(chunk(6)).unwrap();
        drop(tx);

        let position = Arc::new(AtomicU64::new(0));
        let mut source = StreamingSource::new(rx, 0.0, position);
        assert_eq!(source.current_frame_len(), Some(6));
        source.next();
        assert_eq!(source.current_frame_len(), Some(5));
        while source.next().is_some() {}
        assert_eq!(source.current_frame_len(), Some(0));
    }
}
