//! Byte buffer shared between a download thread and any number of readers

use crate::constants::STREAM_STALL_TIMEOUT_SECS;
use crate::utils::error_handling::safe_lock;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct BufferInner {
    data: Vec<u8>,
    complete: bool,
    error: Option<String>,
    content_length: Option<u64>,
}

/// Download target that grows while readers consume it.
///
/// The whole file stays in memory so seeking backwards never needs another
/// request.
pub struct SharedBuffer {
    inner: Mutex<BufferInner>,
    grown: Condvar,
    cancelled: AtomicBool,
}

impl SharedBuffer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(BufferInner::default()),
            grown: Condvar::new(),
            cancelled: AtomicBool::new(false),
        })
    }

    pub fn append(&self, bytes: &[u8]) {
        let mut inner = safe_lock(&self.inner, "SharedBuffer");
        inner.data.extend_from_slice(bytes);
        self.grown.notify_all();
    }

    pub fn set_content_length(&self, length: Option<u64>) {
        safe_lock(&self.inner, "SharedBuffer").content_length = length;
    }

    pub fn content_length(&self) -> Option<u64> {
        safe_lock(&self.inner, "SharedBuffer").content_length
    }

    /// Mark the download as finished, optionally with an error
    pub fn finish(&self, error: Option<String>) {
        let mut inner = safe_lock(&self.inner, "SharedBuffer");
        inner.complete = true;
        if error.is_some() {
            inner.error = error;
        }
        self.grown.notify_all();
    }

    pub fn error(&self) -> Option<String> {
        safe_lock(&self.inner, "SharedBuffer").error.clone()
    }

    /// Stop the download and wake every blocked reader
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        let _inner = safe_lock(&self.inner, "SharedBuffer");
        self.grown.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// First bytes of the file, waiting until at least `n` arrived or the
    /// download ended
    pub fn peek(&self, n: usize) -> Vec<u8> {
        let stall = Duration::from_secs(STREAM_STALL_TIMEOUT_SECS);
        let mut out = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            match self.read_at(filled as u64, &mut out[filled..], stall) {
                0 => break,
                read => filled += read,
            }
        }
        out.truncate(filled);
        out
    }

    /// Copy bytes starting at `pos`, blocking while the download is running.
    /// Returns 0 at the end of the stream, on cancel, or after a stall.
    fn read_at(&self, pos: u64, out: &mut [u8], stall_timeout: Duration) -> usize {
        if out.is_empty() {
            return 0;
        }
        let mut inner = safe_lock(&self.inner, "SharedBuffer");
        let mut last_growth = Instant::now();
        let mut seen_len = inner.data.len();

        loop {
            if self.is_cancelled() {
                return 0;
            }
            if pos < inner.data.len() as u64 {
                let start = pos as usize;
                let n = out.len().min(inner.data.len() - start);
                out[..n].copy_from_slice(&inner.data[start..start + n]);
                return n;
            }
            if inner.complete {
                return 0;
            }

            if inner.data.len() != seen_len {
                seen_len = inner.data.len();
                last_growth = Instant::now();
            }
            let waited = last_growth.elapsed();
            if waited >= stall_timeout {
                log::warn!(
                    "[SharedBuffer] No data for {:?}, ending stream at byte {}",
                    waited,
                    pos
                );
                return 0;
            }

            inner = match self.grown.wait_timeout(inner, stall_timeout - waited) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Total length if known: the final size once complete, else the
    /// advertised content length
    fn known_len(&self) -> Option<u64> {
        let inner = safe_lock(&self.inner, "SharedBuffer");
        if inner.complete {
            Some(inner.data.len() as u64)
        } else {
            inner.content_length
        }
    }
}

/// Blocking `Read + Seek` view over a [`SharedBuffer`].
///
/// Reads wait for more bytes while the download is running. When no byte
/// arrives for the stall timeout the reader reports end of file so playback
/// ends instead of hanging on silence.
pub struct GrowingReader {
    buffer: Arc<SharedBuffer>,
    pos: u64,
    stall_timeout: Duration,
}

impl GrowingReader {
    pub fn new(buffer: Arc<SharedBuffer>) -> Self {
        Self {
            buffer,
            pos: 0,
            stall_timeout: Duration::from_secs(STREAM_STALL_TIMEOUT_SECS),
        }
    }

    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = timeout;
        self
    }
}

impl Read for GrowingReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = self.buffer.read_at(self.pos, out, self.stall_timeout);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for GrowingReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
            SeekFrom::End(delta) => match self.buffer.known_len() {
                Some(end) => end as i64 + delta,
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::Unsupported,
                        "stream length unknown while downloading",
                    ))
                }
            },
        };

        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of stream",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_sees_bytes_appended_later() {
        let buffer = SharedBuffer::new();
        buffer.append(b"abc");

        let writer = Arc::clone(&buffer);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            writer.append(b"def");
            writer.finish(None);
        });

        let mut reader = GrowingReader::new(Arc::clone(&buffer));
        let mut all = Vec::new();
        reader.read_to_end(&mut all).unwrap();
        handle.join().unwrap();

        assert_eq!(all, b"abcdef");
    }

    #[test]
    fn seek_within_downloaded_bytes() {
        let buffer = SharedBuffer::new();
        buffer.append(b"0123456789");
        buffer.finish(None);

        let mut reader = GrowingReader::new(buffer);
        assert_eq!(reader.seek(SeekFrom::Start(4)).unwrap(), 4);
        let mut two = [0u8; 2];
        reader.read_exact(&mut two).unwrap();
        assert_eq!(&two, b"45");
        assert_eq!(reader.seek(SeekFrom::End(-1)).unwrap(), 9);
        assert!(reader.seek(SeekFrom::Current(-20)).is_err());
    }

    #[test]
    fn stalled_download_reads_as_end_of_file() {
        let buffer = SharedBuffer::new();
        buffer.append(b"xy");
        let mut reader =
            GrowingReader::new(buffer).with_stall_timeout(Duration::from_millis(30));

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"xy");
    }

    #[test]
    fn cancel_wakes_blocked_reader() {
        let buffer = SharedBuffer::new();
        let canceller = Arc::clone(&buffer);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            canceller.cancel();
        });

        let mut reader = GrowingReader::new(Arc::clone(&buffer));
        let mut out = [0u8; 4];
        assert_eq!(reader.read(&mut out).unwrap(), 0);
        handle.join().unwrap();
    }

    #[test]
    fn peek_returns_available_prefix() {
        let buffer = SharedBuffer::new();
        buffer.append(b"fLaC rest");
        assert_eq!(buffer.peek(4), b"fLaC");
        buffer.finish(None);
        assert_eq!(buffer.peek(64), b"fLaC rest");
    }
}
