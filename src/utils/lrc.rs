//! Synchronised lyrics (LRC) parsing and line tracking

use once_cell::sync::Lazy;
use regex::Regex;

/// One timed lyric line
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Start time in seconds
    pub time: f64,
    pub text: String,
}

/// `[mm:ss.xx]` or `[mm:ss.xxx]` at the start of a line, then the lyric
static TIMED_LINE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^\[([0-9]{2}):([0-9]{2})\.([0-9]{2,3})\](.*)")
        .map_err(|e| log::error!("[Lyrics] Invalid timed line pattern: {}", e))
        .ok()
});

/// Parse LRC text into lines sorted by time.
///
/// Only lines starting with a `[mm:ss.xx]` or `[mm:ss.xxx]` tag are kept.
/// Metadata tags (`[ar:...]`) and untimed lines are skipped.
pub fn parse_lrc(text: &str) -> Vec<LyricLine> {
    let mut lines: Vec<LyricLine> = text.lines().filter_map(parse_line).collect();
    lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    lines
}

fn parse_line(line: &str) -> Option<LyricLine> {
    let caps = TIMED_LINE.as_ref()?.captures(line)?;
    let minutes: u32 = caps[1].parse().ok()?;
    let seconds: u32 = caps[2].parse().ok()?;
    // The fraction is read as milliseconds regardless of its width
    let fraction: u32 = caps[3].parse().ok()?;

    Some(LyricLine {
        time: minutes as f64 * 60.0 + seconds as f64 + fraction as f64 / 1000.0,
        text: caps[4].trim().to_string(),
    })
}

/// Index of the line being sung at `current_time`.
///
/// That is the line before the first one starting after `current_time`;
/// once every line has started it is the last line. Never below zero.
pub fn active_line(lines: &[LyricLine], current_time: f64) -> usize {
    match lines.iter().position(|line| line.time > current_time) {
        Some(next) => next.saturating_sub(1),
        None => lines.len().saturating_sub(1),
    }
}
