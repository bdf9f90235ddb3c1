//! Play queue with shuffle and repeat handling

use crate::models::{RepeatMode, Track};
use rand::seq::SliceRandom;
use rand::Rng;

/// Outcome of moving through the queue
#[derive(Debug, Clone, PartialEq)]
pub enum QueueStep {
    /// A new current track was selected
    Moved(Track),
    /// Ran past the end with repeat off; playback stops
    Ended,
    /// Nothing queued
    Unchanged,
}

/// Shuffle `tracks`, keeping `current_id` (if present) at the front
fn shuffle_with_current_first<R: Rng + ?Sized>(
    tracks: &[Track],
    current_id: Option<&str>,
    rng: &mut R,
) -> Vec<Track> {
    let mut shuffled = tracks.to_vec();
    shuffled.shuffle(rng);
    if let Some(id) = current_id {
        if let Some(pos) = shuffled.iter().position(|t| t.id == id) {
            let current = shuffled.remove(pos);
            shuffled.insert(0, current);
        }
    }
    shuffled
}

#[derive(Debug, Default)]
pub struct PlaybackQueue {
    queue: Vec<Track>,
    shuffled: Vec<Track>,
    /// Index into the active list; `None` when the current track is not in it
    current_index: Option<usize>,
    is_shuffled: bool,
    repeat_mode: RepeatMode,
    current_track: Option<Track>,
    is_playing: bool,
    current_time: f64,
    duration: f64,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self {
            current_index: Some(0),
            ..Default::default()
        }
    }

    /// The list playback walks through: the shuffled order when shuffling
    pub fn active(&self) -> &[Track] {
        if self.is_shuffled {
            &self.shuffled
        } else {
            &self.queue
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn is_shuffled(&self) -> bool {
        self.is_shuffled
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn set_queue(&mut self, tracks: Vec<Track>) {
        self.set_queue_with(tracks, &mut rand::rng());
    }

    /// Replace the queue; a shuffled queue is reshuffled with the current
    /// track in front. The index restarts at 0.
    pub fn set_queue_with<R: Rng + ?Sized>(&mut self, tracks: Vec<Track>, rng: &mut R) {
        self.shuffled = if self.is_shuffled {
            let current_id = self.current_track.as_ref().map(|t| t.id.as_str());
            shuffle_with_current_first(&tracks, current_id, rng)
        } else {
            Vec::new()
        };
        log::debug!("[Queue] Queue set with {} tracks", tracks.len());
        self.queue = tracks;
        self.current_index = Some(0);
    }

    /// Make `track` current and point the index at it in the active list
    pub fn set_current_track(&mut self, track: Track) {
        let list = if self.is_shuffled && !self.shuffled.is_empty() {
            &self.shuffled
        } else {
            &self.queue
        };
        self.current_index = list.iter().position(|t| t.id == track.id);
        self.current_track = Some(track);
    }

    pub fn next(&mut self) -> QueueStep {
        let len = self.active().len();
        if len == 0 {
            return QueueStep::Unchanged;
        }

        let mut index = self.current_index.map_or(0, |i| i + 1);
        if index >= len {
            if self.repeat_mode == RepeatMode::Playlist {
                index = 0;
            } else {
                log::info!("[Queue] End of queue reached");
                self.is_playing = false;
                return QueueStep::Ended;
            }
        }
        self.move_to(index)
    }

    pub fn previous(&mut self) -> QueueStep {
        let len = self.active().len();
        if len == 0 {
            return QueueStep::Unchanged;
        }

        let index = match self.current_index {
            Some(i) if i > 0 => i - 1,
            _ if self.repeat_mode == RepeatMode::Playlist => len - 1,
            _ => 0,
        };
        self.move_to(index)
    }

    fn move_to(&mut self, index: usize) -> QueueStep {
        let Some(track) = self.active().get(index).cloned() else {
            return QueueStep::Unchanged;
        };
        self.current_index = Some(index);
        self.current_track = Some(track.clone());
        self.current_time = 0.0;
        self.is_playing = true;
        QueueStep::Moved(track)
    }

    pub fn toggle_shuffle(&mut self) {
        self.toggle_shuffle_with(&mut rand::rng());
    }

    pub fn toggle_shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.is_shuffled = !self.is_shuffled;
        let current_id = self.current_track.as_ref().map(|t| t.id.clone());

        if self.is_shuffled {
            self.shuffled = shuffle_with_current_first(&self.queue, current_id.as_deref(), rng);
        }
        self.current_index = current_id
            .as_deref()
            .and_then(|id| self.active().iter().position(|t| t.id == id));
        log::debug!("[Queue] Shuffle {}", if self.is_shuffled { "on" } else { "off" });
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    pub fn toggle_play_pause(&mut self) {
        self.is_playing = !self.is_playing;
    }

    pub fn set_is_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn set_current_time(&mut self, secs: f64) {
        self.current_time = secs;
    }

    pub fn set_duration(&mut self, secs: f64) {
        self.duration = secs;
    }

    /// Index of the track that plays after the current one, used for
    /// preloading. Needs at least two queued tracks.
    pub fn upcoming_index(&self) -> Option<usize> {
        let len = self.active().len();
        if len < 2 {
            return None;
        }
        let next = self.current_index.map_or(0, |i| i + 1);
        if next < len {
            return Some(next);
        }
        match self.repeat_mode {
            RepeatMode::Playlist => Some(0),
            RepeatMode::Track => self.current_index,
            RepeatMode::Off => None,
        }
    }

    pub fn upcoming(&self) -> Option<&Track> {
        self.upcoming_index().and_then(|i| self.active().get(i))
    }

    /// Tracks after the current one in play order
    pub fn up_next(&self) -> &[Track] {
        let list = self.active();
        match self.current_index {
            Some(i) if i < list.len() => &list[i + 1..],
            Some(_) => &[],
            None => list,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tracks(ids: &[&str]) -> Vec<Track> {
        ids.iter()
            .map(|id| Track {
                id: id.to_string(),
                title: format!("Title {}", id),
                artist: "Artist".to_string(),
                ..Default::default()
            })
            .collect()
    }

    fn queue_at(ids: &[&str], current: &str) -> PlaybackQueue {
        let list = tracks(ids);
        let mut queue = PlaybackQueue::new();
        let current = list.iter().find(|t| t.id == current).cloned().unwrap();
        queue.set_queue(list);
        queue.set_current_track(current);
        queue
    }

    fn moved_id(step: QueueStep) -> String {
        match step {
            QueueStep::Moved(track) => track.id,
            other => panic!("expected a move, got {:?}", other),
        }
    }

    #[test]
    fn next_walks_forward_and_stops_at_end() {
        let mut queue = queue_at(&["a", "b", "c"], "b");
        queue.set_is_playing(true);

        assert_eq!(moved_id(queue.next()), "c");
        assert_eq!(queue.current_index(), Some(2));
        assert_eq!(queue.next(), QueueStep::Ended);
        assert!(!queue.is_playing());
        assert_eq!(queue.current_track().map(|t| t.id.as_str()), Some("c"));
    }

    #[test]
    fn repeat_playlist_wraps_both_ways() {
        let mut queue = queue_at(&["a", "b", "c"], "c");
        queue.set_repeat_mode(RepeatMode::Playlist);
        assert_eq!(moved_id(queue.next()), "a");
        assert_eq!(moved_id(queue.previous()), "c");
    }

    #[test]
    fn previous_at_start_stays_without_repeat() {
        let mut queue = queue_at(&["a", "b"], "a");
        queue.set_current_time(42.0);
        assert_eq!(moved_id(queue.previous()), "a");
        assert_eq!(queue.current_time(), 0.0);
        assert!(queue.is_playing());
    }

    #[test]
    fn empty_queue_is_unchanged() {
        let mut queue = PlaybackQueue::new();
        assert_eq!(queue.next(), QueueStep::Unchanged);
        assert_eq!(queue.previous(), QueueStep::Unchanged);
        assert_eq!(queue.upcoming_index(), None);
    }

    #[test]
    fn unknown_current_track_has_no_index() {
        let mut queue = queue_at(&["a", "b"], "a");
        queue.set_current_track(tracks(&["zzz"]).remove(0));
        assert_eq!(queue.current_index(), None);
        assert_eq!(moved_id(queue.next()), "a");
    }

    #[test]
    fn shuffle_keeps_current_track_first() {
        let ids: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let mut queue = queue_at(&id_refs, "7");
        let mut rng = StdRng::seed_from_u64(3);

        queue.toggle_shuffle_with(&mut rng);
        assert!(queue.is_shuffled());
        assert_eq!(queue.active()[0].id, "7");
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(queue.active().len(), 20);

        queue.toggle_shuffle_with(&mut rng);
        assert!(!queue.is_shuffled());
        assert_eq!(queue.current_index(), Some(7));
    }

    #[test]
    fn set_queue_while_shuffled_reshuffles() {
        let mut queue = queue_at(&["a", "b", "c"], "b");
        let mut rng = StdRng::seed_from_u64(11);
        queue.toggle_shuffle_with(&mut rng);

        queue.set_queue_with(tracks(&["x", "b", "y", "z"]), &mut rng);
        assert_eq!(queue.active().len(), 4);
        assert_eq!(queue.active()[0].id, "b");
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn upcoming_index_follows_repeat_mode() {
        let mut queue = queue_at(&["a", "b", "c"], "a");
        assert_eq!(queue.upcoming_index(), Some(1));

        queue.set_current_track(tracks(&["c"]).remove(0));
        assert_eq!(queue.upcoming_index(), None);
        queue.set_repeat_mode(RepeatMode::Playlist);
        assert_eq!(queue.upcoming_index(), Some(0));
        queue.set_repeat_mode(RepeatMode::Track);
        assert_eq!(queue.upcoming_index(), Some(2));

        let single = queue_at(&["a"], "a");
        assert_eq!(single.upcoming_index(), None);
    }

    #[test]
    fn up_next_lists_remaining_tracks() {
        let queue = queue_at(&["a", "b", "c"], "a");
        let ids: Vec<&str> = queue.up_next().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        let last = queue_at(&["a", "b"], "b");
        assert!(last.up_next().is_empty());
    }
}
