/// Local library: liked tracks, recently played, playlists and settings
///
/// Every mutation writes the affected key back to the store so the library
/// survives restarts. When the data dir is unusable the library falls back
/// to an in-memory store and nothing persists.
use crate::constants::{
    DEFAULT_VOLUME, RECENTLY_PLAYED_LIMIT, STORE_KEY_LIKED_TRACKS, STORE_KEY_PLAYLISTS,
    STORE_KEY_RECENTLY_PLAYED, STORE_KEY_SETTINGS, STORE_KEY_TRENDING_CACHE, STORE_KEY_VOLUME,
};
use crate::data::home_data::TrendingCache;
use crate::models::{Playlist, Settings, SettingsPatch, Track};
use crate::utils::store::KeyValueStore;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Library {
    liked_tracks: Vec<Track>,
    recently_played: Vec<Track>,
    playlists: Vec<Playlist>,
    settings: Settings,
    volume: f32,
    store: Option<KeyValueStore>,
}

impl Default for Library {
    fn default() -> Self {
        Self {
            liked_tracks: Vec::new(),
            recently_played: Vec::new(),
            playlists: Vec::new(),
            settings: Settings::default(),
            volume: DEFAULT_VOLUME,
            store: None,
        }
    }
}

impl Library {
    /// Open the default store and load everything saved in it
    pub fn open() -> Self {
        match KeyValueStore::open_default() {
            Ok(store) => {
                log::info!("[Library] Using store at {}", store.path().display());
                Self::load(store)
            }
            Err(e) => {
                log::warn!("[Library] Store unavailable, library will not persist: {}", e);
                match KeyValueStore::open_in_memory() {
                    Ok(store) => Self::load(store),
                    Err(e) => {
                        log::error!("[Library] In-memory store failed, running without one: {}", e);
                        Self::default()
                    }
                }
            }
        }
    }

    pub fn load(store: KeyValueStore) -> Self {
        let mut library = Self::default();
        library.load_settings(store.get_or_log(STORE_KEY_SETTINGS));
        library.load_playlists(store.get_or_log(STORE_KEY_PLAYLISTS).unwrap_or_default());
        library.load_liked_tracks(store.get_or_log(STORE_KEY_LIKED_TRACKS).unwrap_or_default());
        library.load_recently_played(
            store
                .get_or_log(STORE_KEY_RECENTLY_PLAYED)
                .unwrap_or_default(),
        );
        if let Some(volume) = store.get_or_log::<f32>(STORE_KEY_VOLUME) {
            library.volume = volume.clamp(0.0, 1.0);
        }
        log::info!(
            "[Library] Loaded {} liked, {} recent, {} playlists",
            library.liked_tracks.len(),
            library.recently_played.len(),
            library.playlists.len()
        );
        library.store = Some(store);
        library
    }

    pub fn liked_tracks(&self) -> &[Track] {
        &self.liked_tracks
    }

    pub fn recently_played(&self) -> &[Track] {
        &self.recently_played
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn playlist(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_liked(&self, track_id: &str) -> bool {
        self.liked_tracks.iter().any(|t| t.id == track_id)
    }

    /// Returns whether the track is liked afterwards
    pub fn toggle_like(&mut self, track: &Track) -> bool {
        let liked = if let Some(pos) = self.liked_tracks.iter().position(|t| t.id == track.id) {
            self.liked_tracks.remove(pos);
            log::info!("[Library] Unliked {}", track.id);
            false
        } else {
            self.liked_tracks.push(Track {
                liked: true,
                ..track.clone()
            });
            log::info!("[Library] Liked {}", track.id);
            true
        };
        self.persist(STORE_KEY_LIKED_TRACKS, &self.liked_tracks);
        liked
    }

    /// Most recent first, one entry per track
    pub fn add_recently_played(&mut self, track: &Track) {
        self.recently_played.retain(|t| t.id != track.id);
        self.recently_played.insert(0, track.clone());
        self.recently_played.truncate(RECENTLY_PLAYED_LIMIT);
        self.persist(STORE_KEY_RECENTLY_PLAYED, &self.recently_played);
    }

    /// Returns the id of the new playlist
    pub fn create_playlist(&mut self, name: &str) -> String {
        let mut millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        // Two playlists created within the same millisecond
        while self.playlist(&format!("playlist_{}", millis)).is_some() {
            millis += 1;
        }
        let playlist = Playlist::new(name.trim(), millis);
        let id = playlist.id.clone();
        log::info!("[Library] Created playlist {} ({})", playlist.name, id);
        self.playlists.push(playlist);
        self.persist(STORE_KEY_PLAYLISTS, &self.playlists);
        id
    }

    pub fn delete_playlist(&mut self, id: &str) {
        let before = self.playlists.len();
        self.playlists.retain(|p| p.id != id);
        if self.playlists.len() != before {
            log::info!("[Library] Deleted playlist {}", id);
            self.persist(STORE_KEY_PLAYLISTS, &self.playlists);
        }
    }

    /// Returns false when the playlist is unknown or already has the track
    pub fn add_track_to_playlist(&mut self, playlist_id: &str, track: &Track) -> bool {
        let Some(playlist) = self.playlists.iter_mut().find(|p| p.id == playlist_id) else {
            log::warn!("[Library] Unknown playlist {}", playlist_id);
            return false;
        };
        if playlist.contains(&track.id) {
            return false;
        }
        playlist.tracks.push(track.clone());
        self.persist(STORE_KEY_PLAYLISTS, &self.playlists);
        true
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> Settings {
        self.settings.apply(patch);
        self.persist(STORE_KEY_SETTINGS, &self.settings);
        self.settings
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.persist(STORE_KEY_VOLUME, &self.volume);
    }

    /// Stored settings merged over the defaults
    pub fn load_settings(&mut self, stored: Option<Settings>) {
        self.settings = stored.unwrap_or_default();
    }

    pub fn load_playlists(&mut self, playlists: Vec<Playlist>) {
        self.playlists = playlists;
    }

    pub fn load_liked_tracks(&mut self, tracks: Vec<Track>) {
        self.liked_tracks = tracks
            .into_iter()
            .map(|t| Track { liked: true, ..t })
            .collect();
    }

    pub fn load_recently_played(&mut self, mut tracks: Vec<Track>) {
        tracks.truncate(RECENTLY_PLAYED_LIMIT);
        self.recently_played = tracks;
    }

    /// Set the liked flag on fetched tracks from the library
    pub fn mark_liked(&self, tracks: Vec<Track>) -> Vec<Track> {
        let liked: HashSet<&str> = self.liked_tracks.iter().map(|t| t.id.as_str()).collect();
        tracks
            .into_iter()
            .map(|t| {
                let is_liked = liked.contains(t.id.as_str());
                Track {
                    liked: is_liked,
                    ..t
                }
            })
            .collect()
    }

    pub fn trending_cache(&self) -> TrendingCache {
        self.store
            .as_ref()
            .and_then(|store| store.get_or_log(STORE_KEY_TRENDING_CACHE))
            .unwrap_or_default()
    }

    pub fn save_trending_cache(&self, cache: &TrendingCache) {
        self.persist(STORE_KEY_TRENDING_CACHE, cache);
    }

    fn persist<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Some(store) = &self.store {
            store.set_or_log(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Song {}", id),
            artist: "Band".to_string(),
            duration: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn toggle_like_adds_then_removes() {
        let mut library = Library::default();
        assert!(library.toggle_like(&track("1")));
        assert!(library.is_liked("1"));
        assert!(library.liked_tracks()[0].liked);
        assert!(!library.toggle_like(&track("1")));
        assert!(library.liked_tracks().is_empty());
    }

    #[test]
    fn recently_played_is_mru_and_capped() {
        let mut library = Library::default();
        for i in 0..60 {
            library.add_recently_played(&track(&i.to_string()));
        }
        library.add_recently_played(&track("30"));

        let recent = library.recently_played();
        assert_eq!(recent.len(), RECENTLY_PLAYED_LIMIT);
        assert_eq!(recent[0].id, "30");
        assert_eq!(recent[1].id, "59");
        assert_eq!(recent.iter().filter(|t| t.id == "30").count(), 1);
    }

    #[test]
    fn playlists_reject_duplicates() {
        let mut library = Library::default();
        let first = library.create_playlist("Road trip");
        let second = library.create_playlist("Gym");
        assert_ne!(first, second);
        assert!(first.starts_with("playlist_"));

        assert!(library.add_track_to_playlist(&first, &track("1")));
        assert!(!library.add_track_to_playlist(&first, &track("1")));
        assert!(!library.add_track_to_playlist("playlist_missing", &track("2")));
        assert_eq!(library.playlist(&first).map(|p| p.tracks.len()), Some(1));

        library.delete_playlist(&first);
        assert!(library.playlist(&first).is_none());
        assert_eq!(library.playlists().len(), 1);
    }

    #[test]
    fn mark_liked_annotates_results() {
        let mut library = Library::default();
        library.toggle_like(&track("2"));
        let marked = library.mark_liked(vec![track("1"), track("2")]);
        assert!(!marked[0].liked);
        assert!(marked[1].liked);
    }

    #[test]
    fn changes_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let mut library = Library::load(KeyValueStore::open_in(dir.path()).unwrap());
            library.toggle_like(&track("1"));
            library.add_recently_played(&track("2"));
            let id = library.create_playlist("Mix");
            library.add_track_to_playlist(&id, &track("3"));
            library.update_settings(SettingsPatch { crossfade: Some(8) });
            library.set_volume(0.25);
        }

        let library = Library::load(KeyValueStore::open_in(dir.path()).unwrap());
        assert!(library.is_liked("1"));
        assert_eq!(library.recently_played()[0].id, "2");
        assert_eq!(library.playlists()[0].tracks[0].id, "3");
        assert_eq!(library.settings().crossfade, 8);
        assert_eq!(library.volume(), 0.25);
    }

    #[test]
    fn in_memory_store_still_records_changes() {
        let mut library = Library::load(KeyValueStore::open_in_memory().unwrap());
        library.toggle_like(&track("1"));
        library.add_recently_played(&track("2"));

        let store = library.store.as_ref().unwrap();
        let liked: Vec<Track> = store.get(STORE_KEY_LIKED_TRACKS).unwrap().unwrap();
        let recent: Vec<Track> = store.get(STORE_KEY_RECENTLY_PLAYED).unwrap().unwrap();
        assert_eq!(liked[0].id, "1");
        assert_eq!(recent[0].id, "2");
    }
}
