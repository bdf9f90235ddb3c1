/// Home screen data - the "made for you" mix and the trending list
use crate::api::trending::TrendingMap;
use crate::constants::{MIXED_TRACKS_LIMIT, SEARCH_LIMIT};
use crate::models::Track;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::Sender;

/// Trending entry ("Title - Artist") -> first search hit
pub type TrendingCache = HashMap<String, Track>;

/// Home screen content sections
#[derive(Debug, Clone, Default)]
pub struct HomeContent {
    pub mixed_tracks: Vec<Track>,
    pub trending_tracks: Vec<Track>,
    pub trending_loading: bool,
    pub trending_error: Option<String>,
    /// Name of the region the trending list was picked for
    pub trending_region: String,
    pub initial_fetch_done: bool,
}

/// Progress of a trending load, sent to the UI as it happens
#[derive(Debug)]
pub enum TrendingUpdate {
    Region(String),
    /// Everything resolved so far, in list order of arrival
    Tracks(Vec<Track>),
    Error(String),
    /// Cache after new lookups; only sent when it changed
    CacheChanged(TrendingCache),
    Done,
}

/// Liked and recently played tracks, de-duplicated (first wins), shuffled,
/// capped at 20
pub fn mixed_tracks<R: Rng + ?Sized>(liked: &[Track], recent: &[Track], rng: &mut R) -> Vec<Track> {
    let mut seen = HashSet::new();
    let mut mixed: Vec<Track> = liked
        .iter()
        .chain(recent.iter())
        .filter(|t| seen.insert(t.id.clone()))
        .cloned()
        .collect();
    mixed.shuffle(rng);
    mixed.truncate(MIXED_TRACKS_LIMIT);
    mixed
}

/// Region names used as keys in the trending list
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("GB", "United Kingdom"),
    ("IN", "India"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("ES", "Spain"),
    ("IT", "Italy"),
    ("BR", "Brazil"),
    ("MX", "Mexico"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("RU", "Russia"),
    ("UA", "Ukraine"),
    ("PL", "Poland"),
    ("NL", "Netherlands"),
    ("SE", "Sweden"),
    ("TR", "Turkey"),
    ("ID", "Indonesia"),
    ("PK", "Pakistan"),
    ("NG", "Nigeria"),
    ("ZA", "South Africa"),
    ("AR", "Argentina"),
];

/// Two-letter codes become region names; anything else is kept
pub fn country_display_name(country: &str) -> String {
    COUNTRY_NAMES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(country))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| country.to_string())
}

/// List for `country` (case-insensitive), else the `global` list
pub fn select_trending_list<'a>(map: &'a TrendingMap, country: &str) -> Option<&'a Vec<String>> {
    let wanted = country_display_name(country).to_lowercase();
    map.iter()
        .find(|(key, _)| key.to_lowercase() == wanted)
        .map(|(_, list)| list)
        .or_else(|| map.get("global"))
}

/// Cached hits for `list`, in list order
pub fn cached_tracks(list: &[String], cache: &TrendingCache) -> Vec<Track> {
    list.iter().filter_map(|entry| cache.get(entry).cloned()).collect()
}

/// Fetch the trending list and resolve each entry, cached ones first
pub fn spawn_trending_load(country: String, cache: TrendingCache, tx: Sender<TrendingUpdate>) {
    crate::utils::async_helper::spawn_fire_and_forget(move || {
        Box::pin(async move {
            load_trending(&country, cache, &tx).await;
            let _ = tx.send(TrendingUpdate::Done);
            Ok::<(), String>(())
        })
    });
}

async fn load_trending(country: &str, mut cache: TrendingCache, tx: &Sender<TrendingUpdate>) {
    let map = match crate::api::fetch_trending().await {
        Ok(map) => map,
        Err(e) => {
            log::error!("[Home] Trending data fetch error: {}", e);
            let _ = tx.send(TrendingUpdate::Error(format!(
                "Failed to load trending data: {}",
                e
            )));
            return;
        }
    };

    let Some(list) = select_trending_list(&map, country) else {
        log::warn!("[Home] No trending list for {} and no global list", country);
        return;
    };
    let region = if map.keys().any(|k| k.eq_ignore_ascii_case(&country_display_name(country))) {
        country_display_name(country)
    } else {
        "global".to_string()
    };
    let _ = tx.send(TrendingUpdate::Region(region));

    let mut tracks = cached_tracks(list, &cache);
    let _ = tx.send(TrendingUpdate::Tracks(tracks.clone()));

    let mut changed = false;
    for entry in list {
        if cache.contains_key(entry) {
            continue;
        }
        log::debug!("[Home] Searching trending entry {:?}", entry);
        match crate::api::search_tracks(entry, 0, SEARCH_LIMIT).await {
            Ok(result) => match result.tracks.into_iter().next() {
                Some(first) => {
                    let track = Track::from_api(first);
                    cache.insert(entry.clone(), track.clone());
                    tracks.push(track);
                    changed = true;
                    if tx.send(TrendingUpdate::Tracks(tracks.clone())).is_err() {
                        return;
                    }
                }
                None => log::warn!("[Home] No results for trending entry {:?}", entry),
            },
            Err(e) => {
                log::error!("[Home] Error fetching trending entry {:?}: {}", entry, e);
                let _ = tx.send(TrendingUpdate::Error(format!(
                    "Failed to load some trending tracks: {}",
                    e
                )));
            }
        }
    }

    if changed {
        let _ = tx.send(TrendingUpdate::CacheChanged(cache));
    }
}
