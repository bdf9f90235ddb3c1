//! Flat key-value store with JSON values, backed by SQLite

use crate::utils::errors::StoreError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const DB_FILE_NAME: &str = "store.db";

pub struct KeyValueStore {
    conn: Connection,
    path: PathBuf,
}

impl KeyValueStore {
    /// Open the store in the configured data directory
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = crate::config::get()
            .data_dir
            .clone()
            .ok_or(StoreError::NoDataDir)?;
        Self::open_in(&dir)
    }

    /// Open (or create) the store inside `dir`
    pub fn open_in(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(DB_FILE_NAME);
        let conn = Connection::open(&path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );",
        )?;
        log::info!("[Store] Opened key-value store at {}", path.display());
        Ok(Self { conn, path })
    }

    /// In-memory store for when the data directory is unusable
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );",
        )?;
        log::warn!("[Store] Using in-memory store, changes will not persist");
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and deserialize a value; `Ok(None)` when the key is absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write a value, replacing any previous one
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, json, now],
        )?;
        log::debug!("[Store] Saved '{}' ({} bytes)", key, json.len());
        Ok(())
    }

    /// Read a value, logging and discarding unreadable entries
    pub fn get_or_log<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::error!("[Store] Failed to load '{}': {}", key, e);
                None
            }
        }
    }

    /// Write a value, logging failures instead of propagating them
    pub fn set_or_log<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.set(key, value) {
            log::error!("[Store] Failed to save '{}': {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Settings, Track};

    #[test]
    fn values_round_trip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyValueStore::open_in(dir.path()).unwrap();

        assert_eq!(store.get::<Settings>("settings").unwrap(), None);

        store.set("settings", &Settings { crossfade: 7 }).unwrap();
        store.set("settings", &Settings { crossfade: 9 }).unwrap();
        assert_eq!(
            store.get::<Settings>("settings").unwrap(),
            Some(Settings { crossfade: 9 })
        );
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let track = Track {
            id: "1".to_string(),
            title: "Song".to_string(),
            artist: "Band".to_string(),
            ..Default::default()
        };
        {
            let store = KeyValueStore::open_in(dir.path()).unwrap();
            store.set("recentlyPlayed", &vec![track.clone()]).unwrap();
        }
        let store = KeyValueStore::open_in(dir.path()).unwrap();
        let loaded: Vec<Track> = store.get("recentlyPlayed").unwrap().unwrap();
        assert_eq!(loaded, vec![track]);
    }

    #[test]
    fn mismatched_type_is_a_json_error() {
        let store = KeyValueStore::open_in_memory().unwrap();
        store.set("playlists", "not a list").unwrap();
        assert!(matches!(
            store.get::<Vec<Track>>("playlists"),
            Err(StoreError::Json(_))
        ));
        assert!(store.get_or_log::<Vec<Track>>("playlists").is_none());
    }
}
