use super::ApiTrack;
use serde::{Deserialize, Serialize};

/// Track as the app stores and plays it
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: String,
    /// Duration in seconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub audio_url: String,
    #[serde(default)]
    pub liked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl Track {
    /// Convert an API track, filling display defaults for missing fields
    pub fn from_api(api: ApiTrack) -> Self {
        let cover_url = api
            .images
            .as_ref()
            .and_then(|images| {
                images
                    .large
                    .clone()
                    .or_else(|| images.thumbnail.clone())
                    .or_else(|| images.small.clone())
            })
            .or(api.album_cover)
            .unwrap_or_default();

        Self {
            id: api.id,
            title: non_empty_or(api.title, "Unknown Title"),
            artist: non_empty_or(api.artist, "Unknown Artist"),
            album: non_empty_or(api.album_title, "Unknown Album"),
            duration: api.duration.unwrap_or(0.0),
            cover_url,
            audio_url: String::new(),
            liked: false,
            genre: api.genre,
            release_date: api.release_date,
        }
    }

    /// "Title - Artist" label used for display and file names
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::responses::ApiImages;

    #[test]
    fn missing_fields_get_placeholders() {
        let api = ApiTrack {
            id: "42".to_string(),
            ..Default::default()
        };
        let track = Track::from_api(api);
        assert_eq!(track.id, "42");
        assert_eq!(track.title, "Unknown Title");
        assert_eq!(track.artist, "Unknown Artist");
        assert_eq!(track.album, "Unknown Album");
        assert_eq!(track.duration, 0.0);
        assert_eq!(track.cover_url, "");
        assert!(!track.liked);
    }

    #[test]
    fn cover_prefers_large_then_thumbnail_then_small_then_album() {
        let mut api = ApiTrack {
            id: "1".to_string(),
            album_cover: Some("album.jpg".to_string()),
            images: Some(ApiImages {
                small: Some("small.jpg".to_string()),
                thumbnail: Some("thumb.jpg".to_string()),
                large: None,
                back: None,
            }),
            ..Default::default()
        };
        assert_eq!(Track::from_api(api.clone()).cover_url, "thumb.jpg");

        api.images = Some(ApiImages {
            small: Some("small.jpg".to_string()),
            ..Default::default()
        });
        assert_eq!(Track::from_api(api.clone()).cover_url, "small.jpg");

        api.images = None;
        assert_eq!(Track::from_api(api).cover_url, "album.jpg");
    }

    #[test]
    fn stored_json_uses_camel_case() {
        let track = Track {
            id: "7".to_string(),
            title: "Song".to_string(),
            artist: "Band".to_string(),
            cover_url: "c.jpg".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["coverUrl"], "c.jpg");
        assert!(json.get("genre").is_none());
        assert_eq!(track.display_name(), "Song - Band");
    }
}
