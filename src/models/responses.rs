use serde::{Deserialize, Deserializer, Serialize};

/// Track as returned by the streaming API
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct ApiTrack {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    pub artist_id: Option<u64>,
    #[serde(default)]
    pub album_title: Option<String>,
    pub album_cover: Option<String>,
    pub album_id: Option<String>,
    pub release_date: Option<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    pub audio_quality: Option<AudioQuality>,
    pub streamable: Option<bool>,
    pub images: Option<ApiImages>,
    pub isrc: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AudioQuality {
    pub maximum_bit_depth: Option<u32>,
    pub maximum_sampling_rate: Option<f64>,
    pub is_hi_res: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApiImages {
    pub small: Option<String>,
    pub thumbnail: Option<String>,
    pub large: Option<String>,
    pub back: Option<String>,
}

/// Response of `GET /search`
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Vec<ApiTrack>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
}

/// Response of `GET /stream`
#[derive(Debug, Deserialize, Clone)]
pub struct StreamUrlResponse {
    pub url: Option<String>,
}

/// Response of `GET /lyrics`
#[derive(Debug, Deserialize, Clone)]
pub struct LyricsResponse {
    pub lyrics: Option<String>,
}

/// Latest release info (GitHub releases API)
#[derive(Debug, Deserialize, Clone)]
pub struct ReleaseResponse {
    pub tag_name: Option<String>,
}

/// API ids arrive as numbers or strings; the app keys everything by string
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_are_accepted() {
        let json = r#"{"tracks":[{"id":123,"title":"A"},{"id":"x9","title":"B"}],"total":2}"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.tracks[0].id, "123");
        assert_eq!(resp.tracks[1].id, "x9");
        assert_eq!(resp.total, 2);
        assert_eq!(resp.limit, 0);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"id":1,"title":"T","artist":"A","albumTitle":"Al","duration":215,
            "label":"L","upc":"000","images":{"large":"big.jpg","back":null}}"#;
        let track: ApiTrack = serde_json::from_str(json).unwrap();
        assert_eq!(track.album_title.as_deref(), Some("Al"));
        assert_eq!(track.duration, Some(215.0));
        assert_eq!(
            track.images.and_then(|i| i.large).as_deref(),
            Some("big.jpg")
        );
    }

    #[test]
    fn boolean_id_is_rejected() {
        let json = r#"{"id":true}"#;
        assert!(serde_json::from_str::<ApiTrack>(json).is_err());
    }
}
