// Streaming API client modules

pub mod lyrics;
pub mod releases;
pub mod search;
pub mod stream;
pub mod trending;

// Re-export commonly used functions
pub use lyrics::get_lyrics;
pub use releases::fetch_latest_release;
pub use search::search_tracks;
pub use stream::{download_track_bytes, get_stream_url};
pub use trending::fetch_trending;

/// `{base}{path}?k=v&...` with every value percent-encoded
pub fn build_url(base: &str, path: &str, params: &[(&str, &str)]) -> String {
    let mut url = format!("{}{}", base.trim_end_matches('/'), path);
    for (i, (key, value)) in params.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

/// Endpoint on the configured API base
pub(crate) fn endpoint(path: &str, params: &[(&str, &str)]) -> String {
    build_url(&crate::config::get().api_base_url, path, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_values_are_encoded() {
        assert_eq!(
            build_url(
                "https://dab.yeet.su/api/",
                "/search",
                &[("q", "AC/DC & friends"), ("offset", "0"), ("type", "track")]
            ),
            "https://dab.yeet.su/api/search?q=AC%2FDC%20%26%20friends&offset=0&type=track"
        );
        assert_eq!(build_url("http://h", "/x", &[]), "http://h/x");
    }
}
