//! Runtime configuration, read once from the environment (and `.env`).

use once_cell::sync::OnceCell;
use std::path::PathBuf;

const DEFAULT_API_BASE_URL: &str = "https://dab.yeet.su/api";
const DEFAULT_TRENDING_URL: &str =
    "https://raw.githubusercontent.com/BlackHatDevX/trending-music-os/refs/heads/main/trending.json";
const DEFAULT_RELEASES_API_URL: &str =
    "https://api.github.com/repos/ruslan/openspot-music-app_snwt/releases/latest";
const DEFAULT_RELEASES_PAGE_URL: &str = "https://github.com/ruslan/openspot-music-app_snwt/releases";

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub trending_url: String,
    pub releases_api_url: String,
    pub releases_page_url: String,
    /// Country used to pick the trending list ("global" when unknown)
    pub country: String,
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            trending_url: DEFAULT_TRENDING_URL.to_string(),
            releases_api_url: DEFAULT_RELEASES_API_URL.to_string(),
            releases_page_url: DEFAULT_RELEASES_PAGE_URL.to_string(),
            country: "global".to_string(),
            data_dir: dirs::data_dir().map(|d| d.join("openspot")),
        }
    }
}

impl AppConfig {
    /// Build config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let country = non_empty("OPENSPOT_COUNTRY")
            .or_else(|| {
                non_empty("LC_ALL")
                    .or_else(|| non_empty("LANG"))
                    .and_then(|locale| country_from_locale(&locale))
            })
            .unwrap_or(defaults.country);

        Self {
            api_base_url: non_empty("OPENSPOT_API_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            trending_url: non_empty("OPENSPOT_TRENDING_URL").unwrap_or(defaults.trending_url),
            releases_api_url: non_empty("OPENSPOT_RELEASES_API_URL")
                .unwrap_or(defaults.releases_api_url),
            releases_page_url: non_empty("OPENSPOT_RELEASES_PAGE_URL")
                .unwrap_or(defaults.releases_page_url),
            country,
            data_dir: non_empty("OPENSPOT_DATA_DIR")
                .map(PathBuf::from)
                .or(defaults.data_dir),
        }
    }
}

/// Extract the region code from a POSIX locale, e.g. `en_US.UTF-8` -> `US`
pub fn country_from_locale(locale: &str) -> Option<String> {
    let without_encoding = locale.split(['.', '@']).next()?;
    let region = without_encoding.split(['_', '-']).nth(1)?;
    if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(region.to_ascii_uppercase())
    } else {
        None
    }
}

/// Load `.env` (if present) and install the global config
pub fn init() -> &'static AppConfig {
    match dotenvy::dotenv() {
        Ok(path) => log::info!("[Config] Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("[Config] No .env file found, using environment"),
        Err(e) => log::warn!("[Config] Failed to read .env file: {}", e),
    }
    CONFIG.get_or_init(AppConfig::from_env)
}

/// Global config; falls back to environment lookup if `init` was never called
pub fn get() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::from_env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn locale_region_is_extracted() {
        assert_eq!(country_from_locale("en_US.UTF-8").as_deref(), Some("US"));
        assert_eq!(country_from_locale("de-de").as_deref(), Some("DE"));
        assert_eq!(country_from_locale("C"), None);
        assert_eq!(country_from_locale("POSIX"), None);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("OPENSPOT_API_BASE_URL", "http://localhost:9000/api/"),
            ("LANG", "fr_FR.UTF-8"),
            ("OPENSPOT_DATA_DIR", "/tmp/openspot-test"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "http://localhost:9000/api");
        assert_eq!(config.country, "FR");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/openspot-test")));
        assert_eq!(config.trending_url, DEFAULT_TRENDING_URL);
    }

    #[test]
    fn explicit_country_beats_locale() {
        let config = AppConfig::from_lookup(|k| match k {
            "OPENSPOT_COUNTRY" => Some("India".to_string()),
            "LANG" => Some("en_GB.UTF-8".to_string()),
            _ => None,
        });
        assert_eq!(config.country, "India");
    }
}
