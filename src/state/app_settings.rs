use log::LevelFilter;
use matchday_api::client::DEFAULT_BASE_URL;
use std::time::Duration;

pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8787";
pub const DEFAULT_REFRESH_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_url: String,
    pub ws_url: String,
    pub fixture_id: Option<String>,
    pub api_token: Option<String>,
    pub refresh_interval: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_url: DEFAULT_BASE_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            fixture_id: None,
            api_token: None,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
        }
    }
}

impl AppSettings {
    /// Read `MATCHDAY_*` environment variables. Anything unset or
    /// unparsable keeps its default.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            full_screen: false,
            log_level: var("MATCHDAY_LOG").and_then(|v| v.parse::<LevelFilter>().ok()),
            api_url: var("MATCHDAY_API_URL").unwrap_or(defaults.api_url),
            ws_url: var("MATCHDAY_WS_URL").unwrap_or(defaults.ws_url),
            fixture_id: var("MATCHDAY_FIXTURE"),
            api_token: var("MATCHDAY_API_TOKEN"),
            refresh_interval: var("MATCHDAY_REFRESH_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.refresh_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> AppSettings {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let s = settings(&[]);
        assert_eq!(s.api_url, DEFAULT_BASE_URL);
        assert_eq!(s.ws_url, DEFAULT_WS_URL);
        assert_eq!(s.refresh_interval, Duration::from_secs(15));
        assert!(s.fixture_id.is_none());
        assert!(s.log_level.is_none());
    }

    #[test]
    fn reads_overrides_and_ignores_garbage() {
        let s = settings(&[
            ("MATCHDAY_API_URL", "https://league.example/api"),
            ("MATCHDAY_FIXTURE", " fx-9 "),
            ("MATCHDAY_LOG", "debug"),
            ("MATCHDAY_REFRESH_SECS", "0"),
            ("MATCHDAY_API_TOKEN", "   "),
        ]);
        assert_eq!(s.api_url, "https://league.example/api");
        assert_eq!(s.fixture_id.as_deref(), Some("fx-9"));
        assert_eq!(s.log_level, Some(LevelFilter::Debug));
        assert_eq!(s.refresh_interval, Duration::from_secs(15));
        assert!(s.api_token.is_none());
    }
}
