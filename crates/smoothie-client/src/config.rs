//! Client configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use smoothie_net::HttpServiceConfig;
use smoothie_shared::constants::{
    DEFAULT_HTTP_PORT, DEFAULT_MIGRATION_DELAY_MS, DEFAULT_MIGRATION_INTERVAL_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root URL of the remote recipe service.
    /// Env: `SMOOTHIE_API_URL`
    /// Default: `http://127.0.0.1:8080`
    pub api_url: String,

    /// Static bearer credential for the service.
    /// Env: `SMOOTHIE_API_TOKEN`
    pub api_token: Option<String>,

    /// SQLite file for local recipes and favorites.
    /// Env: `SMOOTHIE_DB_PATH`
    /// Default: the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Env: `SMOOTHIE_MIGRATION_INTERVAL_SECS`
    pub migration_interval: Duration,

    /// Delay before the first migration pass after sign-in.
    /// Env: `SMOOTHIE_MIGRATION_DELAY_MS`
    pub migration_delay: Duration,

    /// Env: `SMOOTHIE_REQUEST_TIMEOUT_SECS`
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: format!("http://127.0.0.1:{DEFAULT_HTTP_PORT}"),
            api_token: None,
            db_path: None,
            migration_interval: Duration::from_secs(DEFAULT_MIGRATION_INTERVAL_SECS),
            migration_delay: Duration::from_millis(DEFAULT_MIGRATION_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("SMOOTHIE_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = url;
        }
        if let Some(token) = lookup("SMOOTHIE_API_TOKEN").filter(|v| !v.is_empty()) {
            config.api_token = Some(token);
        }
        if let Some(path) = lookup("SMOOTHIE_DB_PATH").filter(|v| !v.is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(secs) = parse_positive(&lookup, "SMOOTHIE_MIGRATION_INTERVAL_SECS") {
            config.migration_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_positive(&lookup, "SMOOTHIE_MIGRATION_DELAY_MS") {
            config.migration_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_positive(&lookup, "SMOOTHIE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }

        config
    }

    pub fn http_config(&self) -> HttpServiceConfig {
        let mut http = HttpServiceConfig::new(&self.api_url);
        http.timeout = self.request_timeout;
        if let Some(ref token) = self.api_token {
            http = http.with_token(token);
        }
        http
    }
}

fn parse_positive(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!(key, value = %raw, "Invalid duration, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> ClientConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.migration_interval, Duration::from_secs(30));
        assert_eq!(config.migration_delay, Duration::from_millis(2000));
        assert!(config.db_path.is_none());
    }

    #[test]
    fn env_overrides_apply() {
        let config = from_map(&[
            ("SMOOTHIE_API_URL", "https://recipes.example.com"),
            ("SMOOTHIE_API_TOKEN", "tok"),
            ("SMOOTHIE_MIGRATION_INTERVAL_SECS", "5"),
        ]);
        assert_eq!(config.api_url, "https://recipes.example.com");
        assert_eq!(config.api_token.as_deref(), Some("tok"));
        assert_eq!(config.migration_interval, Duration::from_secs(5));
        assert_eq!(config.http_config().api_token.as_deref(), Some("tok"));
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let config = from_map(&[
            ("SMOOTHIE_MIGRATION_DELAY_MS", "soon"),
            ("SMOOTHIE_REQUEST_TIMEOUT_SECS", "0"),
        ]);
        assert_eq!(config.migration_delay, Duration::from_millis(2000));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}
