//! # configs
//!
//! Layered settings for the LexAssist binaries.
//!
//! Later layers win:
//! 1. built-in defaults
//! 2. `<dir>/default.toml` (optional)
//! 3. `<dir>/local.toml` (optional, not committed)
//! 4. environment, e.g. `LEXASSIST__SEARCH__BASE_URL=https://...`
//!
//! A `.env` file in the working directory is loaded into the environment first.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "LEXASSIST";
pub const DEFAULT_CONFIG_DIR: &str = "config";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub session: SessionSettings,
    pub search: SearchSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct SessionSettings {
    pub prompt_limit: u32,
    pub ttl_secs: u64,
    pub storage_key: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchSettings {
    /// Remote search is disabled when unset
    #[serde(default, deserialize_with = "non_blank")]
    pub base_url: Option<String>,
    pub request_timeout_ms: u64,
    pub default_limit: usize,
    pub debounce_ms: u64,
    pub cache_key: String,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    /// JSON document backing the key-value store
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    /// Fixed bearer token; takes precedence over the stored auth session
    #[serde(default, deserialize_with = "secret")]
    pub access_token: Option<SecretString>,
    pub session_key: String,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub json: bool,
    pub filter: String,
}

impl Settings {
    /// Loads `.env`, then the layers under `./config`.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::load_from(DEFAULT_CONFIG_DIR)
    }

    pub fn load_from(config_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = config_dir.as_ref();
        let settings: Settings = Config::builder()
            .set_default("session.prompt_limit", 10)?
            .set_default("session.ttl_secs", 86_400)?
            .set_default("session.storage_key", "guest_session")?
            .set_default("search.request_timeout_ms", 5_000)?
            .set_default("search.default_limit", 50)?
            .set_default("search.debounce_ms", 300)?
            .set_default("search.cache_key", "forum_posts_cache")?
            .set_default("storage.path", ".lexassist/store.json")?
            .set_default("auth.session_key", "auth_session")?
            .set_default("log.json", false)?
            .set_default("log.filter", "info")?
            .add_source(File::from(dir.join("default.toml")).required(false))
            .add_source(File::from(dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!(dir = %dir.display(), remote = settings.search.base_url.is_some(), "configuration loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (self.session.prompt_limit >= 1, "session.prompt_limit must be at least 1"),
            (self.session.ttl_secs >= 1, "session.ttl_secs must be at least 1"),
            (self.search.default_limit >= 1, "search.default_limit must be at least 1"),
            (self.search.request_timeout_ms >= 1, "search.request_timeout_ms must be at least 1"),
            (!self.session.storage_key.trim().is_empty(), "session.storage_key must not be blank"),
            (!self.search.cache_key.trim().is_empty(), "search.cache_key must not be blank"),
        ];
        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, message)) => Err(ConfigError::Invalid((*message).to_string())),
            None => Ok(()),
        }
    }
}

impl SessionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl SearchSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SecretString>, D::Error> {
    Ok(non_blank(deserializer)?.map(SecretString::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_without_files() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(dir.path()).unwrap();

        assert_eq!(settings.session.prompt_limit, 10);
        assert_eq!(settings.session.ttl(), Duration::from_secs(24 * 60 * 60));
        assert_eq!(settings.session.storage_key, "guest_session");
        assert_eq!(settings.search.request_timeout(), Duration::from_secs(5));
        assert_eq!(settings.search.default_limit, 50);
        assert_eq!(settings.search.cache_key, "forum_posts_cache");
        assert_eq!(settings.storage.path, ".lexassist/store.json");
        assert_eq!(settings.auth.session_key, "auth_session");
        assert!(!settings.log.json);
    }

    #[test]
    fn local_file_overrides_default_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[session]\nprompt_limit = 3\n[search]\nbase_url = \"https://api.example.test\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("local.toml"),
            "[session]\nprompt_limit = 5\n[auth]\naccess_token = \"dev-token\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(dir.path()).unwrap();

        assert_eq!(settings.session.prompt_limit, 5);
        assert_eq!(settings.search.base_url.as_deref(), Some("https://api.example.test"));
        assert_eq!(
            settings.auth.access_token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("dev-token".to_string())
        );
        assert!(!format!("{:?}", settings.auth).contains("dev-token"));
    }

    #[test]
    fn blank_base_url_disables_remote() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("default.toml"), "[search]\nbase_url = \"  \"\n").unwrap();

        assert!(Settings::load_from(dir.path()).unwrap().search.base_url.is_none());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("default.toml"), "[session]\nprompt_limit = 0\n").unwrap();

        assert!(matches!(
            Settings::load_from(dir.path()),
            Err(ConfigError::Invalid(message)) if message.contains("prompt_limit")
        ));
    }
}
