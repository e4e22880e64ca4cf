use movie_search_models::is_valid_storage_key;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keys: KeyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout; a timed out request surfaces as a transport error
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UiConfig {
    /// Title shown while no detail record is open
    #[serde(default = "default_title")]
    pub default_title: String,
}

/// Key codes, compared case-insensitively
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KeyConfig {
    #[serde(default = "default_focus_search_key")]
    pub focus_search: String,
    #[serde(default = "default_close_detail_key")]
    pub close_detail: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_watched_key")]
    pub watched_key: String,
    /// Overrides the platform data directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_title() -> String {
    "usePopcorn".to_string()
}

fn default_focus_search_key() -> String {
    "Enter".to_string()
}

fn default_close_detail_key() -> String {
    "Escape".to_string()
}

fn default_watched_key() -> String {
    "watched".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
        }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            focus_search: default_focus_search_key(),
            close_detail: default_close_detail_key(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            watched_key: default_watched_key(),
            dir: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults when the file does not exist; a present but broken file is an error
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.provider.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("provider.base_url cannot be empty"));
        }
        if !self.provider.base_url.starts_with("http://") && !self.provider.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("provider.base_url must be an http(s) URL: {}", self.provider.base_url));
        }
        if self.provider.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("provider.timeout_seconds must be positive"));
        }
        if self.keys.focus_search.trim().is_empty() || self.keys.close_detail.trim().is_empty() {
            return Err(anyhow::anyhow!("key bindings cannot be empty"));
        }
        if self.keys.focus_search.eq_ignore_ascii_case(&self.keys.close_detail) {
            return Err(anyhow::anyhow!(
                "keys.focus_search and keys.close_detail are both bound to {}",
                self.keys.focus_search
            ));
        }
        if !is_valid_storage_key(&self.storage.watched_key) {
            return Err(anyhow::anyhow!(
                "storage.watched_key must use letters, digits, '-', '_' or '.' and not start with '.': {:?}",
                self.storage.watched_key
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            provider: ProviderConfig {
                base_url: "http://localhost:8080/".to_string(),
                timeout_seconds: 3,
            },
            ui: UiConfig {
                default_title: "Movies".to_string(),
            },
            ..Config::default()
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.provider.base_url, "http://localhost:8080/");
        assert_eq!(loaded.provider.timeout_seconds, 3);
        assert_eq!(loaded.ui.default_title, "Movies");
        assert_eq!(loaded.keys.close_detail, "Escape");
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[keys]\nclose_detail = \"Backspace\"\n").unwrap();

        let loaded = Config::load_from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(loaded.keys.close_detail, "Backspace");
        assert_eq!(loaded.keys.focus_search, "Enter");
        assert_eq!(loaded.provider.base_url, "https://www.omdbapi.com/");
        assert_eq!(loaded.storage.watched_key, "watched");
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(loaded.ui.default_title, "usePopcorn");
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.keys.close_detail = "enter".to_string();
        assert!(config.validate().is_err());

        config.keys.close_detail = "Escape".to_string();
        config.provider.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.provider.timeout_seconds = 10;
        config.provider.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_watched_key_must_be_storable() {
        let mut config = Config::default();
        for key in ["my list", "../x", ".hidden", ""] {
            config.storage.watched_key = key.to_string();
            assert!(config.validate().is_err(), "accepted {:?}", key);
        }

        config.storage.watched_key = "watched-2024".to_string();
        assert!(config.validate().is_ok());
    }
}
