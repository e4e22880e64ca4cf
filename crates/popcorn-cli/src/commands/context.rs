use super::{prompts, spinner};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use movie_search_config::{Config, CredentialStore, PathManager, API_KEY_ENV};
use movie_search_core::{FileStorage, KeyBindings, SessionOptions, StoragePort, WatchedList};
use movie_search_sources::{MovieProvider, OmdbClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Paths and validated configuration shared by every command
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
}

impl AppContext {
    /// Call after logging is set up so config problems reach the log
    pub fn load(paths: PathManager) -> Result<Self> {
        paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create directories under {}: {}", paths.config_dir().display(), e))?;

        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

        tracing::debug!(config_file = %config_file.display(), "Configuration loaded");
        Ok(Self { paths, config })
    }

    pub fn store_dir(&self) -> PathBuf {
        self.config.storage.dir.clone().unwrap_or_else(|| self.paths.store_dir())
    }

    pub fn storage(&self) -> Result<Arc<dyn StoragePort>> {
        let dir = self.store_dir();
        let storage = FileStorage::new(&dir).map_err(|e| eyre!("Failed to open store at {}: {}", dir.display(), e))?;
        Ok(Arc::new(storage))
    }

    pub fn watched_list(&self) -> Result<WatchedList> {
        Ok(WatchedList::load(self.storage()?, &self.config.storage.watched_key))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            default_title: self.config.ui.default_title.clone(),
            keys: KeyBindings::new(&self.config.keys.focus_search, &self.config.keys.close_detail),
            watched_key: self.config.storage.watched_key.clone(),
        }
    }

    /// Builds the OMDb client. Without a key on a terminal the user is asked
    /// for one and may store it.
    pub fn provider(&self, output: &Output) -> Result<Arc<dyn MovieProvider>> {
        let credentials_file = self.paths.credentials_file();
        let mut cred_store = CredentialStore::new(credentials_file.clone());
        cred_store
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        let api_key = match cred_store.resolve_api_key() {
            Some(key) => key,
            None if spinner::is_interactive() => {
                output.warn("No OMDb API key configured.");
                let key = prompts::prompt_password("OMDb API key")?;
                if prompts::prompt_yes_no("Save this key for next time?", true)? {
                    cred_store.set_omdb_api_key(key.clone());
                    cred_store
                        .save()
                        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;
                    output.success(format!("API key saved to {}", credentials_file.display()));
                }
                key
            }
            None => {
                return Err(eyre!(
                    "No OMDb API key. Set {} or run 'popcorn config set-key'",
                    API_KEY_ENV
                ))
            }
        };

        let provider = &self.config.provider;
        let client = OmdbClient::new(
            api_key,
            provider.base_url.clone(),
            Duration::from_secs(provider.timeout_seconds),
        )
        .map_err(|e| eyre!("Failed to create OMDb client: {}", e))?;
        Ok(Arc::new(client))
    }
}
