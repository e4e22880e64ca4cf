use movie_search_models::FetchError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider answered with its not-found marker
    #[error("not found")]
    NotFound,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("provider is not configured: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transport(e.to_string())
    }
}

impl From<ProviderError> for FetchError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NotFound => FetchError::NotFound,
            ProviderError::Transport(detail) | ProviderError::Configuration(detail) => {
                FetchError::Transport(detail)
            }
        }
    }
}
