use crate::error::ProviderError;
use crate::omdb::api;
use crate::traits::MovieProvider;
use async_trait::async_trait;
use movie_search_models::{MovieDetails, MovieSummary};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::Configuration("OMDb API key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl MovieProvider for OmdbClient {
    fn provider_name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, ProviderError> {
        api::search_movies(&self.client, &self.base_url, &self.api_key, query).await
    }

    async fn details(&self, id: &str) -> Result<MovieDetails, ProviderError> {
        api::get_movie_details(&self.client, &self.base_url, &self.api_key, id).await
    }
}
