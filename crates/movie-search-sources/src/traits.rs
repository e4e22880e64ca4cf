use async_trait::async_trait;
use movie_search_models::{MovieDetails, MovieSummary};
use crate::error::ProviderError;

/// Read-only movie catalog.
///
/// Implementations perform exactly one request per call and never retry.
/// Callers cancel a request by dropping the returned future.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Free-text search, results in provider order
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, ProviderError>;

    /// Full record for one identifier
    async fn details(&self, id: &str) -> Result<MovieDetails, ProviderError>;
}
