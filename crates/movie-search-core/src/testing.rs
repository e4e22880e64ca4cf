use async_trait::async_trait;
use movie_search_models::{MovieDetails, MovieSummary};
use movie_search_sources::{MovieProvider, ProviderError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

type Gate<T> = oneshot::Sender<Result<T, ProviderError>>;
type Pending<T> = oneshot::Receiver<Result<T, ProviderError>>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Answers from canned results, or waits on a gate the test releases later.
/// A gated answer is consumed by the first request for that key.
#[derive(Default)]
pub struct FakeProvider {
    canned_search: Mutex<HashMap<String, Result<Vec<MovieSummary>, ProviderError>>>,
    gated_search: Mutex<HashMap<String, Pending<Vec<MovieSummary>>>>,
    canned_details: Mutex<HashMap<String, Result<MovieDetails, ProviderError>>>,
    gated_details: Mutex<HashMap<String, Pending<MovieDetails>>>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn search_returns(&self, query: &str, result: Result<Vec<MovieSummary>, ProviderError>) {
        lock(&self.canned_search).insert(query.to_string(), result);
    }

    pub fn search_gated(&self, query: &str) -> Gate<Vec<MovieSummary>> {
        let (tx, rx) = oneshot::channel();
        lock(&self.gated_search).insert(query.to_string(), rx);
        tx
    }

    pub fn details_return(&self, id: &str, result: Result<MovieDetails, ProviderError>) {
        lock(&self.canned_details).insert(id.to_string(), result);
    }

    pub fn details_gated(&self, id: &str) -> Gate<MovieDetails> {
        let (tx, rx) = oneshot::channel();
        lock(&self.gated_details).insert(id.to_string(), rx);
        tx
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

async fn answer<T: Clone>(
    gated: Option<Pending<T>>,
    canned: Option<Result<T, ProviderError>>,
    key: &str,
) -> Result<T, ProviderError> {
    if let Some(rx) = gated {
        return rx
            .await
            .unwrap_or_else(|_| Err(ProviderError::Transport("gate dropped".to_string())));
    }
    canned.unwrap_or_else(|| Err(ProviderError::Transport(format!("no script for {}", key))))
}

#[async_trait]
impl MovieProvider for FakeProvider {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, ProviderError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let gated = lock(&self.gated_search).remove(query);
        let canned = lock(&self.canned_search).get(query).cloned();
        answer(gated, canned, query).await
    }

    async fn details(&self, id: &str) -> Result<MovieDetails, ProviderError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let gated = lock(&self.gated_details).remove(id);
        let canned = lock(&self.canned_details).get(id).cloned();
        answer(gated, canned, id).await
    }
}

pub fn summary(id: &str, title: &str) -> MovieSummary {
    MovieSummary {
        id: id.to_string(),
        title: title.to_string(),
        year: "1999".to_string(),
        poster_url: None,
    }
}

pub fn details(id: &str, title: &str, runtime: &str, rating: &str) -> MovieDetails {
    MovieDetails {
        id: id.to_string(),
        title: Some(title.to_string()),
        year: Some("1999".to_string()),
        runtime: Some(runtime.to_string()),
        imdb_rating: Some(rating.to_string()),
        ..MovieDetails::default()
    }
}
