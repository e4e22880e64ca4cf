use crate::effect::{CancelReason, EffectScope, RunContext, RunOutcome};
use crate::fetch_cell::{FetchCell, FetchSlot, Lease};
use crate::selection::Selection;
use crate::title::DocumentTitle;
use chrono::Utc;
use movie_search_models::{FetchState, MovieDetails, MovieId, WatchedEntry};
use movie_search_sources::MovieProvider;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

pub type DetailState = FetchState<MovieDetails>;

/// Fetches the full record of the selected title and owns the ambient title
/// while that record is shown
pub struct DetailFetcher {
    provider: Arc<dyn MovieProvider>,
    title: DocumentTitle,
    selection: Option<Selection>,
    cell: Arc<FetchCell<MovieDetails>>,
    scope: EffectScope<MovieId>,
}

impl DetailFetcher {
    pub fn new(provider: Arc<dyn MovieProvider>, title: DocumentTitle) -> Self {
        Self {
            provider,
            title,
            selection: None,
            cell: Arc::new(FetchCell::new()),
            scope: EffectScope::new(),
        }
    }

    /// Ties each request to `selection`: once the selection moves off the
    /// requested id the request is abandoned and its result can no longer
    /// commit, even before the fetcher is observed again
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Re-evaluates against the selected id. `None` closes the detail view and
    /// abandons whatever request is in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn observe(&mut self, id: Option<&str>) -> DetailState {
        let Some(id) = id else {
            self.release();
            return self.state();
        };

        let provider = self.provider.clone();
        let cell = self.cell.clone();
        let title = self.title.clone();
        let selection = self.selection.clone();
        self.scope.on_change(id.to_string(), |prev, next, ctx| {
            debug!(previous = ?prev, id = %next, generation = ctx.generation(), "Loading movie details");
            cell.begin(ctx.generation(), FetchState::Loading);
            Some(tokio::spawn(run_details(provider, cell, title, selection, next.clone(), ctx)))
        });
        self.state()
    }

    /// Tears the view down: cancels the request in flight even when the id is
    /// unchanged, drops the title lease and goes back to `Idle`
    pub fn release(&mut self) {
        if let Some(generation) = self.scope.release() {
            self.cell.begin(generation, FetchState::Idle);
        }
    }

    pub fn tracked_id(&self) -> Option<&str> {
        self.scope.tracked().map(String::as_str)
    }

    pub fn state(&self) -> DetailState {
        self.cell.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchSlot<MovieDetails>> {
        self.cell.subscribe()
    }

    pub async fn settle(&mut self) -> Option<RunOutcome> {
        self.scope.settle().await
    }
}

async fn run_details(
    provider: Arc<dyn MovieProvider>,
    cell: Arc<FetchCell<MovieDetails>>,
    title: DocumentTitle,
    selection: Option<Selection>,
    id: MovieId,
    ctx: RunContext,
) -> RunOutcome {
    let deselected = async {
        match &selection {
            Some(selection) => selection.moved_from(&id).await,
            None => std::future::pending().await,
        }
    };

    let result = tokio::select! {
        biased;
        reason = ctx.cancelled() => {
            match reason {
                CancelReason::Superseded => debug!(id = %id, "Detail request superseded"),
                CancelReason::Abandoned => debug!(id = %id, "Detail request abandoned"),
            }
            return RunOutcome::Cancelled(reason);
        }
        () = deselected => {
            debug!(id = %id, "Detail pane closed, abandoning request");
            return RunOutcome::Cancelled(CancelReason::Abandoned);
        }
        result = provider.details(&id) => result,
    };

    let state = match result {
        Ok(details) => FetchState::Ready(details),
        Err(e) => {
            debug!(id = %id, error = %e, "Detail request failed");
            FetchState::Failed(e.into())
        }
    };
    let shown = state.ready().map(|details| details.display_title().to_string());

    let commit = || {
        cell.commit(&ctx, state, || {
            shown.map(|name| Box::new(title.acquire(&name)) as Lease)
        })
    };
    let committed = match &selection {
        Some(selection) => selection.while_selected(&id, commit).unwrap_or(false),
        None => commit(),
    };

    if committed {
        info!(id = %id, "Movie details loaded");
        RunOutcome::Committed
    } else {
        debug!(id = %id, generation = ctx.generation(), "Discarding stale movie details");
        RunOutcome::Stale
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("runtime {0:?} does not start with a number of minutes")]
    InvalidRuntime(String),
    #[error("user rating must be between 1 and 10, got {0}")]
    InvalidUserRating(u8),
    #[error("movie record has no id")]
    MissingId,
}

/// Leading whole number of a runtime such as `"142 min"`
pub fn parse_runtime_minutes(runtime: &str) -> Result<u32, EntryError> {
    runtime
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<u32>().ok())
        .ok_or_else(|| EntryError::InvalidRuntime(runtime.to_string()))
}

/// Provider rating as a number; `"N/A"` and friends come back as `None`
pub fn parse_external_rating(rating: Option<&str>) -> Option<f64> {
    rating
        .and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Builds the watched-list entry for a detail record rated by the user
pub fn to_watched_entry(details: &MovieDetails, user_rating: u8) -> Result<WatchedEntry, EntryError> {
    if details.id.trim().is_empty() {
        return Err(EntryError::MissingId);
    }
    if !(1..=10).contains(&user_rating) {
        return Err(EntryError::InvalidUserRating(user_rating));
    }
    let runtime_minutes = parse_runtime_minutes(details.runtime.as_deref().unwrap_or(""))?;

    Ok(WatchedEntry {
        id: details.id.clone(),
        title: details.display_title().to_string(),
        year: details.year.clone().unwrap_or_default(),
        poster_url: details.poster.clone(),
        external_rating: parse_external_rating(details.imdb_rating.as_deref()),
        runtime_minutes,
        user_rating,
        added_at: Some(Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{details, FakeProvider};
    use movie_search_models::FetchError;
    use movie_search_sources::ProviderError;

    fn fetcher(provider: &Arc<FakeProvider>) -> (DetailFetcher, DocumentTitle) {
        let title = DocumentTitle::new("usePopcorn");
        (DetailFetcher::new(provider.clone(), title.clone()), title)
    }

    #[tokio::test]
    async fn test_none_is_idle_without_request() {
        let provider = Arc::new(FakeProvider::default());
        let (mut fetcher, _title) = fetcher(&provider);
        assert_eq!(fetcher.observe(None), FetchState::Idle);
        assert_eq!(provider.detail_calls(), 0);
    }

    #[tokio::test]
    async fn test_ready_sets_title_and_close_restores_it() {
        let provider = Arc::new(FakeProvider::default());
        provider.details_return("tt1375666", Ok(details("tt1375666", "Inception", "148 min", "8.8")));
        let (mut fetcher, title) = fetcher(&provider);

        assert_eq!(fetcher.observe(Some("tt1375666")), FetchState::Loading);
        assert_eq!(fetcher.settle().await, Some(RunOutcome::Committed));
        assert_eq!(title.current(), "Movie | Inception");

        fetcher.observe(None);
        assert_eq!(fetcher.state(), FetchState::Idle);
        assert_eq!(title.current(), "usePopcorn");
    }

    #[tokio::test]
    async fn test_switching_id_restores_title_while_loading() {
        let provider = Arc::new(FakeProvider::default());
        provider.details_return("tt1", Ok(details("tt1", "Alien", "117 min", "8.5")));
        let gate = provider.details_gated("tt2");
        let (mut fetcher, title) = fetcher(&provider);

        fetcher.observe(Some("tt1"));
        fetcher.settle().await;
        assert_eq!(title.current(), "Movie | Alien");

        fetcher.observe(Some("tt2"));
        assert_eq!(title.current(), "usePopcorn");
        drop(gate);
    }

    #[tokio::test]
    async fn test_superseded_detail_never_lands() {
        let provider = Arc::new(FakeProvider::default());
        let slow = provider.details_gated("tt1");
        provider.details_return("tt2", Ok(details("tt2", "Aliens", "137 min", "8.4")));
        let (mut fetcher, title) = fetcher(&provider);

        fetcher.observe(Some("tt1"));
        tokio::task::yield_now().await;
        fetcher.observe(Some("tt2"));
        fetcher.settle().await;

        let _ = slow.send(Ok(details("tt1", "Alien", "117 min", "8.5")));
        tokio::task::yield_now().await;
        assert_eq!(fetcher.state().ready().map(|d| d.id.as_str()), Some("tt2"));
        assert_eq!(title.current(), "Movie | Aliens");
    }

    #[tokio::test]
    async fn test_release_abandons_without_error() {
        let provider = Arc::new(FakeProvider::default());
        let slow = provider.details_gated("tt1");
        let (mut fetcher, title) = fetcher(&provider);

        fetcher.observe(Some("tt1"));
        tokio::task::yield_now().await;
        fetcher.release();
        let _ = slow.send(Err(ProviderError::Transport("late".to_string())));
        tokio::task::yield_now().await;

        assert_eq!(fetcher.state(), FetchState::Idle);
        assert!(fetcher.state().error().is_none());
        assert_eq!(title.current(), "usePopcorn");
        assert_eq!(fetcher.tracked_id(), None);
    }

    #[tokio::test]
    async fn test_closing_selection_abandons_request_at_once() {
        let provider = Arc::new(FakeProvider::default());
        let slow = provider.details_gated("tt1");
        let selection = Selection::new();
        selection.select("tt1".to_string());
        let title = DocumentTitle::new("usePopcorn");
        let mut fetcher =
            DetailFetcher::new(provider.clone(), title.clone()).with_selection(selection.clone());

        fetcher.observe(Some("tt1"));
        tokio::task::yield_now().await;
        selection.clear();

        let _ = slow.send(Ok(details("tt1", "Alien", "117 min", "8.5")));
        assert_eq!(fetcher.settle().await, Some(RunOutcome::Cancelled(CancelReason::Abandoned)));
        assert!(fetcher.state().ready().is_none());
        assert_eq!(title.current(), "usePopcorn");
    }

    #[tokio::test]
    async fn test_failures_map_to_fetch_errors() {
        let provider = Arc::new(FakeProvider::default());
        provider.details_return("tt0", Err(ProviderError::NotFound));
        let (mut fetcher, title) = fetcher(&provider);

        fetcher.observe(Some("tt0"));
        fetcher.settle().await;
        assert_eq!(fetcher.state(), FetchState::Failed(FetchError::NotFound));
        assert_eq!(title.current(), "usePopcorn");
    }

    #[test]
    fn test_runtime_parsing() {
        assert_eq!(parse_runtime_minutes("142 min"), Ok(142));
        assert_eq!(parse_runtime_minutes("90"), Ok(90));
        assert!(matches!(parse_runtime_minutes(""), Err(EntryError::InvalidRuntime(_))));
        assert!(matches!(parse_runtime_minutes("N/A"), Err(EntryError::InvalidRuntime(_))));
    }

    #[test]
    fn test_external_rating_parsing() {
        assert_eq!(parse_external_rating(Some("8.8")), Some(8.8));
        assert_eq!(parse_external_rating(Some("N/A")), None);
        assert_eq!(parse_external_rating(Some("NaN")), None);
        assert_eq!(parse_external_rating(None), None);
    }

    #[test]
    fn test_to_watched_entry() {
        let record = details("tt0133093", "The Matrix", "136 min", "N/A");
        let entry = to_watched_entry(&record, 9).unwrap();
        assert_eq!(entry.id, "tt0133093");
        assert_eq!(entry.title, "The Matrix");
        assert_eq!(entry.runtime_minutes, 136);
        assert_eq!(entry.external_rating, None);
        assert_eq!(entry.user_rating, 9);
        assert!(entry.added_at.is_some());
    }

    #[test]
    fn test_to_watched_entry_rejects_bad_input() {
        let mut record = details("tt1", "X", "", "7.0");
        assert!(matches!(to_watched_entry(&record, 5), Err(EntryError::InvalidRuntime(_))));

        record.runtime = Some("100 min".to_string());
        assert_eq!(to_watched_entry(&record, 0), Err(EntryError::InvalidUserRating(0)));
        assert_eq!(to_watched_entry(&record, 11), Err(EntryError::InvalidUserRating(11)));

        record.id = String::new();
        assert_eq!(to_watched_entry(&record, 5), Err(EntryError::MissingId));
    }
}
