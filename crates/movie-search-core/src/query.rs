use crate::effect::{EffectScope, RunContext, RunOutcome};
use crate::fetch_cell::{FetchCell, FetchSlot};
use crate::selection::Selection;
use movie_search_models::{FetchState, MovieSummary};
use movie_search_sources::MovieProvider;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Queries shorter than this (in characters) never reach the provider
pub const MIN_QUERY_CHARS: usize = 2;

pub type SearchState = FetchState<Vec<MovieSummary>>;

/// Keeps a result list in step with a changing search string
pub struct QueryFetcher {
    provider: Arc<dyn MovieProvider>,
    selection: Option<Selection>,
    cell: Arc<FetchCell<Vec<MovieSummary>>>,
    scope: EffectScope<String>,
}

impl QueryFetcher {
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        Self {
            provider,
            selection: None,
            cell: Arc::new(FetchCell::new()),
            scope: EffectScope::new(),
        }
    }

    /// A successful search closes whatever this selection has open
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Re-evaluates against `query`; a no-op when it equals the tracked query.
    ///
    /// Must be called from within a tokio runtime.
    pub fn observe(&mut self, query: &str) -> SearchState {
        let provider = self.provider.clone();
        let cell = self.cell.clone();
        let selection = self.selection.clone();

        self.scope.on_change(query.to_string(), |prev, next, ctx| {
            if next.chars().count() < MIN_QUERY_CHARS {
                debug!(query = %next, "Query too short, clearing results");
                cell.begin(ctx.generation(), FetchState::Ready(Vec::new()));
                return None;
            }
            debug!(previous = ?prev, query = %next, generation = ctx.generation(), "Starting search");
            cell.begin(ctx.generation(), FetchState::Loading);
            Some(tokio::spawn(run_search(provider, cell, selection, next.clone(), ctx)))
        });
        self.state()
    }

    pub fn query(&self) -> Option<&str> {
        self.scope.tracked().map(String::as_str)
    }

    pub fn state(&self) -> SearchState {
        self.cell.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchSlot<Vec<MovieSummary>>> {
        self.cell.subscribe()
    }

    /// Cancels any request in flight and goes back to `Idle`
    pub fn release(&mut self) {
        if let Some(generation) = self.scope.release() {
            self.cell.begin(generation, FetchState::Idle);
        }
    }

    /// Waits for the current request, if any, to finish
    pub async fn settle(&mut self) -> Option<RunOutcome> {
        self.scope.settle().await
    }
}

async fn run_search(
    provider: Arc<dyn MovieProvider>,
    cell: Arc<FetchCell<Vec<MovieSummary>>>,
    selection: Option<Selection>,
    query: String,
    ctx: RunContext,
) -> RunOutcome {
    let result = tokio::select! {
        biased;
        reason = ctx.cancelled() => {
            debug!(query = %query, ?reason, "Search cancelled");
            return RunOutcome::Cancelled(reason);
        }
        result = provider.search(&query) => result,
    };

    let found = result.as_ref().map(|movies| movies.len()).ok();
    let state = match result {
        Ok(movies) => FetchState::Ready(movies),
        Err(e) => {
            debug!(query = %query, error = %e, "Search failed");
            FetchState::Failed(e.into())
        }
    };

    // a fresh result list closes the open detail pane before it becomes visible
    let committed = cell.commit(&ctx, state, || {
        if found.is_some() {
            if let Some(selection) = &selection {
                selection.clear();
            }
        }
        None
    });

    if committed {
        if let Some(count) = found {
            info!(query = %query, results = count, provider = provider.provider_name(), "Search completed");
        }
        RunOutcome::Committed
    } else {
        debug!(query = %query, generation = ctx.generation(), "Discarding stale search result");
        RunOutcome::Stale
    }
}
