use crate::detail::{to_watched_entry, DetailFetcher, DetailState, EntryError};
use crate::fetch_cell::FetchSlot;
use crate::keys::{KeyBindings, ShortcutAction};
use crate::query::{QueryFetcher, SearchState};
use crate::selection::Selection;
use crate::store::StoragePort;
use crate::title::{DocumentTitle, TitleSignal};
use crate::watched::{WatchedError, WatchedList, DEFAULT_WATCHED_KEY};
use movie_search_models::{MovieDetails, MovieId, MovieSummary};
use movie_search_sources::MovieProvider;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    QueryChanged(String),
    /// Opens `id`, or closes it when it is already open
    Select(MovieId),
    CloseDetail,
    Rate(u8),
    /// Adds the open movie with the current rating
    AddWatched,
    RemoveWatched(MovieId),
    KeyPressed { code: String, query_focused: bool },
}

/// What moved since the last call to [`Session::changed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Search,
    Selection,
    Detail,
    Title,
    Closed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no movie details are loaded")]
    NoDetails,
    #[error("rate the movie before adding it")]
    NotRated,
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Watched(#[from] WatchedError),
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub default_title: String,
    pub keys: KeyBindings,
    pub watched_key: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            default_title: "usePopcorn".to_string(),
            keys: KeyBindings::default(),
            watched_key: DEFAULT_WATCHED_KEY.to_string(),
        }
    }
}

/// One interactive search session.
///
/// Wires the query and detail fetchers, the selection, the ambient title and
/// the watched list together. It owns no fetch logic: it forwards UI events
/// and re-observes the detail fetcher whenever the selection moves, whoever
/// moved it.
pub struct Session {
    query: String,
    query_focused: bool,
    rating: Option<u8>,
    keys: KeyBindings,
    selection: Selection,
    title: DocumentTitle,
    search: QueryFetcher,
    detail: DetailFetcher,
    watched: WatchedList,
    selection_rx: watch::Receiver<Option<MovieId>>,
    search_rx: watch::Receiver<FetchSlot<Vec<MovieSummary>>>,
    detail_rx: watch::Receiver<FetchSlot<MovieDetails>>,
    title_rx: watch::Receiver<TitleSignal>,
}

impl Session {
    pub fn new(
        provider: Arc<dyn MovieProvider>,
        storage: Arc<dyn StoragePort>,
        options: SessionOptions,
    ) -> Self {
        let selection = Selection::new();
        let title = DocumentTitle::new(options.default_title);
        let search = QueryFetcher::new(provider.clone()).with_selection(selection.clone());
        let detail = DetailFetcher::new(provider, title.clone()).with_selection(selection.clone());
        let watched = WatchedList::load(storage, &options.watched_key);

        Self {
            query: String::new(),
            query_focused: false,
            rating: None,
            keys: options.keys,
            selection_rx: selection.subscribe(),
            search_rx: search.subscribe(),
            detail_rx: detail.subscribe(),
            title_rx: title.subscribe(),
            selection,
            title,
            search,
            detail,
            watched,
        }
    }

    /// Applies one UI event. Must be called from within a tokio runtime.
    pub fn handle(&mut self, event: UiEvent) -> Result<(), SessionError> {
        match event {
            UiEvent::QueryChanged(query) => self.set_query(query),
            UiEvent::Select(id) => {
                self.selection.toggle(id);
                self.sync_detail();
            }
            UiEvent::CloseDetail => self.close_detail(),
            UiEvent::Rate(rating) => {
                if !(1..=10).contains(&rating) {
                    return Err(EntryError::InvalidUserRating(rating).into());
                }
                self.rating = Some(rating);
            }
            UiEvent::AddWatched => self.add_watched()?,
            UiEvent::RemoveWatched(id) => {
                self.watched.remove(&id)?;
            }
            UiEvent::KeyPressed { code, query_focused } => {
                self.query_focused = query_focused;
                match self.keys.resolve(&code, query_focused) {
                    Some(ShortcutAction::CloseDetail) => self.close_detail(),
                    Some(ShortcutAction::FocusSearch) => {
                        self.query_focused = true;
                        self.set_query(String::new());
                    }
                    None => {}
                }
            }
        }
        Ok(())
    }

    fn set_query(&mut self, query: String) {
        self.search.observe(&query);
        self.query = query;
    }

    fn close_detail(&mut self) {
        self.selection.clear();
        self.sync_detail();
    }

    fn add_watched(&mut self) -> Result<(), SessionError> {
        let details = self.detail.state().ready().cloned().ok_or(SessionError::NoDetails)?;
        let rating = self.rating.ok_or(SessionError::NotRated)?;
        let entry = to_watched_entry(&details, rating)?;
        self.watched.add(entry)?;
        self.close_detail();
        Ok(())
    }

    /// Points the detail fetcher at the current selection
    fn sync_detail(&mut self) {
        let selected = self.selection_rx.borrow_and_update().clone();
        if selected.as_deref() != self.detail.tracked_id() {
            debug!(selected = ?selected, "Selection moved");
            self.rating = None;
        }
        self.detail.observe(selected.as_deref());
    }

    /// Waits for the next observable change. A selection change (for example
    /// one cleared by a successful search) re-observes the detail fetcher
    /// before this returns.
    pub async fn changed(&mut self) -> Change {
        tokio::select! {
            biased;
            Ok(()) = self.selection_rx.changed() => {
                self.sync_detail();
                Change::Selection
            }
            Ok(()) = self.search_rx.changed() => {
                self.search_rx.borrow_and_update();
                Change::Search
            }
            Ok(()) = self.detail_rx.changed() => {
                self.detail_rx.borrow_and_update();
                Change::Detail
            }
            Ok(()) = self.title_rx.changed() => {
                self.title_rx.borrow_and_update();
                Change::Title
            }
            else => Change::Closed,
        }
    }

    /// Runs both fetchers to completion, following any selection change a
    /// search result causes
    pub async fn settle(&mut self) {
        loop {
            let searched = self.search.settle().await.is_some();
            self.sync_detail();
            let detailed = self.detail.settle().await.is_some();
            if !searched && !detailed {
                break;
            }
        }
    }

    /// Cancels everything in flight
    pub fn shutdown(&mut self) {
        self.search.release();
        self.detail.release();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_query_focused(&self) -> bool {
        self.query_focused
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    pub fn detail_state(&self) -> DetailState {
        self.detail.state()
    }

    pub fn selected(&self) -> Option<MovieId> {
        self.selection.current()
    }

    pub fn title(&self) -> String {
        self.title.current()
    }

    pub fn rating(&self) -> Option<u8> {
        self.rating
    }

    pub fn watched(&self) -> &WatchedList {
        &self.watched
    }
}
