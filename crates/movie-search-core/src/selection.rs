use movie_search_models::MovieId;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Which search result, if any, has its detail pane open
#[derive(Clone)]
pub struct Selection {
    tx: Arc<watch::Sender<Option<MovieId>>>,
}

impl Selection {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Option<MovieId> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<MovieId>> {
        self.tx.subscribe()
    }

    pub fn select(&self, id: MovieId) {
        self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&id) {
                return false;
            }
            *current = Some(id);
            true
        });
    }

    /// Selects `id`, or closes the pane when `id` is already selected.
    /// Returns the new selection.
    pub fn toggle(&self, id: MovieId) -> Option<MovieId> {
        self.tx.send_modify(|current| {
            *current = if current.as_ref() == Some(&id) { None } else { Some(id) };
        });
        self.current()
    }

    /// Runs `f` only while `id` is selected, holding the selection steady
    /// for the duration of the call
    pub fn while_selected<R>(&self, id: &str, f: impl FnOnce() -> R) -> Option<R> {
        let current = self.tx.borrow();
        if current.as_deref() != Some(id) {
            return None;
        }
        let result = f();
        drop(current);
        Some(result)
    }

    /// Resolves once `id` is no longer the selection
    pub async fn moved_from(&self, id: &str) {
        let mut rx = self.tx.subscribe();
        // the sender lives in `self`, so this only ends when the selection moves
        let _ = rx.wait_for(|current| current.as_deref() != Some(id)).await;
    }

    /// Closes the detail pane. Returns whether something was selected.
    pub fn clear(&self) -> bool {
        let cleared = self.tx.send_if_modified(|current| current.take().is_some());
        if cleared {
            debug!("Selection cleared");
        }
        cleared
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}
