use crate::store::{PersistentStore, StoragePort, StoreError};
use movie_search_models::WatchedEntry;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_WATCHED_KEY: &str = "watched";

#[derive(Debug, Error)]
pub enum WatchedError {
    #[error("{0} is already in the watched list")]
    AlreadyWatched(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Aggregates shown above the watched list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchedSummary {
    pub count: usize,
    /// Mean over entries that carry a provider rating
    pub avg_external_rating: Option<f64>,
    pub avg_user_rating: Option<f64>,
    pub avg_runtime_minutes: Option<f64>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// The user's durable list of rated titles, in insertion order
pub struct WatchedList {
    store: PersistentStore<Vec<WatchedEntry>>,
}

impl WatchedList {
    pub fn load(storage: Arc<dyn StoragePort>, key: &str) -> Self {
        let store = PersistentStore::load(storage, key, Vec::new());
        info!(key = %key, entries = store.get().len(), "Watched list ready");
        Self { store }
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        self.store.get()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries().iter().find(|entry| entry.id == id)
    }

    pub fn is_watched(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn user_rating_for(&self, id: &str) -> Option<u8> {
        self.find(id).map(|entry| entry.user_rating)
    }

    /// Appends `entry`; an id can only be in the list once
    pub fn add(&mut self, entry: WatchedEntry) -> Result<(), WatchedError> {
        if self.is_watched(&entry.id) {
            return Err(WatchedError::AlreadyWatched(entry.id));
        }
        let id = entry.id.clone();
        self.store.mutate(move |entries| {
            let mut next = entries.clone();
            next.push(entry);
            next
        })?;
        info!(id = %id, total = self.len(), "Added to watched list");
        Ok(())
    }

    /// Removes `id`. Returns whether it was present; an absent id writes nothing.
    pub fn remove(&mut self, id: &str) -> Result<bool, WatchedError> {
        if !self.is_watched(id) {
            return Ok(false);
        }
        self.store.mutate(|entries| {
            entries
                .iter()
                .filter(|entry| entry.id != id)
                .cloned()
                .collect()
        })?;
        info!(id = %id, total = self.len(), "Removed from watched list");
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), WatchedError> {
        self.store.reset(Vec::new())?;
        Ok(())
    }

    pub fn summary(&self) -> WatchedSummary {
        let entries = self.entries();
        WatchedSummary {
            count: entries.len(),
            avg_external_rating: mean(entries.iter().filter_map(|e| e.external_rating)),
            avg_user_rating: mean(entries.iter().map(|e| f64::from(e.user_rating))),
            avg_runtime_minutes: mean(entries.iter().map(|e| f64::from(e.runtime_minutes))),
        }
    }
}
