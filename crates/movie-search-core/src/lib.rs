pub mod detail;
pub mod effect;
pub mod fetch_cell;
pub mod keys;
pub mod query;
pub mod selection;
pub mod session;
pub mod store;
pub mod title;
pub mod watched;

#[cfg(test)]
mod testing;

pub use detail::{parse_external_rating, parse_runtime_minutes, to_watched_entry, DetailFetcher, DetailState, EntryError};
pub use effect::{CancelReason, EffectScope, RunContext, RunOutcome};
pub use fetch_cell::{FetchCell, FetchSlot, Lease};
pub use keys::{KeyBindings, ShortcutAction};
pub use query::{QueryFetcher, SearchState, MIN_QUERY_CHARS};
pub use selection::Selection;
pub use session::{Change, Session, SessionError, SessionOptions, UiEvent};
pub use store::{FileStorage, MemoryStorage, PersistentStore, StorageError, StoragePort, StoreError};
pub use title::{DocumentTitle, TitleLease, TitleSignal};
pub use watched::{WatchedError, WatchedList, WatchedSummary, DEFAULT_WATCHED_KEY};
