use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

/// Current value of the ambient title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSignal {
    owner: u64,
    text: String,
}

impl TitleSignal {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether some lease currently holds the title
    pub fn is_leased(&self) -> bool {
        self.owner != 0
    }
}

struct TitleInner {
    tx: watch::Sender<TitleSignal>,
    default: String,
    next_owner: AtomicU64,
}

/// Ambient "current title" (a window or tab title).
///
/// The title is only changed through a [`TitleLease`]; dropping the lease puts
/// the default back unless a newer lease has taken over in the meantime.
#[derive(Clone)]
pub struct DocumentTitle {
    inner: Arc<TitleInner>,
}

impl DocumentTitle {
    pub fn new(default: impl Into<String>) -> Self {
        let default = default.into();
        let (tx, _rx) = watch::channel(TitleSignal {
            owner: 0,
            text: default.clone(),
        });
        Self {
            inner: Arc::new(TitleInner {
                tx,
                default,
                next_owner: AtomicU64::new(1),
            }),
        }
    }

    pub fn current(&self) -> String {
        self.inner.tx.borrow().text.clone()
    }

    pub fn default_title(&self) -> &str {
        &self.inner.default
    }

    pub fn subscribe(&self) -> watch::Receiver<TitleSignal> {
        self.inner.tx.subscribe()
    }

    /// Shows `Movie | <movie_title>` until the returned lease is dropped
    pub fn acquire(&self, movie_title: &str) -> TitleLease {
        let owner = self.inner.next_owner.fetch_add(1, Ordering::Relaxed);
        let text = format!("Movie | {}", movie_title);
        trace!(owner, title = %text, "Title acquired");
        self.inner.tx.send_modify(|signal| {
            signal.owner = owner;
            signal.text = text;
        });
        TitleLease {
            inner: self.inner.clone(),
            owner,
        }
    }
}

#[must_use = "the title reverts as soon as the lease is dropped"]
pub struct TitleLease {
    inner: Arc<TitleInner>,
    owner: u64,
}

impl Drop for TitleLease {
    fn drop(&mut self) {
        let owner = self.owner;
        let default = &self.inner.default;
        let restored = self.inner.tx.send_if_modified(|signal| {
            if signal.owner != owner {
                return false;
            }
            signal.owner = 0;
            signal.text = default.clone();
            true
        });
        if restored {
            trace!(owner, "Title restored to default");
        }
    }
}
