use crate::effect::RunContext;
use movie_search_models::FetchState;
use std::any::Any;
use tokio::sync::watch;

/// Resource held for as long as a `Ready` state is visible; dropped on the next transition
pub type Lease = Box<dyn Any + Send + Sync>;

/// What subscribers of a fetcher observe
pub struct FetchSlot<T> {
    generation: u64,
    state: FetchState<T>,
    lease: Option<Lease>,
}

impl<T> FetchSlot<T> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }
}

/// Published state of one fetcher.
///
/// A result commits only if the run that produced it still owns the current
/// generation and has not been cancelled; the check and the write happen under
/// the channel's lock, so a newer transition can never be overwritten.
pub struct FetchCell<T> {
    tx: watch::Sender<FetchSlot<T>>,
}

impl<T> FetchCell<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(FetchSlot {
            generation: 0,
            state: FetchState::Idle,
            lease: None,
        });
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchSlot<T>> {
        self.tx.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Hands the state to `generation`, releasing any lease of the previous state
    pub fn begin(&self, generation: u64, state: FetchState<T>) {
        let mut released = None;
        self.tx.send_modify(|slot| {
            slot.generation = generation;
            slot.state = state;
            released = slot.lease.take();
        });
        drop(released);
    }

    /// Commits `state` for `ctx`; `on_commit` runs only when the commit goes through.
    ///
    /// Returns whether the state was written.
    pub fn commit<F>(&self, ctx: &RunContext, state: FetchState<T>, on_commit: F) -> bool
    where
        F: FnOnce() -> Option<Lease>,
    {
        self.tx.send_if_modified(|slot| {
            if slot.generation != ctx.generation() || ctx.is_cancelled() {
                return false;
            }
            slot.state = state;
            slot.lease = on_commit();
            true
        })
    }
}

impl<T: Clone> FetchCell<T> {
    pub fn state(&self) -> FetchState<T> {
        self.tx.borrow().state.clone()
    }
}

impl<T> Default for FetchCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectScope;
    use movie_search_models::FetchError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn contexts() -> (EffectScope<u8>, RunContext, RunContext) {
        let mut scope = EffectScope::new();
        let mut first = None;
        let mut second = None;
        scope.on_change(1, |_, _, ctx| {
            first = Some(ctx);
            None
        });
        scope.on_change(2, |_, _, ctx| {
            second = Some(ctx);
            None
        });
        (scope, first.unwrap(), second.unwrap())
    }

    #[test]
    fn test_stale_generation_cannot_commit() {
        let (_scope, old, current) = contexts();
        let cell: FetchCell<u32> = FetchCell::new();
        cell.begin(current.generation(), FetchState::Loading);

        assert!(!cell.commit(&old, FetchState::Ready(1), || None));
        assert_eq!(cell.state(), FetchState::Loading);

        assert!(cell.commit(&current, FetchState::Ready(2), || None));
        assert_eq!(cell.state(), FetchState::Ready(2));
    }

    #[test]
    fn test_cancelled_run_cannot_commit_errors() {
        let (mut scope, _old, current) = contexts();
        let cell: FetchCell<u32> = FetchCell::new();
        cell.begin(current.generation(), FetchState::Loading);
        scope.release();

        let failed = FetchState::Failed(FetchError::Transport("late".to_string()));
        assert!(!cell.commit(&current, failed, || None));
        assert_eq!(cell.state(), FetchState::Loading);
    }

    #[test]
    fn test_on_commit_skipped_when_stale() {
        let (_scope, old, current) = contexts();
        let cell: FetchCell<u32> = FetchCell::new();
        cell.begin(current.generation(), FetchState::Loading);

        let mut called = false;
        cell.commit(&old, FetchState::Ready(1), || {
            called = true;
            None
        });
        assert!(!called);
    }

    struct Flag(Arc<AtomicBool>);

    impl Drop for Flag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_lease_dropped_on_next_begin() {
        let (_scope, _old, current) = contexts();
        let cell: FetchCell<u32> = FetchCell::new();
        cell.begin(current.generation(), FetchState::Loading);

        let dropped = Arc::new(AtomicBool::new(false));
        let flag = Flag(dropped.clone());
        assert!(cell.commit(&current, FetchState::Ready(3), move || Some(Box::new(flag) as Lease)));
        assert!(!dropped.load(Ordering::SeqCst));

        cell.begin(current.generation() + 1, FetchState::Idle);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_subscribers_see_transitions() {
        let cell: FetchCell<u32> = FetchCell::new();
        let mut rx = cell.subscribe();
        cell.begin(1, FetchState::Loading);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update().state(), FetchState::Loading);
        assert_eq!(rx.borrow().generation(), 1);
    }
}
