use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Why a run was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The tracked value changed
    Superseded,
    /// The observing context was torn down
    Abandoned,
}

/// How a spawned run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The result became the visible state
    Committed,
    Cancelled(CancelReason),
    /// Finished, but a newer generation owned the state by then
    Stale,
}

#[derive(Clone)]
pub struct RunContext {
    generation: u64,
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl RunContext {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            token: CancellationToken::new(),
            reason: Arc::new(OnceLock::new()),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.reason.get().copied()
    }

    /// Resolves once the run is cancelled
    pub async fn cancelled(&self) -> CancelReason {
        self.token.cancelled().await;
        self.cancel_reason().unwrap_or(CancelReason::Abandoned)
    }

    fn cancel(&self, reason: CancelReason) {
        // first reason wins
        let _ = self.reason.set(reason);
        self.token.cancel();
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("generation", &self.generation)
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.cancel_reason())
            .finish()
    }
}

struct ActiveRun {
    ctx: RunContext,
    handle: Option<JoinHandle<RunOutcome>>,
}

/// Tracks one value and re-runs on change. The previous run is cancelled
/// before the next one starts, and every run receives a [`RunContext`]
/// carrying its generation and cancellation token.
pub struct EffectScope<K> {
    tracked: Option<K>,
    generation: u64,
    active: Option<ActiveRun>,
}

impl<K> EffectScope<K> {
    pub fn new() -> Self {
        Self {
            tracked: None,
            generation: 0,
            active: None,
        }
    }

    pub fn tracked(&self) -> Option<&K> {
        self.tracked.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancels the current run and forgets the tracked value.
    ///
    /// Returns the generation that now owns the state, or `None` when nothing
    /// was being tracked.
    pub fn release(&mut self) -> Option<u64> {
        if self.tracked.is_none() && self.active.is_none() {
            return None;
        }
        self.cleanup(CancelReason::Abandoned);
        self.tracked = None;
        self.generation += 1;
        Some(self.generation)
    }

    /// Waits for the current run's task, if one was spawned and not yet awaited
    pub async fn settle(&mut self) -> Option<RunOutcome> {
        let handle = self.active.as_mut().and_then(|run| run.handle.take())?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Effect run failed to join");
                None
            }
        }
    }

    fn cleanup(&mut self, reason: CancelReason) {
        if let Some(run) = self.active.take() {
            if !run.ctx.is_cancelled() {
                debug!(generation = run.ctx.generation, ?reason, "Cancelling previous run");
                run.ctx.cancel(reason);
            }
        }
    }
}

impl<K: PartialEq> EffectScope<K> {
    /// Starts a new run when `next` differs from the tracked value.
    ///
    /// The previous run is cancelled as [`CancelReason::Superseded`] before
    /// `start` is called with the previous value, the new value and the new
    /// run's context. `start` returns the spawned task, if any.
    pub fn on_change<F>(&mut self, next: K, start: F) -> bool
    where
        F: FnOnce(Option<&K>, &K, RunContext) -> Option<JoinHandle<RunOutcome>>,
    {
        if self.tracked.as_ref() == Some(&next) {
            return false;
        }
        self.cleanup(CancelReason::Superseded);
        self.generation += 1;

        let ctx = RunContext::new(self.generation);
        let handle = start(self.tracked.as_ref(), &next, ctx.clone());
        self.tracked = Some(next);
        self.active = Some(ActiveRun { ctx, handle });
        true
    }
}

impl<K> Default for EffectScope<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for EffectScope<K> {
    fn drop(&mut self) {
        self.cleanup(CancelReason::Abandoned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_value_does_not_rerun() {
        let mut scope = EffectScope::new();
        let mut runs = 0;
        assert!(scope.on_change("a".to_string(), |_, _, _| {
            runs += 1;
            None
        }));
        assert!(!scope.on_change("a".to_string(), |_, _, _| {
            runs += 1;
            None
        }));
        assert_eq!(runs, 1);
        assert_eq!(scope.generation(), 1);
    }

    #[test]
    fn test_change_cancels_previous_as_superseded() {
        let mut scope = EffectScope::new();
        let mut first = None;
        scope.on_change(1, |prev, next, ctx| {
            assert_eq!(prev, None);
            assert_eq!(*next, 1);
            first = Some(ctx);
            None
        });
        scope.on_change(2, |prev, _, ctx| {
            assert_eq!(prev, Some(&1));
            assert!(!ctx.is_cancelled());
            assert_eq!(ctx.generation(), 2);
            None
        });

        let first = first.unwrap();
        assert!(first.is_cancelled());
        assert_eq!(first.cancel_reason(), Some(CancelReason::Superseded));
    }

    #[test]
    fn test_release_cancels_as_abandoned() {
        let mut scope = EffectScope::new();
        let mut captured = None;
        scope.on_change("x", |_, _, ctx| {
            captured = Some(ctx);
            None
        });
        assert_eq!(scope.release(), Some(2));
        assert_eq!(scope.tracked(), None);

        let ctx = captured.unwrap();
        assert_eq!(ctx.cancel_reason(), Some(CancelReason::Abandoned));
        // nothing left to release
        assert_eq!(scope.release(), None);
    }

    #[test]
    fn test_release_then_same_value_runs_again() {
        let mut scope = EffectScope::new();
        scope.on_change("x", |_, _, _| None);
        scope.release();
        assert!(scope.on_change("x", |_, _, _| None));
    }

    #[test]
    fn test_drop_abandons_active_run() {
        let mut captured = None;
        {
            let mut scope = EffectScope::new();
            scope.on_change(7u8, |_, _, ctx| {
                captured = Some(ctx);
                None
            });
        }
        assert_eq!(captured.unwrap().cancel_reason(), Some(CancelReason::Abandoned));
    }

    #[tokio::test]
    async fn test_settle_returns_task_outcome() {
        let mut scope = EffectScope::new();
        scope.on_change(1u32, |_, _, _| Some(tokio::spawn(async { RunOutcome::Committed })));
        assert_eq!(scope.settle().await, Some(RunOutcome::Committed));
        assert_eq!(scope.settle().await, None);
    }

    #[tokio::test]
    async fn test_cancelled_resolves_with_reason() {
        let mut scope = EffectScope::new();
        let mut pending = None;
        scope.on_change(1u32, |_, _, ctx| {
            pending = Some(tokio::spawn(async move { ctx.cancelled().await }));
            None
        });
        scope.on_change(2u32, |_, _, _| None);
        assert_eq!(pending.unwrap().await.unwrap(), CancelReason::Superseded);
    }
}
