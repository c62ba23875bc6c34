//! Per-value debouncer.
//!
//! A `Debouncer<T>` accepts a stream of values through [`Debouncer::push`]
//! and hands the most recent one to its settle callback once no new value
//! has arrived for the configured window. Every push restarts the window.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

type SettleFn<T> = Arc<dyn Fn(T) + Send + Sync>;

struct DebounceState<T> {
    /// Latest pushed value that has not settled yet.
    pending: Option<T>,
    /// Last value handed to the settle callback.
    stable: Option<T>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every push/cancel so a timer that lost the race to an
    /// abort never emits.
    generation: u64,
}

impl<T: Clone> DebounceState<T> {
    fn take_pending(&mut self) -> Option<T> {
        let value = self.pending.take()?;
        self.stable = Some(value.clone());
        Some(value)
    }
}

/// Debounces one value stream.
///
/// Timers run as tokio tasks, so `push` must be called from within a
/// runtime. Dropping the debouncer cancels any outstanding timer.
///
/// The settle callback runs with the state lock held: once `settle_now`
/// returns, any emission from an expiring timer has already happened. The
/// callback must not call back into the same debouncer.
pub struct Debouncer<T: Clone + Send + 'static> {
    window: Duration,
    state: Arc<Mutex<DebounceState<T>>>,
    on_settle: SettleFn<T>,
}

impl<T: Clone + Send + 'static> Debouncer<T> {
    /// Create a debouncer that calls `on_settle` after `window` of quiet.
    pub fn new(window: Duration, on_settle: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            window,
            state: Arc::new(Mutex::new(DebounceState {
                pending: None,
                stable: None,
                timer: None,
                generation: 0,
            })),
            on_settle: Arc::new(on_settle),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a new value and restart the quiet window.
    pub fn push(&self, value: T) {
        let mut state = lock(&self.state);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation = state.generation.wrapping_add(1);
        state.pending = Some(value);

        let generation = state.generation;
        let window = self.window;
        let shared = Arc::clone(&self.state);
        let on_settle = Arc::clone(&self.on_settle);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut state = lock(&shared);
            if state.generation != generation {
                return;
            }
            state.timer = None;
            if let Some(value) = state.take_pending() {
                on_settle(value);
            }
        }));
    }

    /// Emit the pending value immediately instead of waiting for the window.
    ///
    /// Returns `false` when nothing was pending.
    pub fn settle_now(&self) -> bool {
        let mut state = lock(&self.state);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation = state.generation.wrapping_add(1);
        match state.take_pending() {
            Some(value) => {
                (self.on_settle)(value);
                true
            }
            None => false,
        }
    }

    /// Drop the pending value and its timer without emitting.
    pub fn cancel(&self) {
        let mut state = lock(&self.state);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation = state.generation.wrapping_add(1);
        state.pending = None;
    }

    /// Whether a value is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }

    /// The last settled value, if any.
    pub fn stable(&self) -> Option<T> {
        lock(&self.state).stable.clone()
    }
}

impl<T: Clone + Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The state holds no invariants a panicking settle callback could break,
/// so a poisoned lock is recovered.
fn lock<T>(state: &Mutex<DebounceState<T>>) -> MutexGuard<'_, DebounceState<T>> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
