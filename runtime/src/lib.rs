//! # FoodWagen Runtime
//!
//! The [`Store`] that owns feature state, runs the reducer, and executes the
//! effects it returns.
//!
//! ## Flow
//!
//! 1. `send(action)` takes the state write lock and calls the reducer.
//! 2. Effects returned by the reducer are spawned on the tokio runtime.
//! 3. When an effect resolves to an action, that action is sent back through
//!    the reducer and then broadcast to observers.
//!
//! ## Example
//!
//! ```ignore
//! use foodwagen_runtime::Store;
//!
//! let store = Store::new(FoodState::default(), FoodReducer::new(), env);
//!
//! // Dispatch and wait for the network round trip to land in state
//! store.send(FoodAction::FetchFoods { filter: None }).await.wait().await;
//!
//! let count = store.state(|s| s.foods.len()).await;
//! ```

use foodwagen_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur while waiting on the store
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// No matching action was observed before the timeout elapsed
        #[error("Timeout waiting for action")]
        Timeout,

        /// The action broadcast channel was closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking completion of the effects spawned by one `send`
///
/// Waiting on the handle returns once every effect has finished and any
/// action it produced has been reduced into state.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(FoodAction::FetchFoods { filter: None }).await;
/// handle.wait().await;
/// // The list (or the error) is now in state
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    pending: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracker) {
        let pending = Arc::new(AtomicUsize::new(0));
        let (notifier, completion) = watch::channel(());

        let handle = Self {
            pending: Arc::clone(&pending),
            completion,
        };
        let tracker = EffectTracker {
            pending,
            notifier: Arc::new(notifier),
        };

        (handle, tracker)
    }

    /// Create a handle that is already complete
    #[must_use]
    pub fn completed() -> Self {
        Self::new().0
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.pending.load(Ordering::SeqCst) > 0 {
            // Every tracker is gone, nothing is left to decrement the counter
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running when the
    /// timeout expires.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Internal: counter shared between a handle and the effects it tracks
#[derive(Clone)]
struct EffectTracker {
    pending: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracker {
    /// Register a started effect and return the guard that completes it
    fn start(&self) -> CompletionGuard {
        self.pending.fetch_add(1, Ordering::SeqCst);
        CompletionGuard(self.clone())
    }
}

/// Internal: decrements the pending counter on drop, even if the effect panics
struct CompletionGuard(EffectTracker);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if self.0.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.0.notifier.send(());
        }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{Arc, Effect, EffectHandle, EffectTracker, Reducer, RwLock, StoreError};
    use std::time::Duration;
    use tokio::sync::broadcast;

    /// Capacity of the action broadcast channel
    const BROADCAST_CAPACITY: usize = 64;

    /// The Store - runtime coordinator for a reducer
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    ///
    /// Cloning a store is cheap and every clone shares the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        /// Actions produced by effects, published after they are reduced.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Clone + Send + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (action_broadcast, _) = broadcast::channel(BROADCAST_CAPACITY);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// The reducer runs before this returns; effects keep running in the
        /// background. Use the returned [`EffectHandle`] to wait for them.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> EffectHandle {
            metrics::counter!("store.actions.total").increment(1);

            let (handle, tracker) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, &tracker);
            }

            handle
        }

        /// Send an action and wait for a matching action produced by its effects
        ///
        /// Subscribes before sending, so the matching action cannot be missed.
        /// The returned action has already been reduced into state.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action before `timeout`
        /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to actions produced by effects
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let loading = store.state(|s| s.loading).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Execute an effect, registering it with `tracker`
        fn execute_effect(&self, effect: Effect<A>, tracker: &EffectTracker) {
            match effect {
                Effect::None => {},
                Effect::Parallel(effects) => {
                    for effect in effects {
                        self.execute_effect(effect, tracker);
                    }
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);

                    let guard = tracker.start();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;

                        if let Some(action) = fut.await {
                            // Reduce first so observers see the updated state
                            store.send(action.clone()).await;
                            let _ = store.action_broadcast.send(action);
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use foodwagen_core::{Effects, smallvec};

    #[derive(Debug, Clone, Default)]
    struct ListState {
        items: Vec<u32>,
        loading: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ListAction {
        Load { delay_ms: u64 },
        Loaded(Vec<u32>),
        Push(u32),
    }

    #[derive(Clone)]
    struct ListReducer;

    impl Reducer for ListReducer {
        type State = ListState;
        type Action = ListAction;
        type Environment = ();

        fn reduce(&self, state: &mut ListState, action: ListAction, _env: &()) -> Effects<ListAction> {
            match action {
                ListAction::Load { delay_ms } => {
                    state.loading = true;
                    smallvec![Effect::future(async move {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        Some(ListAction::Loaded(vec![1, 2, 3]))
                    })]
                },
                ListAction::Loaded(items) => {
                    state.loading = false;
                    state.items = items;
                    smallvec![Effect::None]
                },
                ListAction::Push(item) => {
                    state.items.push(item);
                    smallvec![]
                },
            }
        }
    }

    #[tokio::test]
    async fn send_applies_reducer_before_returning() {
        let store = Store::new(ListState::default(), ListReducer, ());

        let handle = store.send(ListAction::Push(9)).await;

        assert_eq!(handle.pending(), 0);
        assert_eq!(store.state(|s| s.items.clone()).await, vec![9]);
    }

    #[tokio::test]
    async fn wait_covers_feedback_action() {
        let store = Store::new(ListState::default(), ListReducer, ());

        let mut handle = store.send(ListAction::Load { delay_ms: 20 }).await;
        assert!(store.state(|s| s.loading).await);

        handle.wait().await;

        let (loading, items) = store.state(|s| (s.loading, s.items.clone())).await;
        assert!(!loading);
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn completed_handle_does_not_block() {
        let mut handle = EffectHandle::completed();
        handle.wait_with_timeout(Duration::from_millis(50)).await.unwrap();
    }

    #[tokio::test]
    async fn send_and_wait_for_sees_reduced_state() {
        let store = Store::new(ListState::default(), ListReducer, ());

        let action = store
            .send_and_wait_for(
                ListAction::Load { delay_ms: 5 },
                |a| matches!(a, ListAction::Loaded(_)),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(action, ListAction::Loaded(vec![1, 2, 3]));
        assert_eq!(store.state(|s| s.items.len()).await, 3);
    }

    #[tokio::test]
    async fn send_and_wait_for_times_out() {
        let store = Store::new(ListState::default(), ListReducer, ());

        let result = store
            .send_and_wait_for(
                ListAction::Push(1),
                |a| matches!(a, ListAction::Loaded(_)),
                Duration::from_millis(20),
            )
            .await;

        assert_eq!(result, Err(StoreError::Timeout));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = Store::new(ListState::default(), ListReducer, ());
        let other = store.clone();

        other.send(ListAction::Push(4)).await;

        assert_eq!(store.state(|s| s.items.clone()).await, vec![4]);
    }

    #[tokio::test]
    async fn subscribers_see_feedback_actions_only() {
        let store = Store::new(ListState::default(), ListReducer, ());
        let mut actions = store.subscribe_actions();

        store.send(ListAction::Push(7)).await;
        store
            .send(ListAction::Load { delay_ms: 5 })
            .await
            .wait()
            .await;

        assert_eq!(actions.recv().await.unwrap(), ListAction::Loaded(vec![1, 2, 3]));
        assert!(actions.try_recv().is_err());
    }
}
