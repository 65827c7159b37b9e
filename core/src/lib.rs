//! # FoodWagen Core
//!
//! The two abstractions every FoodWagen feature is built from.
//!
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`. All state
//!   transitions of a feature live in one `reduce` function.
//! - **Effect**: a description of asynchronous work (typically one call to the
//!   remote data client) whose result is fed back into the reducer as another
//!   action.
//!
//! Reducers never perform I/O themselves. They mutate state synchronously and
//! hand effects to the runtime (`foodwagen-runtime`), which executes them and
//! dispatches the resulting actions.
//!
//! ## Example
//!
//! ```
//! use foodwagen_core::{effect::Effect, reducer::Reducer, smallvec, Effects};
//!
//! #[derive(Default)]
//! struct CountState {
//!     loading: bool,
//!     total: usize,
//! }
//!
//! enum CountAction {
//!     Refresh,
//!     Counted(usize),
//! }
//!
//! struct CountReducer;
//!
//! impl Reducer for CountReducer {
//!     type State = CountState;
//!     type Action = CountAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CountState,
//!         action: CountAction,
//!         _env: &(),
//!     ) -> Effects<CountAction> {
//!         match action {
//!             CountAction::Refresh => {
//!                 state.loading = true;
//!                 smallvec![Effect::future(async { Some(CountAction::Counted(3)) })]
//!             }
//!             CountAction::Counted(total) => {
//!                 state.loading = false;
//!                 state.total = total;
//!                 smallvec![Effect::None]
//!             }
//!         }
//!     }
//! }
//!
//! let mut state = CountState::default();
//! let effects = CountReducer.reduce(&mut state, CountAction::Refresh, &());
//! assert!(state.loading);
//! assert_eq!(effects.len(), 1);
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Effects returned by a single `reduce` call.
///
/// Most actions produce zero or one effect, so four inline slots avoid a heap
/// allocation on every dispatch.
pub type Effects<A> = SmallVec<[effect::Effect<A>; 4]>;

/// Reducer module - the trait holding all state transition logic
pub mod reducer {
    use super::Effects;

    /// The Reducer trait - core abstraction for feature logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer owns
    /// - `Action`: Commands issued by the view layer and events fed back by effects
    /// - `Environment`: Injected dependencies (remote clients, configuration)
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Must not block or perform I/O. Anything asynchronous is returned as
        /// an [`Effect`](crate::effect::Effect) for the runtime to execute.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Effects<Self::Action>;
    }
}

/// Effect module - descriptions of asynchronous work
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Boxed future produced by [`Effect::Future`].
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes work to run after a reducer returns
    ///
    /// Effects are values. Nothing happens until the runtime executes them.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// If the future resolves to `Some(action)`, that action is fed back
        /// into the reducer.
        Future(EffectFuture<Action>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async block as an [`Effect::Future`]
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Combine effects to run concurrently
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Returns `true` for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}
