//! The application store: the food list, its loading flag and its error.
//!
//! Commands come from the view layer. Each one issues exactly one call on the
//! [`FoodApi`] and feeds the outcome back as an event. Events are the only
//! actions that change `foods`.
//!
//! Fetch failures are written to [`FoodState::error`]. Create, update and
//! delete failures leave state untouched; the dispatching caller observes the
//! failure event through
//! [`Store::send_and_wait_for`](foodwagen_runtime::Store::send_and_wait_for).

use crate::client::FoodApi;
use crate::error::ApiError;
use crate::types::{FoodId, FoodItem, FoodPayload};
use foodwagen_core::{Effects, effect::Effect, reducer::Reducer, smallvec};
use foodwagen_runtime::Store;
use std::marker::PhantomData;

/// Message stored when a fetch fails without one
pub const FETCH_FAILED_FALLBACK: &str = "Failed to load foods";

/// State owned by the store
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FoodState {
    /// Items in server order
    pub foods: Vec<FoodItem>,
    /// A fetch is in flight
    pub loading: bool,
    /// Message of the last failed fetch, cleared when a fetch starts
    pub error: Option<String>,
    /// Generation of the latest dispatched fetch
    pub fetch_generation: u64,
}

impl FoodState {
    /// Look up an item by id
    #[must_use]
    pub fn get(&self, id: &FoodId) -> Option<&FoodItem> {
        self.foods.iter().find(|food| &food.id == id)
    }
}

/// Actions handled by [`FoodReducer`]
#[derive(Clone, Debug, PartialEq)]
pub enum FoodAction {
    // Commands
    /// Load the collection, optionally filtered by name
    FetchFoods {
        /// Name filter; `None` or empty fetches everything
        filter: Option<String>,
    },
    /// Create an item
    CreateFood {
        /// Fields to send
        payload: FoodPayload,
    },
    /// Update an item
    UpdateFood {
        /// Target id
        id: FoodId,
        /// Fields to send
        payload: FoodPayload,
    },
    /// Delete an item
    DeleteFood {
        /// Target id
        id: FoodId,
    },

    // Events
    /// A fetch succeeded
    FoodsLoaded {
        /// Generation of the fetch that produced this result
        generation: u64,
        /// Items in server order
        foods: Vec<FoodItem>,
    },
    /// A fetch failed
    FetchFailed {
        /// Generation of the fetch that produced this result
        generation: u64,
        /// Cause
        error: ApiError,
    },
    /// The server created an item
    FoodCreated {
        /// Server representation, with its id
        food: FoodItem,
    },
    /// Creating an item failed
    CreateFailed {
        /// Cause
        error: ApiError,
    },
    /// The server updated an item
    FoodUpdated {
        /// Server representation
        food: FoodItem,
    },
    /// Updating an item failed
    UpdateFailed {
        /// Target id
        id: FoodId,
        /// Cause
        error: ApiError,
    },
    /// The server deleted an item
    FoodDeleted {
        /// Deleted id
        id: FoodId,
    },
    /// Deleting an item failed
    DeleteFailed {
        /// Target id
        id: FoodId,
        /// Cause
        error: ApiError,
    },
}

/// Dependencies of [`FoodReducer`]
#[derive(Clone, Debug)]
pub struct FoodEnvironment<C> {
    /// Remote data client
    pub api: C,
}

impl<C> FoodEnvironment<C> {
    /// Creates a new `FoodEnvironment`
    #[must_use]
    pub const fn new(api: C) -> Self {
        Self { api }
    }
}

/// Reducer for the food store
pub struct FoodReducer<C> {
    _client: PhantomData<fn() -> C>,
}

impl<C> FoodReducer<C> {
    /// Creates a new `FoodReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _client: PhantomData,
        }
    }

    /// The message stored for a failed fetch
    fn fetch_error_message(error: &ApiError) -> String {
        let message = error.to_string();
        if message.trim().is_empty() {
            FETCH_FAILED_FALLBACK.to_string()
        } else {
            message
        }
    }

    /// Applies an event to state
    fn apply_event(state: &mut FoodState, action: FoodAction) {
        match action {
            FoodAction::FoodsLoaded { generation, foods } => {
                if generation != state.fetch_generation {
                    tracing::debug!(
                        generation,
                        latest = state.fetch_generation,
                        "Discarding stale fetch result"
                    );
                    return;
                }
                tracing::info!(count = foods.len(), "Food list replaced");
                state.loading = false;
                state.foods = foods;
            },
            FoodAction::FetchFailed { generation, error } => {
                if generation != state.fetch_generation {
                    tracing::debug!(
                        generation,
                        latest = state.fetch_generation,
                        "Discarding stale fetch failure"
                    );
                    return;
                }
                tracing::warn!(kind = ?error.kind(), %error, "Fetching foods failed");
                state.loading = false;
                state.error = Some(Self::fetch_error_message(&error));
            },
            FoodAction::FoodCreated { food } => {
                tracing::info!(id = %food.id, "Food created");
                state.foods.push(food);
            },
            FoodAction::FoodUpdated { food } => {
                match state.foods.iter_mut().find(|existing| existing.id == food.id) {
                    Some(existing) => {
                        tracing::info!(id = %food.id, "Food updated");
                        *existing = food;
                    },
                    None => tracing::debug!(id = %food.id, "Updated food not in list"),
                }
            },
            FoodAction::FoodDeleted { id } => {
                let before = state.foods.len();
                state.foods.retain(|food| food.id != id);
                if state.foods.len() == before {
                    tracing::debug!(%id, "Deleted food not in list");
                } else {
                    tracing::info!(%id, "Food deleted");
                }
            },
            FoodAction::CreateFailed { error } => {
                tracing::warn!(kind = ?error.kind(), %error, "Creating food failed");
            },
            FoodAction::UpdateFailed { id, error } => {
                tracing::warn!(%id, kind = ?error.kind(), %error, "Updating food failed");
            },
            FoodAction::DeleteFailed { id, error } => {
                tracing::warn!(%id, kind = ?error.kind(), %error, "Deleting food failed");
            },
            // Commands are not applied to state
            FoodAction::FetchFoods { .. }
            | FoodAction::CreateFood { .. }
            | FoodAction::UpdateFood { .. }
            | FoodAction::DeleteFood { .. } => {},
        }
    }
}

impl<C> Clone for FoodReducer<C> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<C> Default for FoodReducer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for FoodReducer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FoodReducer")
    }
}

impl<C> Reducer for FoodReducer<C>
where
    C: FoodApi + Clone + 'static,
{
    type State = FoodState;
    type Action = FoodAction;
    type Environment = FoodEnvironment<C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            // ========== Commands ==========
            FoodAction::FetchFoods { filter } => {
                state.loading = true;
                state.error = None;
                state.fetch_generation += 1;

                let generation = state.fetch_generation;
                let filter = filter.filter(|term| !term.is_empty());
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    Some(match api.list(filter.as_deref()).await {
                        Ok(foods) => FoodAction::FoodsLoaded { generation, foods },
                        Err(error) => FoodAction::FetchFailed { generation, error },
                    })
                })]
            },

            FoodAction::CreateFood { payload } => {
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    Some(match api.create(&payload).await {
                        Ok(food) => FoodAction::FoodCreated { food },
                        Err(error) => FoodAction::CreateFailed { error },
                    })
                })]
            },

            FoodAction::UpdateFood { id, payload } => {
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    Some(match api.update(&id, &payload).await {
                        Ok(food) => FoodAction::FoodUpdated { food },
                        Err(error) => FoodAction::UpdateFailed { id, error },
                    })
                })]
            },

            FoodAction::DeleteFood { id } => {
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    Some(match api.delete(&id).await {
                        Ok(()) => FoodAction::FoodDeleted { id },
                        Err(error) => FoodAction::DeleteFailed { id, error },
                    })
                })]
            },

            // ========== Events ==========
            event => {
                Self::apply_event(state, event);
                smallvec![Effect::None]
            },
        }
    }
}

/// The runtime store for the food list
pub type FoodStore<C> = Store<FoodState, FoodAction, FoodEnvironment<C>, FoodReducer<C>>;

/// Build the store once at startup; clones share its state
#[must_use]
pub fn food_store<C>(api: C) -> FoodStore<C>
where
    C: FoodApi + Clone + 'static,
{
    Store::new(
        FoodState::default(),
        FoodReducer::new(),
        FoodEnvironment::new(api),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{ApiCall, InMemoryFoodApi};
    use foodwagen_testing::{ReducerTest, assertions, settle};
    use proptest::prelude::*;

    type TestReducer = FoodReducer<InMemoryFoodApi>;

    fn env(api: &InMemoryFoodApi) -> FoodEnvironment<InMemoryFoodApi> {
        FoodEnvironment::new(api.clone())
    }

    fn menu() -> Vec<FoodItem> {
        vec![
            FoodItem::new("1", "Burger"),
            FoodItem::new("2", "Pizza Margherita"),
            FoodItem::new("3", "Pepperoni Pizza"),
        ]
    }

    fn loaded(foods: Vec<FoodItem>) -> FoodState {
        FoodState {
            foods,
            ..FoodState::default()
        }
    }

    #[test]
    fn fetch_starts_loading_and_clears_error() {
        let api = InMemoryFoodApi::new();

        ReducerTest::new(TestReducer::new())
            .with_env(env(&api))
            .given_state(FoodState {
                error: Some("old".into()),
                ..FoodState::default()
            })
            .when_action(FoodAction::FetchFoods { filter: None })
            .then_state(|state| {
                assert!(state.loading);
                assert_eq!(state.error, None);
                assert_eq!(state.fetch_generation, 1);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();

        // Nothing reaches the client until the effect runs
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn fetch_replaces_list() {
        let api = InMemoryFoodApi::with_foods(menu());
        let mut state = loaded(vec![FoodItem::new("99", "Stale")]);

        settle(&TestReducer::new(), &mut state, FoodAction::FetchFoods { filter: None }, &env(&api))
            .await;

        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.foods, menu());
    }

    #[tokio::test]
    async fn filtered_fetch_replaces_list_with_matches() {
        let api = InMemoryFoodApi::with_foods(menu());
        let mut state = loaded(menu());

        let observed = settle(
            &TestReducer::new(),
            &mut state,
            FoodAction::FetchFoods {
                filter: Some("pizza".into()),
            },
            &env(&api),
        )
        .await;

        assert_eq!(observed.len(), 1);
        let ids: Vec<_> = state.foods.iter().map(|food| food.id.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);
        assert_eq!(
            api.calls(),
            vec![ApiCall::List {
                filter: Some("pizza".into())
            }]
        );
    }

    #[tokio::test]
    async fn empty_filter_fetches_everything() {
        let api = InMemoryFoodApi::with_foods(menu());
        let mut state = FoodState::default();

        settle(
            &TestReducer::new(),
            &mut state,
            FoodAction::FetchFoods {
                filter: Some(String::new()),
            },
            &env(&api),
        )
        .await;

        assert_eq!(state.foods.len(), 3);
        assert_eq!(api.calls(), vec![ApiCall::List { filter: None }]);
    }

    #[tokio::test]
    async fn network_failure_keeps_list_and_sets_error() {
        let api = InMemoryFoodApi::new();
        api.fail_next(ApiError::Network);
        let mut state = loaded(menu());

        settle(&TestReducer::new(), &mut state, FoodAction::FetchFoods { filter: None }, &env(&api))
            .await;

        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Network Error: No response from server")
        );
        assert_eq!(state.foods, menu());
    }

    #[test]
    fn stale_fetch_results_are_discarded() {
        let api = InMemoryFoodApi::new();

        ReducerTest::new(TestReducer::new())
            .with_env(env(&api))
            .given_state(FoodState::default())
            .when_action(FoodAction::FetchFoods { filter: None })
            .when_action(FoodAction::FetchFoods {
                filter: Some("pizza".into()),
            })
            // The first fetch completes last
            .when_action(FoodAction::FoodsLoaded {
                generation: 2,
                foods: vec![FoodItem::new("2", "Pizza Margherita")],
            })
            .when_action(FoodAction::FoodsLoaded {
                generation: 1,
                foods: menu(),
            })
            .when_action(FoodAction::FetchFailed {
                generation: 1,
                error: ApiError::Network,
            })
            .then_state(|state| {
                assert!(!state.loading);
                assert_eq!(state.error, None);
                assert_eq!(state.foods, vec![FoodItem::new("2", "Pizza Margherita")]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn stale_result_does_not_end_latest_loading() {
        let api = InMemoryFoodApi::new();

        ReducerTest::new(TestReducer::new())
            .with_env(env(&api))
            .given_state(FoodState::default())
            .when_action(FoodAction::FetchFoods { filter: None })
            .when_action(FoodAction::FetchFoods { filter: None })
            .when_action(FoodAction::FoodsLoaded {
                generation: 1,
                foods: menu(),
            })
            .then_state(|state| {
                assert!(state.loading);
                assert!(state.foods.is_empty());
            })
            .run();
    }

    #[tokio::test]
    async fn create_appends_server_item() {
        let api = InMemoryFoodApi::with_foods(menu());
        let mut state = loaded(menu());
        let payload = FoodPayload {
            name: Some("Tacos".into()),
            ..FoodPayload::default()
        };

        let observed = settle(
            &TestReducer::new(),
            &mut state,
            FoodAction::CreateFood { payload },
            &env(&api),
        )
        .await;

        assert_eq!(
            observed,
            vec![FoodAction::FoodCreated {
                food: FoodItem::new("4", "Tacos")
            }]
        );
        assert_eq!(state.foods.len(), 4);
        assert_eq!(state.foods[3].id, FoodId::from("4"));
        assert!(!state.loading);
    }

    #[test]
    fn update_replaces_in_place() {
        let api = InMemoryFoodApi::new();
        let renamed = FoodItem::new("2", "Pizza Bianca").with_rating(5.0);

        ReducerTest::new(TestReducer::new())
            .with_env(env(&api))
            .given_state(loaded(menu()))
            .when_action(FoodAction::FoodUpdated {
                food: renamed.clone(),
            })
            .then_state(move |state| {
                assert_eq!(state.foods.len(), 3);
                assert_eq!(state.foods[1], renamed);
                assert_eq!(state.foods[0].name, "Burger");
            })
            .run();
    }

    #[test]
    fn update_of_absent_id_is_noop() {
        let api = InMemoryFoodApi::new();

        ReducerTest::new(TestReducer::new())
            .with_env(env(&api))
            .given_state(loaded(menu()))
            .when_action(FoodAction::FoodUpdated {
                food: FoodItem::new("42", "Ghost"),
            })
            .then_state(|state| assert_eq!(state.foods, menu()))
            .run();
    }

    #[tokio::test]
    async fn delete_removes_by_id() {
        let api = InMemoryFoodApi::with_foods(menu());
        let mut state = loaded(menu());

        settle(
            &TestReducer::new(),
            &mut state,
            FoodAction::DeleteFood { id: "2".into() },
            &env(&api),
        )
        .await;

        let ids: Vec<_> = state.foods.iter().map(|food| food.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn delete_of_absent_id_is_noop() {
        let api = InMemoryFoodApi::new();

        ReducerTest::new(TestReducer::new())
            .with_env(env(&api))
            .given_state(loaded(menu()))
            .when_action(FoodAction::FoodDeleted { id: "42".into() })
            .then_state(|state| assert_eq!(state.foods, menu()))
            .run();
    }

    #[tokio::test]
    async fn mutation_failures_leave_state_untouched() {
        let api = InMemoryFoodApi::with_foods(menu());
        let reducer = TestReducer::new();
        let mut state = loaded(menu());
        let before = state.clone();

        api.fail_next(ApiError::Network);
        let observed = settle(
            &reducer,
            &mut state,
            FoodAction::CreateFood {
                payload: FoodPayload::default(),
            },
            &env(&api),
        )
        .await;
        assert_eq!(
            observed,
            vec![FoodAction::CreateFailed {
                error: ApiError::Network
            }]
        );

        let observed = settle(
            &reducer,
            &mut state,
            FoodAction::DeleteFood { id: "42".into() },
            &env(&api),
        )
        .await;
        assert!(matches!(observed.as_slice(), [FoodAction::DeleteFailed { .. }]));

        let observed = settle(
            &reducer,
            &mut state,
            FoodAction::UpdateFood {
                id: "42".into(),
                payload: FoodPayload::default(),
            },
            &env(&api),
        )
        .await;
        assert!(matches!(observed.as_slice(), [FoodAction::UpdateFailed { .. }]));

        assert_eq!(state, before);
    }

    #[test]
    fn fetch_error_message_falls_back_when_empty() {
        let error = ApiError::Server {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(TestReducer::fetch_error_message(&error), "API Error 500: boom");
        assert_eq!(FETCH_FAILED_FALLBACK, "Failed to load foods");
    }

    proptest! {
        #[test]
        fn latest_result_always_replaces_list(
            names in proptest::collection::vec("[a-z]{1,8}", 0..20),
            fetches in 1u64..5,
        ) {
            let foods: Vec<FoodItem> = names
                .iter()
                .enumerate()
                .map(|(i, name)| FoodItem::new(i.to_string(), name.as_str()))
                .collect();
            let mut state = loaded(menu());
            let api = InMemoryFoodApi::new();
            let reducer = TestReducer::new();

            for _ in 0..fetches {
                let _ = reducer.reduce(&mut state, FoodAction::FetchFoods { filter: None }, &env(&api));
            }
            for generation in 1..fetches {
                let _ = reducer.reduce(
                    &mut state,
                    FoodAction::FoodsLoaded { generation, foods: vec![FoodItem::new("x", "stale")] },
                    &env(&api),
                );
            }
            let _ = reducer.reduce(
                &mut state,
                FoodAction::FoodsLoaded { generation: fetches, foods: foods.clone() },
                &env(&api),
            );

            prop_assert!(!state.loading);
            prop_assert_eq!(state.foods, foods);
        }
    }
}
