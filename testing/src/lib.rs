//! # FoodWagen Testing
//!
//! Helpers for testing reducers without a running store.
//!
//! - [`ReducerTest`]: fluent Given-When-Then harness for a single reducer call
//! - [`effects`]: run the effects a reducer returned and collect the actions
//!   they feed back, or settle a reducer until no work is left
//! - [`assertions`]: small effect assertions
//!
//! ## Example
//!
//! ```ignore
//! use foodwagen_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(FoodReducer::new())
//!     .with_env(env)
//!     .given_state(FoodState::default())
//!     .when_action(FoodAction::FetchFoods { filter: None })
//!     .then_state(|state| assert!(state.loading))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```

pub mod effects;

pub use effects::{drive_effects, settle};
pub use reducer_test::{ReducerTest, assertions};

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}
