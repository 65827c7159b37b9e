//! # FoodWagen
//!
//! Browse, search, create, edit and delete food listings held by a REST
//! collection.
//!
//! - [`client`]: the [`FoodApi`] seam and its HTTP implementation
//! - [`reducer`]: the shared store (list, loading flag, fetch error)
//! - [`form`]: the validating create/edit form
//! - [`views`]: cards, pagination, modals and the home page, rendered as text
//! - [`console`]: line commands driving the home page from a terminal
//!
//! ## Example
//!
//! ```no_run
//! use foodwagen::{food_store, FoodAction, HttpFoodApi, ClientConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpFoodApi::new(&ClientConfig::default())?;
//! let store = food_store(api);
//!
//! store
//!     .send(FoodAction::FetchFoods { filter: Some("pizza".into()) })
//!     .await
//!     .wait()
//!     .await;
//!
//! let names: Vec<String> = store
//!     .state(|s| s.foods.iter().map(|f| f.name.clone()).collect())
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod form;
pub mod mocks;
pub mod reducer;
pub mod types;
pub mod views;

pub use client::{FoodApi, HttpFoodApi};
pub use config::{AppConfig, ClientConfig};
pub use error::{ApiError, ApiErrorKind, ConfigError};
pub use form::{FoodForm, FormField, SaveRequest, SubmitOutcome};
pub use reducer::{FoodAction, FoodEnvironment, FoodReducer, FoodState, FoodStore, food_store};
pub use types::{FoodId, FoodItem, FoodPayload, Price, Restaurant, RestaurantStatus};
pub use views::HomePage;
