//! In-memory [`FoodApi`] for tests and offline runs

use crate::client::FoodApi;
use crate::error::ApiError;
use crate::types::{FoodId, FoodItem, FoodPayload, Price, Restaurant, RestaurantStatus};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call received by [`InMemoryFoodApi`]
#[derive(Clone, Debug, PartialEq)]
pub enum ApiCall {
    /// `list(filter)`
    List {
        /// Filter as passed
        filter: Option<String>,
    },
    /// `create(payload)`
    Create {
        /// Payload as passed
        payload: FoodPayload,
    },
    /// `update(id, payload)`
    Update {
        /// Target id
        id: FoodId,
        /// Payload as passed
        payload: FoodPayload,
    },
    /// `delete(id)`
    Delete {
        /// Target id
        id: FoodId,
    },
}

#[derive(Debug, Default)]
struct Collection {
    foods: Vec<FoodItem>,
    next_id: u64,
    calls: Vec<ApiCall>,
    failures: VecDeque<ApiError>,
}

impl Collection {
    fn next_failure(&mut self) -> Result<(), ApiError> {
        self.failures.pop_front().map_or(Ok(()), Err)
    }
}

/// Food collection held in memory.
///
/// Behaves like the mock backend: sequential string ids, case-insensitive
/// substring name filter, 404 for unknown ids. Clones share the collection.
#[derive(Clone, Debug)]
pub struct InMemoryFoodApi {
    inner: Arc<Mutex<Collection>>,
}

impl InMemoryFoodApi {
    /// Empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::with_foods(Vec::new())
    }

    /// Collection seeded with `foods`; new ids continue after the largest
    /// numeric id present
    #[must_use]
    pub fn with_foods(foods: Vec<FoodItem>) -> Self {
        let next_id = foods
            .iter()
            .filter_map(|food| food.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            inner: Arc::new(Mutex::new(Collection {
                foods,
                next_id,
                ..Collection::default()
            })),
        }
    }

    /// A small seeded menu for offline runs
    #[must_use]
    pub fn demo() -> Self {
        let diner = |name: &str, status| Restaurant {
            name: name.to_string(),
            logo: format!(
                "https://images.foodwagen.test/logos/{}.png",
                name.to_lowercase().replace(' ', "-")
            ),
            status,
        };

        let menu = [
            ("Bow Lasagna", "2.99", 4.6, "Pasta Palace", RestaurantStatus::OpenNow),
            ("Mixed Avocado Smoothie", "5.99", 4.0, "Green Cup", RestaurantStatus::Closed),
            ("Pancake", "4.50", 5.0, "Morning Stack", RestaurantStatus::OpenNow),
            ("Cupcake", "1.99", 3.8, "Sugar Lane", RestaurantStatus::OpenNow),
            ("Creamy Stake", "12.99", 4.9, "Grill House", RestaurantStatus::OpenNow),
            ("Steak with Potatoes", "14.99", 4.7, "Grill House", RestaurantStatus::Closed),
            ("Indian Spicy Soup", "6.49", 4.2, "Spice Route", RestaurantStatus::OpenNow),
            ("Stake Omelet", "8.99", 4.3, "Morning Stack", RestaurantStatus::OpenNow),
            ("Margherita Pizza", "9.99", 4.5, "Luigi", RestaurantStatus::OpenNow),
            ("Chicken Burger", "7.49", 4.1, "Burger Barn", RestaurantStatus::Closed),
        ];

        let foods = menu
            .into_iter()
            .enumerate()
            .map(|(index, (name, price, rating, restaurant, status))| {
                FoodItem::new((index + 1).to_string(), name)
                    .with_price(Price::Text(price.to_string()))
                    .with_rating(rating)
                    .with_image(format!(
                        "https://images.foodwagen.test/meals/{}.jpg",
                        index + 1
                    ))
                    .with_restaurant(diner(restaurant, status))
            })
            .collect();

        Self::with_foods(foods)
    }

    /// Make the next call fail with `error`. Queued failures are consumed in
    /// order, one per call.
    pub fn fail_next(&self, error: ApiError) {
        self.lock().failures.push_back(error);
    }

    /// Every call received so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Current contents of the collection
    #[must_use]
    pub fn foods(&self) -> Vec<FoodItem> {
        self.lock().foods.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Collection> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn not_found(id: &FoodId) -> ApiError {
        tracing::debug!(%id, "Unknown food id");
        ApiError::Server {
            status: 404,
            message: "Not found".to_string(),
        }
    }
}

impl Default for InMemoryFoodApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodApi for InMemoryFoodApi {
    async fn list(&self, filter: Option<&str>) -> Result<Vec<FoodItem>, ApiError> {
        let mut collection = self.lock();
        collection.calls.push(ApiCall::List {
            filter: filter.map(str::to_owned),
        });
        collection.next_failure()?;

        let needle = filter.map(str::to_lowercase);
        Ok(collection
            .foods
            .iter()
            .filter(|food| {
                needle
                    .as_deref()
                    .is_none_or(|needle| food.name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect())
    }

    async fn create(&self, payload: &FoodPayload) -> Result<FoodItem, ApiError> {
        let mut collection = self.lock();
        collection.calls.push(ApiCall::Create {
            payload: payload.clone(),
        });
        collection.next_failure()?;

        let id = FoodId::new(collection.next_id.to_string());
        collection.next_id += 1;

        let food = FoodItem::from_payload(id, payload.clone());
        collection.foods.push(food.clone());
        Ok(food)
    }

    async fn update(&self, id: &FoodId, payload: &FoodPayload) -> Result<FoodItem, ApiError> {
        let mut collection = self.lock();
        collection.calls.push(ApiCall::Update {
            id: id.clone(),
            payload: payload.clone(),
        });
        collection.next_failure()?;

        let food = collection
            .foods
            .iter_mut()
            .find(|food| &food.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        food.apply(payload.clone());
        Ok(food.clone())
    }

    async fn delete(&self, id: &FoodId) -> Result<(), ApiError> {
        let mut collection = self.lock();
        collection.calls.push(ApiCall::Delete { id: id.clone() });
        collection.next_failure()?;

        let position = collection
            .foods
            .iter()
            .position(|food| &food.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        collection.foods.remove(position);
        Ok(())
    }
}
