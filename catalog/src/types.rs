//! Domain types for the food catalog.
//!
//! A [`FoodItem`] is a menu entry with an optional embedded [`Restaurant`].
//! Items are addressed only by their server-assigned [`FoodId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Server-assigned identifier of a food item
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodId(String);

impl FoodId {
    /// Creates a `FoodId` from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FoodId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Price as the backend stores it: either a JSON number or free text.
///
/// The form always sends what the user typed, so values written by this
/// application come back as [`Price::Text`]; seeded data is often numeric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    /// Numeric price
    Amount(f64),
    /// Raw text, possibly already carrying a currency symbol
    Text(String),
}

impl Price {
    /// The value shown in a text input when editing
    #[must_use]
    pub fn input_value(&self) -> String {
        match self {
            Self::Amount(amount) => amount.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// The value shown on a card.
    ///
    /// Numbers get a `$` prefix. Text gets one unless it already starts with
    /// `$`. Empty text renders as nothing.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Amount(amount) => format!("${amount}"),
            Self::Text(text) if text.is_empty() => String::new(),
            Self::Text(text) if text.starts_with('$') => text.clone(),
            Self::Text(text) => format!("${text}"),
        }
    }
}

/// Whether a restaurant is currently taking orders
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestaurantStatus {
    /// Serialized as `"Open Now"`
    #[default]
    #[serde(rename = "Open Now")]
    OpenNow,
    /// Serialized as `"Closed"`
    #[serde(rename = "Closed")]
    Closed,
}

impl RestaurantStatus {
    /// All permitted values, in the order a picker lists them
    pub const ALL: [Self; 2] = [Self::OpenNow, Self::Closed];

    /// The wire and display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OpenNow => "Open Now",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for RestaurantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A status label other than `"Open Now"` or `"Closed"`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown restaurant status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for RestaurantStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Restaurant embedded in a food item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Restaurant name
    pub name: String,
    /// Logo URL
    pub logo: String,
    /// Open/closed status
    pub status: RestaurantStatus,
}

/// A food listing as returned by the collection endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    /// Server-assigned identifier
    pub id: FoodId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Price, numeric or text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Rating, nominally 1 to 5 but not enforced on stored data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Owning restaurant, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<Restaurant>,
}

impl FoodItem {
    /// Creates an item with only an id and a name
    #[must_use]
    pub fn new(id: impl Into<FoodId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: None,
            rating: None,
            image: None,
            restaurant: None,
        }
    }

    /// Builds the server-side representation of a freshly created payload
    #[must_use]
    pub fn from_payload(id: FoodId, payload: FoodPayload) -> Self {
        let mut item = Self::new(id, String::new());
        item.apply(payload);
        item
    }

    /// Overwrites every field present in `payload`
    pub fn apply(&mut self, payload: FoodPayload) {
        let FoodPayload {
            name,
            price,
            rating,
            image,
            restaurant,
        } = payload;

        if let Some(name) = name {
            self.name = name;
        }
        if price.is_some() {
            self.price = price;
        }
        if rating.is_some() {
            self.rating = rating;
        }
        if image.is_some() {
            self.image = image;
        }
        if restaurant.is_some() {
            self.restaurant = restaurant;
        }
    }

    /// Builder: set the price
    #[must_use]
    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    /// Builder: set the rating
    #[must_use]
    pub const fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Builder: set the image URL
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Builder: set the restaurant
    #[must_use]
    pub fn with_restaurant(mut self, restaurant: Restaurant) -> Self {
        self.restaurant = Some(restaurant);
        self
    }
}

impl From<String> for FoodId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The fields sent on create and update. Absent fields are omitted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodPayload {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Price as typed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Restaurant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<Restaurant>,
}
