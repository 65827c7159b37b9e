//! Create/edit form for a food item.
//!
//! The form holds raw text for every field. [`FoodForm::submit`] runs every
//! validation rule, and only when all pass calls the [`FoodApi`] directly:
//! `update` when editing an existing item, `create` otherwise.

use crate::client::FoodApi;
use crate::error::ApiError;
use crate::types::{FoodId, FoodItem, FoodPayload, Price, Restaurant, RestaurantStatus};
use reqwest::Url;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Alert shown when a save fails without a message
pub const SAVE_FAILED_FALLBACK: &str = "Failed to save food item";

/// An input of [`FoodForm`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    /// Food name
    Name,
    /// Price, free-form
    Price,
    /// Rating, 1 to 5
    Rating,
    /// Food image URL
    Image,
    /// Restaurant name
    RestaurantName,
    /// Restaurant logo URL
    RestaurantLogo,
    /// `Open Now` or `Closed`
    RestaurantStatus,
}

impl FormField {
    /// Every field, in display order
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Price,
        Self::Rating,
        Self::Image,
        Self::RestaurantName,
        Self::RestaurantLogo,
        Self::RestaurantStatus,
    ];

    /// Label shown next to the input
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Food Name",
            Self::Price => "Food Price",
            Self::Rating => "Food Rating",
            Self::Image => "Food Image URL",
            Self::RestaurantName => "Restaurant Name",
            Self::RestaurantLogo => "Restaurant Logo URL",
            Self::RestaurantStatus => "Restaurant Status",
        }
    }

    /// Input name, also accepted by `set` in the console
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "food_name",
            Self::Price => "food_price",
            Self::Rating => "food_rating",
            Self::Image => "food_image",
            Self::RestaurantName => "restaurant_name",
            Self::RestaurantLogo => "restaurant_logo",
            Self::RestaurantStatus => "restaurant_status",
        }
    }
}

/// A field name no [`FormField`] answers to
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field {0:?}")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    /// Accepts the input name (`food_name`) or a short alias (`name`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        let alias = match wanted.as_str() {
            "name" => Some(Self::Name),
            "price" => Some(Self::Price),
            "rating" => Some(Self::Rating),
            "image" => Some(Self::Image),
            "restaurant" => Some(Self::RestaurantName),
            "logo" => Some(Self::RestaurantLogo),
            "status" => Some(Self::RestaurantStatus),
            _ => None,
        };

        alias
            .or_else(|| Self::ALL.into_iter().find(|field| field.key() == wanted))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Result of [`FoodForm::submit`]
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; errors are on the form and nothing was sent
    Invalid,
    /// The server accepted the item; the form has been reset
    Saved(FoodItem),
    /// The call failed; the form keeps its values for a retry
    Failed {
        /// Message to show the user
        alert: String,
    },
}

/// A validated save, ready to go to the server
#[derive(Clone, Debug, PartialEq)]
pub struct SaveRequest {
    /// Item to update; `None` creates
    pub id: Option<FoodId>,
    /// Body to send
    pub payload: FoodPayload,
}

impl SaveRequest {
    /// `update` when an id is set, `create` otherwise
    ///
    /// # Errors
    ///
    /// Whatever the [`FoodApi`] call returns.
    pub async fn send<C: FoodApi>(&self, api: &C) -> Result<FoodItem, ApiError> {
        match &self.id {
            Some(id) => api.update(id, &self.payload).await,
            None => api.create(&self.payload).await,
        }
    }
}

/// Form state: raw field values, inline errors and the item being edited
#[derive(Clone, Debug, PartialEq)]
pub struct FoodForm {
    values: BTreeMap<FormField, String>,
    errors: BTreeMap<FormField, String>,
    submitting: bool,
    editing: Option<FoodItem>,
}

impl FoodForm {
    /// Empty form for creating an item
    #[must_use]
    pub fn new() -> Self {
        let mut form = Self {
            values: BTreeMap::new(),
            errors: BTreeMap::new(),
            submitting: false,
            editing: None,
        };
        form.reset();
        form
    }

    /// Form pre-filled from `food`, saving with an update
    #[must_use]
    pub fn edit(food: &FoodItem) -> Self {
        let mut form = Self::new();
        form.set(FormField::Name, food.name.clone());
        if let Some(price) = &food.price {
            form.set(FormField::Price, price.input_value());
        }
        if let Some(rating) = food.rating {
            form.set(FormField::Rating, rating.to_string());
        }
        if let Some(image) = &food.image {
            form.set(FormField::Image, image.clone());
        }
        if let Some(restaurant) = &food.restaurant {
            form.set(FormField::RestaurantName, restaurant.name.clone());
            form.set(FormField::RestaurantLogo, restaurant.logo.clone());
            form.set(FormField::RestaurantStatus, restaurant.status.label());
        }
        form.editing = Some(food.clone());
        form
    }

    /// Current raw value of `field`
    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    /// Replace the raw value of `field`
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Inline errors from the last validation
    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<FormField, String> {
        &self.errors
    }

    /// Inline error of one field
    #[must_use]
    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// A save is in flight
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The item being edited, if any
    #[must_use]
    pub const fn editing(&self) -> Option<&FoodItem> {
        self.editing.as_ref()
    }

    /// Label of the submit button
    #[must_use]
    pub const fn submit_label(&self) -> &'static str {
        match (self.editing.is_some(), self.submitting) {
            (false, false) => "Save Food",
            (true, false) => "Save Changes",
            (false, true) => "Adding Food...",
            (true, true) => "Updating Food...",
        }
    }

    /// Run every rule, replacing the recorded errors. Returns `true` when
    /// there are none.
    pub fn validate(&mut self) -> bool {
        let mut errors = BTreeMap::new();

        if self.value(FormField::Name).trim().is_empty() {
            errors.insert(FormField::Name, "Food Name is required".to_string());
        }

        if let Err(message) = parse_rating(self.value(FormField::Rating)) {
            errors.insert(FormField::Rating, message.to_string());
        }

        for (field, label) in [
            (FormField::Image, "Food Image URL"),
            (FormField::RestaurantLogo, "Restaurant Logo URL"),
        ] {
            let value = self.value(field).trim();
            if value.is_empty() {
                errors.insert(field, format!("{label} is required"));
            } else if Url::parse(value).is_err() {
                errors.insert(field, format!("{label} must be a valid URL"));
            }
        }

        if self.value(FormField::RestaurantName).trim().is_empty() {
            errors.insert(
                FormField::RestaurantName,
                "Restaurant Name is required".to_string(),
            );
        }

        if self
            .value(FormField::RestaurantStatus)
            .parse::<RestaurantStatus>()
            .is_err()
        {
            errors.insert(
                FormField::RestaurantStatus,
                r#"Restaurant Status must be "Open Now" or "Closed""#.to_string(),
            );
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    /// The body sent to the server, or `None` if rating or status do not
    /// parse. Text fields are sent as typed.
    #[must_use]
    pub fn payload(&self) -> Option<FoodPayload> {
        let rating = parse_rating(self.value(FormField::Rating)).ok()?;
        let status = self.value(FormField::RestaurantStatus).parse().ok()?;

        Some(FoodPayload {
            name: Some(self.value(FormField::Name).to_string()),
            price: Some(Price::Text(self.value(FormField::Price).to_string())),
            rating: Some(rating),
            image: Some(self.value(FormField::Image).to_string()),
            restaurant: Some(Restaurant {
                name: self.value(FormField::RestaurantName).to_string(),
                logo: self.value(FormField::RestaurantLogo).to_string(),
                status,
            }),
        })
    }

    /// Validate and mark the form as saving. Returns the call to make, or
    /// `None` when a rule fails (errors are recorded) or a save is already
    /// in flight.
    pub fn begin_submit(&mut self) -> Option<SaveRequest> {
        if self.submitting {
            tracing::debug!("Save already in flight");
            return None;
        }
        if !self.validate() {
            tracing::debug!(errors = self.errors.len(), "Form has validation errors");
            return None;
        }
        let payload = self.payload()?;

        self.submitting = true;
        Some(SaveRequest {
            id: self.editing.as_ref().map(|food| food.id.clone()),
            payload,
        })
    }

    /// Apply the answer to a [`SaveRequest`]. Success resets the fields;
    /// failure keeps them and yields the alert.
    pub fn finish_submit(&mut self, result: Result<FoodItem, ApiError>) -> SubmitOutcome {
        self.submitting = false;

        match result {
            Ok(food) => {
                tracing::info!(id = %food.id, "Food saved");
                self.reset();
                SubmitOutcome::Saved(food)
            },
            Err(error) => {
                tracing::warn!(kind = ?error.kind(), %error, "Food save failed");
                let alert = error.to_string();
                SubmitOutcome::Failed {
                    alert: if alert.is_empty() {
                        SAVE_FAILED_FALLBACK.to_string()
                    } else {
                        alert
                    },
                }
            },
        }
    }

    /// Validate, then create or update through `api`
    pub async fn submit<C: FoodApi>(&mut self, api: &C) -> SubmitOutcome {
        let Some(request) = self.begin_submit() else {
            return SubmitOutcome::Invalid;
        };
        let result = request.send(api).await;
        self.finish_submit(result)
    }

    /// Clear every field and error; status goes back to `Open Now`
    pub fn reset(&mut self) {
        self.values = FormField::ALL
            .into_iter()
            .map(|field| (field, String::new()))
            .collect();
        self.set(
            FormField::RestaurantStatus,
            RestaurantStatus::default().label(),
        );
        self.errors.clear();
    }
}

impl Default for FoodForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Rating rules: present, numeric, within 1..=5
fn parse_rating(raw: &str) -> Result<f64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Food Rating is required");
    }
    let rating = raw
        .parse::<f64>()
        .ok()
        .filter(|rating| !rating.is_nan())
        .ok_or("Food Rating must be a number")?;
    if (1.0..=5.0).contains(&rating) {
        Ok(rating)
    } else {
        Err("Food Rating must be between 1 and 5")
    }
}

impl fmt::Display for FoodForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in FormField::ALL {
            writeln!(f, "{:<20} [{}]", field.label(), self.value(field))?;
            if let Some(error) = self.error(field) {
                writeln!(f, "{:<20} ! {error}", "")?;
            }
        }
        write!(f, "[ {} ]  [ Cancel ]", self.submit_label())
    }
}
