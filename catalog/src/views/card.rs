//! One food item on the page, with its options menu, edit modal and delete
//! confirmation.

use super::Modal;
use crate::error::ApiError;
use crate::form::{FoodForm, SaveRequest, SubmitOutcome};
use crate::reducer::FoodAction;
use crate::types::{FoodItem, RestaurantStatus};
use std::fmt;

/// Alert shown when a delete fails without a message
pub const DELETE_FAILED_FALLBACK: &str = "Failed to delete food item";

/// Styling bucket of the restaurant status badge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    /// `Open Now`
    Open,
    /// `Closed`
    Closed,
    /// No restaurant
    Unknown,
}

/// State of the delete confirmation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeleteDialog {
    /// The delete is in flight
    pub busy: bool,
}

/// A food card and its local UI state
#[derive(Clone, Debug, PartialEq)]
pub struct FoodCard {
    food: FoodItem,
    menu_open: bool,
    editor: Modal<FoodForm>,
    delete_dialog: Modal<DeleteDialog>,
}

impl FoodCard {
    /// A card with menu and dialogs closed
    #[must_use]
    pub const fn new(food: FoodItem) -> Self {
        Self {
            food,
            menu_open: false,
            editor: Modal::closed(),
            delete_dialog: Modal::closed(),
        }
    }

    /// The item shown
    #[must_use]
    pub const fn food(&self) -> &FoodItem {
        &self.food
    }

    /// Show newer data for the same item, keeping UI state
    pub fn refresh(&mut self, food: FoodItem) {
        self.food = food;
    }

    // ========== Display ==========

    /// Price tag; empty when the item has no price
    #[must_use]
    pub fn display_price(&self) -> String {
        self.food
            .price
            .as_ref()
            .map(crate::types::Price::display)
            .unwrap_or_default()
    }

    /// Rating, or `N/A`
    #[must_use]
    pub fn display_rating(&self) -> String {
        self.food
            .rating
            .map_or_else(|| "N/A".to_string(), |rating| rating.to_string())
    }

    /// Restaurant name, or `No restaurant`
    #[must_use]
    pub fn restaurant_name(&self) -> &str {
        self.food
            .restaurant
            .as_ref()
            .map_or("No restaurant", |restaurant| restaurant.name.as_str())
    }

    /// Status label, or `Unknown`
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        self.food
            .restaurant
            .as_ref()
            .map_or("Unknown", |restaurant| restaurant.status.label())
    }

    /// Badge bucket for the status
    #[must_use]
    pub fn status_class(&self) -> StatusClass {
        match self.food.restaurant.as_ref().map(|restaurant| restaurant.status) {
            Some(RestaurantStatus::OpenNow) => StatusClass::Open,
            Some(RestaurantStatus::Closed) => StatusClass::Closed,
            None => StatusClass::Unknown,
        }
    }

    // ========== Menu ==========

    /// Whether the options menu is showing
    #[must_use]
    pub const fn menu_open(&self) -> bool {
        self.menu_open
    }

    /// Open or close the options menu
    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    /// Menu entry "Edit Food": closes the menu and opens a pre-filled editor
    pub fn choose_edit(&mut self) {
        self.menu_open = false;
        self.editor.open(FoodForm::edit(&self.food));
    }

    /// Menu entry "Delete Food": closes the menu and asks for confirmation
    pub fn choose_delete(&mut self) {
        self.menu_open = false;
        self.delete_dialog.open(DeleteDialog::default());
    }

    // ========== Edit ==========

    /// The open editor
    #[must_use]
    pub const fn editor(&self) -> Option<&FoodForm> {
        self.editor.content()
    }

    /// The open editor, mutably
    pub fn editor_mut(&mut self) -> Option<&mut FoodForm> {
        self.editor.content_mut()
    }

    /// Close the editor without saving
    pub fn cancel_edit(&mut self) {
        if self.editor().is_some_and(FoodForm::is_submitting) {
            return;
        }
        self.editor.close();
    }

    /// Validate the editor and mark it saving. `None` when no editor is
    /// open, a rule fails, or a save is already running.
    pub fn begin_edit(&mut self) -> Option<SaveRequest> {
        self.editor.content_mut()?.begin_submit()
    }

    /// Apply the answer to [`begin_edit`](Self::begin_edit); closes the
    /// editor on success. `None` when no editor is open.
    pub fn finish_edit(&mut self, result: Result<FoodItem, ApiError>) -> Option<SubmitOutcome> {
        let outcome = self.editor.content_mut()?.finish_submit(result);
        if matches!(outcome, SubmitOutcome::Saved(_)) {
            self.editor.close();
        }
        Some(outcome)
    }

    // ========== Delete ==========

    /// The open delete confirmation
    #[must_use]
    pub const fn delete_dialog(&self) -> Option<&DeleteDialog> {
        self.delete_dialog.content()
    }

    /// Dismiss the confirmation; ignored while the delete is in flight
    pub fn cancel_delete(&mut self) {
        if self.delete_dialog().is_some_and(|dialog| dialog.busy) {
            tracing::debug!(id = %self.food.id, "Delete in flight, dialog stays open");
            return;
        }
        self.delete_dialog.close();
    }

    /// Mark the delete as in flight and return the action to dispatch.
    /// `None` when no confirmation is open or a delete is already running.
    pub fn begin_delete(&mut self) -> Option<FoodAction> {
        let dialog = self.delete_dialog.content_mut()?;
        if dialog.busy {
            return None;
        }
        dialog.busy = true;
        Some(FoodAction::DeleteFood {
            id: self.food.id.clone(),
        })
    }

    /// Apply the store's answer to a delete. Success closes the dialog;
    /// failure leaves it open and returns the alert to show.
    pub fn finish_delete(&mut self, outcome: &FoodAction) -> Option<String> {
        if let Some(dialog) = self.delete_dialog.content_mut() {
            dialog.busy = false;
        }

        match outcome {
            FoodAction::FoodDeleted { .. } => {
                self.delete_dialog.close();
                None
            },
            FoodAction::DeleteFailed { error, .. } => Some(alert_text(error.to_string())),
            other => {
                tracing::warn!(?other, "Unexpected delete outcome");
                Some(DELETE_FAILED_FALLBACK.to_string())
            },
        }
    }

    /// The delete never answered; the dialog stays open and idle
    pub fn abandon_delete(&mut self, reason: &str) -> String {
        if let Some(dialog) = self.delete_dialog.content_mut() {
            dialog.busy = false;
        }
        tracing::warn!(id = %self.food.id, reason, "Delete outcome never arrived");
        alert_text(reason.to_string())
    }
}

fn alert_text(message: String) -> String {
    if message.is_empty() {
        DELETE_FAILED_FALLBACK.to_string()
    } else {
        message
    }
}

impl fmt::Display for FoodCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let price = self.display_price();
        if price.is_empty() {
            writeln!(f, "{}", self.food.name)?;
        } else {
            writeln!(f, "{}  {price}", self.food.name)?;
        }
        writeln!(f, "   {}", self.restaurant_name())?;
        write!(
            f,
            "   * {}   [{}]",
            self.display_rating(),
            self.status_label()
        )?;

        if self.menu_open {
            write!(f, "\n   ( Edit Food | Delete Food )")?;
        }
        if let Some(form) = self.editor() {
            write!(f, "\n   --- Edit Food ---\n{form}")?;
        }
        if let Some(dialog) = self.delete_dialog() {
            write!(
                f,
                "\n   --- Delete Food ---\n   Are you sure you want to remove {}? This action cannot be undone.\n   [ {} ]  [ Cancel ]",
                self.food.name,
                if dialog.busy { "Deleting..." } else { "Delete" }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::form::FormField;
    use crate::mocks::InMemoryFoodApi;
    use crate::reducer::{FoodStore, food_store};
    use crate::types::{FoodId, Price, Restaurant};
    use std::time::Duration;

    fn burger() -> FoodItem {
        FoodItem::new("1", "Burger")
            .with_price(Price::Text("8.50".into()))
            .with_rating(4.5)
            .with_image("https://cdn.test/burger.png")
            .with_restaurant(Restaurant {
                name: "Burger Barn".into(),
                logo: "https://cdn.test/barn.png".into(),
                status: RestaurantStatus::Closed,
            })
    }

    #[test]
    fn display_fallbacks() {
        let card = FoodCard::new(FoodItem::new("2", "Mystery"));

        assert_eq!(card.display_price(), "");
        assert_eq!(card.display_rating(), "N/A");
        assert_eq!(card.restaurant_name(), "No restaurant");
        assert_eq!(card.status_label(), "Unknown");
        assert_eq!(card.status_class(), StatusClass::Unknown);
    }

    #[test]
    fn display_values() {
        let card = FoodCard::new(burger());

        assert_eq!(card.display_price(), "$8.50");
        assert_eq!(card.display_rating(), "4.5");
        assert_eq!(card.restaurant_name(), "Burger Barn");
        assert_eq!(card.status_label(), "Closed");
        assert_eq!(card.status_class(), StatusClass::Closed);
    }

    #[test]
    fn menu_gates_edit_and_delete() {
        let mut card = FoodCard::new(burger());

        card.toggle_menu();
        assert!(card.menu_open());
        card.choose_edit();
        assert!(!card.menu_open());
        let editor = card.editor().unwrap();
        assert_eq!(editor.value(FormField::Name), "Burger");
        assert_eq!(editor.value(FormField::Price), "8.50");

        card.cancel_edit();
        assert!(card.editor().is_none());

        card.toggle_menu();
        card.choose_delete();
        assert!(!card.menu_open());
        assert_eq!(card.delete_dialog(), Some(&DeleteDialog { busy: false }));
    }

    #[test]
    fn busy_dialog_ignores_cancel() {
        let mut card = FoodCard::new(burger());
        card.choose_delete();

        let action = card.begin_delete().unwrap();
        assert_eq!(action, FoodAction::DeleteFood { id: FoodId::from("1") });
        assert!(card.begin_delete().is_none());

        card.cancel_delete();
        assert!(card.delete_dialog().unwrap().busy);

        let alert = card.finish_delete(&FoodAction::DeleteFailed {
            id: FoodId::from("1"),
            error: ApiError::Network,
        });
        assert_eq!(alert.as_deref(), Some("Network Error: No response from server"));
        assert_eq!(card.delete_dialog(), Some(&DeleteDialog { busy: false }));

        card.cancel_delete();
        assert!(card.delete_dialog().is_none());
    }

    async fn run_delete(card: &mut FoodCard, store: &FoodStore<InMemoryFoodApi>) -> Option<String> {
        let action = card.begin_delete()?;
        let outcome = store
            .send_and_wait_for(
                action,
                |action| {
                    matches!(
                        action,
                        FoodAction::FoodDeleted { .. } | FoodAction::DeleteFailed { .. }
                    )
                },
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        card.finish_delete(&outcome)
    }

    #[tokio::test]
    async fn delete_success_closes_dialog() {
        let api = InMemoryFoodApi::with_foods(vec![burger()]);
        let store = food_store(api.clone());
        store.send(FoodAction::FetchFoods { filter: None }).await.wait().await;
        let mut card = FoodCard::new(burger());
        card.choose_delete();

        let alert = run_delete(&mut card, &store).await;

        assert_eq!(alert, None);
        assert!(card.delete_dialog().is_none());
        assert!(store.state(|s| s.foods.is_empty()).await);
        assert!(api.foods().is_empty());
    }

    #[tokio::test]
    async fn delete_failure_keeps_dialog_open() {
        let api = InMemoryFoodApi::with_foods(vec![burger()]);
        let store = food_store(api.clone());
        store.send(FoodAction::FetchFoods { filter: None }).await.wait().await;
        api.fail_next(ApiError::Server {
            status: 500,
            message: "Try later".into(),
        });
        let mut card = FoodCard::new(burger());
        card.choose_delete();

        let alert = run_delete(&mut card, &store).await;

        assert_eq!(alert.as_deref(), Some("API Error 500: Try later"));
        assert_eq!(card.delete_dialog(), Some(&DeleteDialog { busy: false }));
        assert_eq!(store.state(|s| s.foods.len()).await, 1);
        assert_eq!(store.state(|s| s.error.clone()).await, None);
    }

    #[test]
    fn abandoned_delete_goes_idle() {
        let mut card = FoodCard::new(burger());
        card.choose_delete();
        card.begin_delete().unwrap();

        let alert = card.abandon_delete("Timeout waiting for action");

        assert_eq!(alert, "Timeout waiting for action");
        assert_eq!(card.delete_dialog(), Some(&DeleteDialog { busy: false }));
    }

    #[tokio::test]
    async fn edit_shows_updating_then_closes_on_save() {
        let api = InMemoryFoodApi::with_foods(vec![burger()]);
        let mut card = FoodCard::new(burger());
        assert!(card.begin_edit().is_none());

        card.choose_edit();
        card.editor_mut().unwrap().set(FormField::Name, "Cheeseburger");
        let request = card.begin_edit().unwrap();
        assert!(card.to_string().contains("[ Updating Food... ]"));

        card.cancel_edit();
        assert!(card.editor().is_some());

        let outcome = card.finish_edit(request.send(&api).await).unwrap();

        assert!(matches!(outcome, SubmitOutcome::Saved(ref food) if food.name == "Cheeseburger"));
        assert!(card.editor().is_none());
    }

    #[test]
    fn render_shows_deleting_while_busy() {
        let mut card = FoodCard::new(burger());
        card.choose_delete();
        card.begin_delete().unwrap();

        assert!(card.to_string().contains("[ Deleting... ]"));
    }

    #[test]
    fn render_includes_dialog_text() {
        let mut card = FoodCard::new(burger());
        card.choose_delete();

        let text = card.to_string();

        assert!(text.starts_with("Burger  $8.50"));
        assert!(text.contains("Are you sure you want to remove Burger?"));
        assert!(text.contains("[ Delete ]"));
    }
}
