//! Client-side paginated list of cards.
//!
//! The whole fetched list is held; only a growing prefix is shown.

use super::FoodCard;
use crate::types::{FoodId, FoodItem};
use std::collections::HashMap;

/// Cards shown before any "load more"
pub const INITIAL_VISIBLE: usize = 8;

/// Cards added per "load more"
pub const LOAD_MORE_STEP: usize = 4;

/// Cards for the current store list plus the visible prefix length
#[derive(Clone, Debug, PartialEq)]
pub struct FoodList {
    cards: Vec<FoodCard>,
    visible_count: usize,
}

impl FoodList {
    /// Empty list showing the initial prefix
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cards: Vec::new(),
            visible_count: INITIAL_VISIBLE,
        }
    }

    /// Rebuild the cards from `foods` in order. Cards whose id is still
    /// present keep their menu and dialog state.
    pub fn sync(&mut self, foods: &[FoodItem]) {
        let mut previous: HashMap<FoodId, FoodCard> = self
            .cards
            .drain(..)
            .map(|card| (card.food().id.clone(), card))
            .collect();

        self.cards = foods
            .iter()
            .map(|food| match previous.remove(&food.id) {
                Some(mut card) => {
                    card.refresh(food.clone());
                    card
                },
                None => FoodCard::new(food.clone()),
            })
            .collect();
    }

    /// Number of cards in the full list
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the full list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Length of the visible prefix requested
    #[must_use]
    pub const fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// The visible prefix
    #[must_use]
    pub fn visible(&self) -> &[FoodCard] {
        &self.cards[..self.visible_count.min(self.cards.len())]
    }

    /// Cards beyond the visible prefix exist
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.visible_count < self.cards.len()
    }

    /// Show [`LOAD_MORE_STEP`] more cards
    pub fn load_more(&mut self) {
        self.visible_count += LOAD_MORE_STEP;
    }

    /// Back to [`INITIAL_VISIBLE`]
    pub fn reset_visible(&mut self) {
        self.visible_count = INITIAL_VISIBLE;
    }

    /// Visible card at a 1-based position
    pub fn visible_card_mut(&mut self, position: usize) -> Option<&mut FoodCard> {
        let index = position.checked_sub(1)?;
        if index >= self.visible_count {
            return None;
        }
        self.cards.get_mut(index)
    }

    /// Card showing the item `id`, visible or not
    #[must_use]
    pub fn card(&self, id: &FoodId) -> Option<&FoodCard> {
        self.cards.iter().find(|card| card.food().id == *id)
    }

    /// Card showing the item `id`, mutably
    pub fn card_mut(&mut self, id: &FoodId) -> Option<&mut FoodCard> {
        self.cards.iter_mut().find(|card| card.food().id == *id)
    }
}

impl Default for FoodList {
    fn default() -> Self {
        Self::new()
    }
}
