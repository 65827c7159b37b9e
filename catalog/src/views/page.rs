//! The home page: search, the featured list and the add-meal modal.

use super::{FoodList, Footer, Header, Hero, Modal};
use crate::client::FoodApi;
use crate::config::DEFAULT_TIMEOUT;
use crate::error::ApiError;
use crate::form::{FoodForm, SubmitOutcome};
use crate::reducer::{FoodAction, FoodStore};
use crate::types::{FoodId, FoodItem};
use foodwagen_runtime::{EffectHandle, StoreError};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Shown when the list is empty and nothing is loading
pub const EMPTY_MESSAGE: &str = "No items available. Try adding some!";

/// Added to the request timeout when waiting for a delete to come back
/// through the store
const DELETE_WAIT_MARGIN: Duration = Duration::from_secs(5);

/// Why a page action could not be performed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PageError {
    /// No visible card at that position
    #[error("No meal #{0} on the page")]
    NoSuchCard(usize),
    /// Edit/Delete need the card's menu open
    #[error("Open the options first: menu {0}")]
    MenuClosed(usize),
    /// A dialog covers the page
    #[error("Finish or cancel the open dialog first")]
    DialogOpen,
}

/// The dialog covering the page
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveModal {
    /// The add-meal form
    Add,
    /// The editor of one card
    Edit(FoodId),
    /// The delete confirmation of one card
    Delete(FoodId),
}

/// A call the page started and has not applied yet. The page can be
/// rendered in between to show the busy state.
#[derive(Debug)]
#[must_use = "pass it to HomePage::finish"]
pub struct Pending(PendingCall);

#[derive(Debug)]
enum PendingCall {
    Search(EffectHandle),
    Save {
        target: ActiveModal,
        task: JoinHandle<Result<FoodItem, ApiError>>,
    },
    Delete {
        id: FoodId,
        task: JoinHandle<Result<FoodAction, StoreError>>,
    },
}

/// What a [`Pending`] call produced once applied
#[derive(Clone, Debug, PartialEq)]
pub enum Finished {
    /// The list was fetched again; `false` when the fetch failed
    Searched(bool),
    /// A form save came back
    Saved(SubmitOutcome),
    /// A delete came back; the alert is set when it failed
    Deleted(Option<String>),
}

/// Page state around the injected store
pub struct HomePage<C>
where
    C: FoodApi + Clone + 'static,
{
    store: FoodStore<C>,
    api: C,
    search_term: String,
    searching: bool,
    list: FoodList,
    add_modal: Modal<FoodForm>,
    active: Option<ActiveModal>,
    delete_wait: Duration,
}

impl<C> HomePage<C>
where
    C: FoodApi + Clone + 'static,
{
    /// A page over `store`; `api` is what forms save through
    #[must_use]
    pub fn new(store: FoodStore<C>, api: C) -> Self {
        Self {
            store,
            api,
            search_term: String::new(),
            searching: false,
            list: FoodList::new(),
            add_modal: Modal::closed(),
            active: None,
            delete_wait: DEFAULT_TIMEOUT + DELETE_WAIT_MARGIN,
        }
    }

    /// Match the per-request timeout of the client behind the store, so a
    /// delete is not given up on while its request may still land
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.delete_wait = timeout + DELETE_WAIT_MARGIN;
        self
    }

    /// How long a delete is waited for
    #[must_use]
    pub const fn delete_wait(&self) -> Duration {
        self.delete_wait
    }

    /// The shared store
    #[must_use]
    pub const fn store(&self) -> &FoodStore<C> {
        &self.store
    }

    /// Cards and pagination
    #[must_use]
    pub const fn list(&self) -> &FoodList {
        &self.list
    }

    /// Text in the search box
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// The open dialog, if any
    #[must_use]
    pub const fn active(&self) -> Option<&ActiveModal> {
        self.active.as_ref()
    }

    /// First load: fetch everything
    pub async fn mount(&mut self) {
        self.fetch(None).await;
    }

    /// Fetch, wait for the result to land, then rebuild the cards.
    /// Returns `true` when the store holds no error afterwards.
    async fn fetch(&mut self, filter: Option<String>) -> bool {
        self.store
            .send(FoodAction::FetchFoods { filter })
            .await
            .wait()
            .await;
        self.sync().await;
        self.store.state(|state| state.error.is_none()).await
    }

    /// Rebuild the cards from the store
    pub async fn sync(&mut self) {
        let foods = self.store.state(|state| state.foods.clone()).await;
        self.list.sync(&foods);

        let orphaned = match &self.active {
            Some(ActiveModal::Edit(id) | ActiveModal::Delete(id)) => self.list.card(id).is_none(),
            Some(ActiveModal::Add) | None => false,
        };
        if orphaned {
            tracing::debug!(active = ?self.active, "Dialog closed with its card");
            self.active = None;
        }
    }

    fn ensure_no_dialog(&self) -> Result<(), PageError> {
        match self.active {
            Some(_) => Err(PageError::DialogOpen),
            None => Ok(()),
        }
    }

    // ========== Search ==========

    /// Start a search by name. A blank term fetches everything.
    ///
    /// # Errors
    ///
    /// [`PageError::DialogOpen`] while a dialog covers the page.
    pub async fn begin_search(&mut self, term: &str) -> Result<Pending, PageError> {
        self.ensure_no_dialog()?;

        self.search_term = term.to_string();
        let trimmed = term.trim();
        let filter = (!trimmed.is_empty()).then(|| trimmed.to_string());

        self.searching = true;
        let handle = self.store.send(FoodAction::FetchFoods { filter }).await;
        Ok(Pending(PendingCall::Search(handle)))
    }

    /// Search and wait for the result. On success the visible count goes
    /// back to its initial value; failures land in the store's error.
    ///
    /// # Errors
    ///
    /// [`PageError::DialogOpen`] while a dialog covers the page.
    pub async fn search(&mut self, term: &str) -> Result<bool, PageError> {
        let pending = self.begin_search(term).await?;
        match self.finish(pending).await {
            Finished::Searched(ok) => Ok(ok),
            _ => Ok(false),
        }
    }

    /// "Load more"; `false` when nothing more can be shown
    pub async fn load_more(&mut self) -> bool {
        let loading = self.store.state(|state| state.loading).await;
        if loading || !self.list.has_more() {
            return false;
        }
        self.list.load_more();
        true
    }

    // ========== Add meal ==========

    /// Open the add-meal modal with an empty form
    ///
    /// # Errors
    ///
    /// [`PageError::DialogOpen`] while another dialog covers the page.
    pub fn open_add(&mut self) -> Result<(), PageError> {
        if self.active == Some(ActiveModal::Add) {
            return Ok(());
        }
        self.ensure_no_dialog()?;
        self.add_modal.open(FoodForm::new());
        self.active = Some(ActiveModal::Add);
        Ok(())
    }

    /// The add-meal form, when open
    #[must_use]
    pub const fn add_form(&self) -> Option<&FoodForm> {
        self.add_modal.content()
    }

    // ========== Cards ==========

    /// Toggle the options menu of the card at a 1-based position
    ///
    /// # Errors
    ///
    /// [`PageError::NoSuchCard`] when no visible card is there,
    /// [`PageError::DialogOpen`] while a dialog covers the page.
    pub fn toggle_menu(&mut self, position: usize) -> Result<(), PageError> {
        self.ensure_no_dialog()?;
        self.card(position)?.toggle_menu();
        Ok(())
    }

    /// "Edit Food" on the card at `position`
    ///
    /// # Errors
    ///
    /// [`PageError`] when a dialog is open, the card is missing or its menu
    /// is closed.
    pub fn choose_edit(&mut self, position: usize) -> Result<(), PageError> {
        self.ensure_no_dialog()?;
        let card = self.card(position)?;
        if !card.menu_open() {
            return Err(PageError::MenuClosed(position));
        }
        let id = card.food().id.clone();
        card.choose_edit();
        self.active = Some(ActiveModal::Edit(id));
        Ok(())
    }

    /// "Delete Food" on the card at `position`
    ///
    /// # Errors
    ///
    /// [`PageError`] when a dialog is open, the card is missing or its menu
    /// is closed.
    pub fn choose_delete(&mut self, position: usize) -> Result<(), PageError> {
        self.ensure_no_dialog()?;
        let card = self.card(position)?;
        if !card.menu_open() {
            return Err(PageError::MenuClosed(position));
        }
        let id = card.food().id.clone();
        card.choose_delete();
        self.active = Some(ActiveModal::Delete(id));
        Ok(())
    }

    fn card(&mut self, position: usize) -> Result<&mut super::FoodCard, PageError> {
        self.list
            .visible_card_mut(position)
            .ok_or(PageError::NoSuchCard(position))
    }

    /// Start the delete confirmed in the open dialog. `None` when no delete
    /// dialog is open or its delete is already running.
    pub fn begin_delete(&mut self) -> Option<Pending> {
        let Some(ActiveModal::Delete(id)) = &self.active else {
            return None;
        };
        let id = id.clone();
        let action = self.list.card_mut(&id)?.begin_delete()?;

        let store = self.store.clone();
        let wait = self.delete_wait;
        let target = id.clone();
        let task = tokio::spawn(async move {
            store
                .send_and_wait_for(
                    action,
                    move |action| {
                        matches!(
                            action,
                            FoodAction::FoodDeleted { id: done }
                            | FoodAction::DeleteFailed { id: done, .. } if *done == target
                        )
                    },
                    wait,
                )
                .await
        });

        Some(Pending(PendingCall::Delete { id, task }))
    }

    /// Confirm the open delete dialog and wait. Returns the alert to show,
    /// if any.
    pub async fn confirm_delete(&mut self) -> Option<String> {
        let pending = self.begin_delete()?;
        match self.finish(pending).await {
            Finished::Deleted(alert) => alert,
            _ => None,
        }
    }

    // ========== Active form ==========

    /// The form currently shown: the add-meal form or the open editor
    pub fn active_form_mut(&mut self) -> Option<&mut FoodForm> {
        match &self.active {
            Some(ActiveModal::Add) => self.add_modal.content_mut(),
            Some(ActiveModal::Edit(id)) => self.list.card_mut(id)?.editor_mut(),
            Some(ActiveModal::Delete(_)) | None => None,
        }
    }

    /// Start saving the form shown. `None` when no form is open or the form
    /// refused to save (its errors say why).
    pub fn begin_submit(&mut self) -> Option<Pending> {
        let target = self.active.clone()?;
        let request = match &target {
            ActiveModal::Add => self.add_modal.content_mut()?.begin_submit()?,
            ActiveModal::Edit(id) => self.list.card_mut(id)?.begin_edit()?,
            ActiveModal::Delete(_) => return None,
        };

        let api = self.api.clone();
        let task = tokio::spawn(async move { request.send(&api).await });
        Some(Pending(PendingCall::Save { target, task }))
    }

    /// Save the form shown and wait. Saving closes the dialog and re-fetches
    /// the list. `None` when no form is open.
    pub async fn submit(&mut self) -> Option<SubmitOutcome> {
        if self.active_form_mut().is_none() {
            return None;
        }
        let Some(pending) = self.begin_submit() else {
            return Some(SubmitOutcome::Invalid);
        };
        match self.finish(pending).await {
            Finished::Saved(outcome) => Some(outcome),
            _ => None,
        }
    }

    // ========== Finishing ==========

    /// Wait for a started call and apply its answer
    pub async fn finish(&mut self, pending: Pending) -> Finished {
        match pending.0 {
            PendingCall::Search(mut handle) => {
                handle.wait().await;
                self.sync().await;
                let ok = self.store.state(|state| state.error.is_none()).await;
                if ok {
                    self.list.reset_visible();
                } else {
                    tracing::debug!(term = self.search_term.trim(), "Search failed");
                }
                self.searching = false;
                Finished::Searched(ok)
            },
            PendingCall::Save { target, task } => {
                let result = task.await.unwrap_or_else(|error| {
                    tracing::warn!(%error, "Save task ended without an answer");
                    Err(ApiError::Request(error.to_string()))
                });
                Finished::Saved(self.finish_save(&target, result).await)
            },
            PendingCall::Delete { id, task } => {
                let answer = task.await;
                let alert = match self.list.card_mut(&id) {
                    Some(card) => match answer {
                        Ok(Ok(outcome)) => card.finish_delete(&outcome),
                        Ok(Err(error)) => Some(card.abandon_delete(&error.to_string())),
                        Err(error) => Some(card.abandon_delete(&error.to_string())),
                    },
                    None => None,
                };
                if alert.is_none() {
                    self.active = None;
                }
                self.sync().await;
                Finished::Deleted(alert)
            },
        }
    }

    async fn finish_save(
        &mut self,
        target: &ActiveModal,
        result: Result<FoodItem, ApiError>,
    ) -> SubmitOutcome {
        let outcome = match target {
            ActiveModal::Add => match self.add_modal.content_mut() {
                Some(form) => form.finish_submit(result),
                None => FoodForm::new().finish_submit(result),
            },
            ActiveModal::Edit(id) => self
                .list
                .card_mut(id)
                .and_then(|card| card.finish_edit(result.clone()))
                .unwrap_or_else(|| FoodForm::new().finish_submit(result)),
            ActiveModal::Delete(_) => FoodForm::new().finish_submit(result),
        };

        if matches!(outcome, SubmitOutcome::Saved(_)) {
            if *target == ActiveModal::Add {
                self.add_modal.close();
            }
            self.active = None;
            self.fetch(None).await;
        }
        outcome
    }

    /// Close the open dialog. Returns `false` when none is open; a dialog
    /// whose call is in flight stays open.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.clone() else {
            return false;
        };

        let closed = match &active {
            ActiveModal::Add => {
                if self.add_form().is_some_and(FoodForm::is_submitting) {
                    false
                } else {
                    self.add_modal.close();
                    true
                }
            },
            ActiveModal::Edit(id) => self.list.card_mut(id).is_none_or(|card| {
                card.cancel_edit();
                card.editor().is_none()
            }),
            ActiveModal::Delete(id) => self.list.card_mut(id).is_none_or(|card| {
                card.cancel_delete();
                card.delete_dialog().is_none()
            }),
        };
        if closed {
            self.active = None;
        }
        true
    }

    /// Render the whole page as text
    pub async fn render(&self) -> String {
        let (loading, error) = self
            .store
            .state(|state| (state.loading, state.error.clone()))
            .await;

        PageView {
            page: self,
            loading,
            error: error.as_deref(),
        }
        .to_string()
    }
}

struct PageView<'a, C>
where
    C: FoodApi + Clone + 'static,
{
    page: &'a HomePage<C>,
    loading: bool,
    error: Option<&'a str>,
}

impl<C> fmt::Display for PageView<'_, C>
where
    C: FoodApi + Clone + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.page;

        writeln!(f, "{}", Header)?;
        writeln!(
            f,
            "{}",
            Hero {
                search_term: &page.search_term,
                searching: page.searching,
                disabled: self.loading || page.searching,
            }
        )?;

        writeln!(f, "--- Featured Meals ---                     [ Add Meal ]")?;
        if self.loading {
            writeln!(f, "Loading meals...")?;
        }
        if let Some(error) = self.error {
            writeln!(f, "! {error}")?;
        }
        if !self.loading && page.list.is_empty() {
            writeln!(f, "{EMPTY_MESSAGE}")?;
        }
        for (index, card) in page.list.visible().iter().enumerate() {
            writeln!(f, "#{} {card}", index + 1)?;
        }
        if page.list.has_more() && !self.loading {
            writeln!(f, "[ Load more › ]")?;
        }

        if let Some(form) = page.add_form() {
            writeln!(f, "\n--- Add Meal ---\n{form}")?;
        }

        write!(f, "\n{}", Footer)
    }
}
