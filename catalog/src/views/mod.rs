//! View-models for the home page.
//!
//! Each component keeps its own UI state and renders itself as text through
//! `Display`. Data comes from the [`FoodStore`](crate::reducer::FoodStore);
//! forms save through the [`FoodApi`](crate::client::FoodApi).

mod card;
mod layout;
mod list;
mod modal;
mod page;

pub use card::{DELETE_FAILED_FALLBACK, DeleteDialog, FoodCard, StatusClass};
pub use layout::{BRAND, Footer, Header, Hero};
pub use list::{FoodList, INITIAL_VISIBLE, LOAD_MORE_STEP};
pub use modal::Modal;
pub use page::{ActiveModal, EMPTY_MESSAGE, Finished, HomePage, PageError, Pending};
