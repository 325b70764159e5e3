//! Observable browser state.
//!
//! `ViewModel` is a plain value with a reducer (`apply`); `ViewModelStore` shares
//! it behind one lock and tells subscribers what changed. Resets bump the epoch
//! so that results of loads started before the reset can be recognised and
//! dropped.

pub mod action;
pub mod state;
pub mod store;

pub use action::{Action, Change};
pub use state::ViewModel;
pub use store::{SubscriptionId, ViewModelStore};
