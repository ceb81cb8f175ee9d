//! Kairos UI: egui rendering for the kiosk screens and the admin panels.
//!
//! Panels never call the controller directly. They read `UiState` and hand
//! back a `UiAction` for the app layer to dispatch.

pub mod action;
pub mod admin;
pub mod panels;
pub mod state;
pub mod theme;


pub use action::{AdminAction, DictationTarget, UiAction};
pub use admin::{AdminState, AdminTab};
pub use state::UiState;
