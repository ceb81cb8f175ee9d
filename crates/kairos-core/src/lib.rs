//! Kairos core: everything the kiosk does that does not touch the browser.

pub mod catalog;
pub mod controller;
pub mod dashboard;
pub mod envelope;
pub mod event_bus;
pub mod history;
pub mod learning;
pub mod ports;
pub mod render;
pub mod reporting;
pub mod settings;
pub mod speech;
pub mod validation;

#[cfg(test)]
mod tests;
