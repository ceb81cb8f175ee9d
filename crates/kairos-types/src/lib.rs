pub mod api;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod event;
pub mod history;
pub mod learning;
pub mod message;
pub mod patient;
pub mod product;
pub mod session;
pub mod settings;
pub mod timestamp;
pub mod usage;


pub use error::{CatalogError, KioskError};
pub type Result<T> = std::result::Result<T, KioskError>;
