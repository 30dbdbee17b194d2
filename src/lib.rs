//! Core library surface for the contact manager TUI.
//!
//! The binary only wires these pieces together; tests drive the storage layer
//! and the controller directly.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

pub use config::AppPaths;
pub use db::{Store, StoreError};
pub use error::ActionError;
pub use models::{Contact, ContactDraft, ContactEntry};
pub use ui::{run_app, App, ContactController};
