//! Ratatui front-end: a contact list on the left, the detail form in the
//! middle, and the action buttons along the bottom. The state machine lives
//! in `controller` so it can be driven without a terminal.

mod app;
mod controller;
mod forms;
mod helpers;
mod terminal;

pub use app::{Action, App};
pub use controller::{next_index, previous_index, ContactController};
pub use forms::{ContactField, ContactForm};
pub use terminal::run_app;
