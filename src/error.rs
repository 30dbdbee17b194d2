//! Errors returned by controller transitions. Each one ends up in a modal
//! notice; none of them is retried.

use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Please provide both Last Name and First Name.")]
    MissingName,

    #[error("No contact selected.")]
    NoSelection,

    #[error("Contact not found.")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ActionError {
    /// Validation and lookup misses are expected outcomes; storage failures
    /// are not.
    pub fn is_storage(&self) -> bool {
        matches!(self, ActionError::Store(_))
    }
}
