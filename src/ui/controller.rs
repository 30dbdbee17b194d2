//! Display-independent state machine behind the contact window: the list
//! entries, which one is selected, and the five detail fields. Every
//! transition receives the store explicitly and either succeeds or hands an
//! `ActionError` back to the front-end, leaving prior state untouched where
//! the action aborted early.

use tracing::{debug, info};

use crate::db::{
    delete_contact, fetch_contact, find_entries_by_last_name, insert_contact, list_entries,
    update_contact, Store,
};
use crate::error::ActionError;
use crate::models::ContactEntry;

use super::forms::ContactForm;

/// Index reached by "Next": one down, wrapping from the last entry to the
/// first. With nothing selected the first entry is chosen.
pub fn next_index(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match selected {
        Some(idx) if idx + 1 < len => Some(idx + 1),
        _ => Some(0),
    }
}

/// Index reached by "Previous": one up, wrapping from the first entry to the
/// last. With nothing selected this does nothing.
pub fn previous_index(selected: Option<usize>, len: usize) -> Option<usize> {
    match selected {
        _ if len == 0 => None,
        Some(0) => Some(len - 1),
        Some(idx) => Some(idx.min(len) - 1),
        None => None,
    }
}

#[derive(Debug, Default)]
pub struct ContactController {
    entries: Vec<ContactEntry>,
    selected: Option<usize>,
    form: ContactForm,
    filter: Option<String>,
}

impl ContactController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ContactEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&ContactEntry> {
        self.selected.and_then(|idx| self.entries.get(idx))
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ContactForm {
        &mut self.form
    }

    /// Last name of the active Find, if the list is currently filtered.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Replace the list with every stored contact. The selection follows
    /// the previously selected id when it is still present.
    pub fn load(&mut self, store: &Store) -> Result<(), ActionError> {
        let entries = list_entries(store)?;
        let keep = self.selected_entry().map(|entry| entry.id);
        self.replace_entries(entries, keep);
        self.filter = None;
        debug!(count = self.entries.len(), "contact list loaded");
        Ok(())
    }

    /// Select entry `index` and pull its full row into the form. A row that
    /// vanished in the meantime leaves the fields as they were. A failed
    /// lookup keeps both the old selection and the form.
    pub fn select(&mut self, store: &Store, index: usize) -> Result<(), ActionError> {
        let Some(entry) = self.entries.get(index) else {
            return Ok(());
        };
        let id = entry.id;

        let contact = fetch_contact(store, id)?;
        self.selected = Some(index);
        match contact {
            Some(contact) => self.form.fill_from(&contact.to_draft()),
            None => debug!(id, "selected contact no longer exists"),
        }
        Ok(())
    }

    /// Validate the form, insert it, reload, and select the new row.
    pub fn add(&mut self, store: &Store) -> Result<ContactEntry, ActionError> {
        let draft = self.form.parse_inputs()?;
        let id = insert_contact(store, &draft)?;
        info!(id, "contact added");

        let entries = list_entries(store)?;
        self.replace_entries(entries, Some(id));
        self.filter = None;
        Ok(ContactEntry {
            id,
            last_name: draft.last_name,
            first_name: draft.first_name,
        })
    }

    /// Overwrite the selected row with the form contents. When the row is
    /// gone the list is reloaded before `NotFound` comes back.
    pub fn update(&mut self, store: &Store) -> Result<ContactEntry, ActionError> {
        let draft = self.form.parse_inputs()?;
        let id = self.selected_entry().ok_or(ActionError::NoSelection)?.id;

        if update_contact(store, id, &draft)? == 0 {
            self.load(store)?;
            return Err(ActionError::NotFound);
        }
        info!(id, "contact updated");
        self.load(store)?;
        Ok(ContactEntry {
            id,
            last_name: draft.last_name,
            first_name: draft.first_name,
        })
    }

    /// Remove the selected row and reload the full list, also when the row
    /// had already disappeared.
    pub fn delete(&mut self, store: &Store) -> Result<ContactEntry, ActionError> {
        let entry = self
            .selected_entry()
            .cloned()
            .ok_or(ActionError::NoSelection)?;

        if delete_contact(store, entry.id)? == 0 {
            self.load(store)?;
            return Err(ActionError::NotFound);
        }
        info!(id = entry.id, "contact deleted");
        self.selected = None;
        self.load(store)?;
        Ok(entry)
    }

    /// Show only rows whose last name equals the last-name field exactly.
    /// Returns the number of matches.
    pub fn find(&mut self, store: &Store) -> Result<usize, ActionError> {
        let last_name = self.form.search_last_name().to_string();
        let entries = find_entries_by_last_name(store, &last_name)?;
        self.entries = entries;
        self.selected = None;
        debug!(last_name = %last_name, matches = self.entries.len(), "find");
        self.filter = Some(last_name);
        Ok(self.entries.len())
    }

    pub fn next(&mut self, store: &Store) -> Result<(), ActionError> {
        match next_index(self.selected, self.entries.len()) {
            Some(idx) => {
                debug!(index = idx, "navigate next");
                self.select(store, idx)
            }
            None => Ok(()),
        }
    }

    pub fn previous(&mut self, store: &Store) -> Result<(), ActionError> {
        match previous_index(self.selected, self.entries.len()) {
            Some(idx) => {
                debug!(index = idx, "navigate previous");
                self.select(store, idx)
            }
            None => Ok(()),
        }
    }

    /// Move the selection by `offset` without wrapping; used by the arrow
    /// keys inside the list. With nothing selected the first entry is taken.
    pub fn move_selection(&mut self, store: &Store, offset: isize) -> Result<(), ActionError> {
        if self.entries.is_empty() {
            return Ok(());
        }
        let last = self.entries.len() as isize - 1;
        let target = match self.selected {
            Some(idx) => (idx as isize + offset).clamp(0, last),
            None => 0,
        };
        if Some(target as usize) == self.selected {
            return Ok(());
        }
        self.select(store, target as usize)
    }

    pub fn clear_form(&mut self) {
        self.form.clear();
    }

    fn replace_entries(&mut self, entries: Vec<ContactEntry>, focus_id: Option<i64>) {
        self.entries = entries;
        self.selected =
            focus_id.and_then(|id| self.entries.iter().position(|entry| entry.id == id));
    }
}
