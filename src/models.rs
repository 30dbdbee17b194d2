//! Domain models that mirror the `Contact` table and get passed throughout the
//! TUI. They stay light-weight data holders so the storage and presentation
//! layers can own the behavior.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A fully hydrated contact row.
pub struct Contact {
    /// Generated primary key. The list selection carries it so update and
    /// delete never have to re-derive the row from its displayed name.
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

impl Contact {
    /// Drop the id, leaving the editable business fields.
    pub fn to_draft(&self) -> ContactDraft {
        ContactDraft {
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            address: self.address.clone(),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Validated form input ready to be written. Both name fields are non-empty
/// once a draft comes out of `ContactForm::parse_inputs`.
pub struct ContactDraft {
    pub last_name: String,
    pub first_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One line of the contact list.
pub struct ContactEntry {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
}

impl fmt::Display for ContactEntry {
    /// Render the `last, first` label shown in the list pane.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}
