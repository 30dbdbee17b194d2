use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::ActionError;
use crate::models::ContactDraft;

/// Fields of the detail form, in display order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ContactField {
    #[default]
    LastName,
    FirstName,
    Address,
    PhoneNumber,
    Email,
}

impl ContactField {
    pub const ALL: [ContactField; 5] = [
        ContactField::LastName,
        ContactField::FirstName,
        ContactField::Address,
        ContactField::PhoneNumber,
        ContactField::Email,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContactField::LastName => "Last Name",
            ContactField::FirstName => "First Name",
            ContactField::Address => "Address",
            ContactField::PhoneNumber => "Phone Number",
            ContactField::Email => "Email",
        }
    }

    fn required(self) -> bool {
        matches!(self, ContactField::LastName | ContactField::FirstName)
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Option<ContactField> {
        Self::ALL.get(self.position() + 1).copied()
    }

    pub fn previous(self) -> Option<ContactField> {
        self.position().checked_sub(1).map(|idx| Self::ALL[idx])
    }
}

/// Raw text of the five detail fields plus which one has focus.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub last_name: String,
    pub first_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub active: ContactField,
}

impl ContactForm {
    pub fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::LastName => &self.last_name,
            ContactField::FirstName => &self.first_name,
            ContactField::Address => &self.address,
            ContactField::PhoneNumber => &self.phone_number,
            ContactField::Email => &self.email,
        }
    }

    fn value_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::LastName => &mut self.last_name,
            ContactField::FirstName => &mut self.first_name,
            ContactField::Address => &mut self.address,
            ContactField::PhoneNumber => &mut self.phone_number,
            ContactField::Email => &mut self.email,
        }
    }

    pub fn focus(&mut self, field: ContactField) {
        self.active = field;
    }

    /// Append a character to the active field. Control characters are
    /// rejected.
    pub fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    pub fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Overwrite every field with the stored values. Focus is left alone.
    pub fn fill_from(&mut self, draft: &ContactDraft) {
        self.last_name = draft.last_name.clone();
        self.first_name = draft.first_name.clone();
        self.address = draft.address.clone();
        self.phone_number = draft.phone_number.clone();
        self.email = draft.email.clone();
    }

    pub fn clear(&mut self) {
        *self = Self {
            active: self.active,
            ..Self::default()
        };
    }

    /// Trim every field and insist on both names being present.
    pub fn parse_inputs(&self) -> Result<ContactDraft, ActionError> {
        let draft = ContactDraft {
            last_name: self.last_name.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            address: self.address.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            email: self.email.trim().to_string(),
        };
        if draft.last_name.is_empty() || draft.first_name.is_empty() {
            return Err(ActionError::MissingName);
        }
        Ok(draft)
    }

    /// Find filter: the trimmed last-name field, empty or not.
    pub fn search_last_name(&self) -> &str {
        self.last_name.trim()
    }

    /// Render a single `Label: value` line. `focused` is true only when the
    /// form itself holds keyboard focus.
    pub(crate) fn build_line(&self, field: ContactField, focused: bool) -> Line<'static> {
        let value = self.value(field);
        let is_active = focused && self.active == field;

        let display = if value.is_empty() && field.required() {
            "<required>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{:>14}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Column of the cursor for the active field, relative to the line start.
    pub(crate) fn cursor_offset(&self) -> u16 {
        let prefix = 16;
        prefix + self.value(self.active).chars().count() as u16
    }
}
