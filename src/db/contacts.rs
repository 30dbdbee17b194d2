use crate::models::{Contact, ContactDraft, ContactEntry};

use super::connection::{Row, Store, StoreError};

/// No ORDER BY: the list shows rows in whatever order the engine yields.
const SELECT_ENTRIES: &str = "SELECT id, last_name, first_name FROM Contact";

/// Exact, case-sensitive match on the last name.
const SELECT_ENTRIES_BY_LAST_NAME: &str =
    "SELECT id, last_name, first_name FROM Contact WHERE last_name = ?1";

const SELECT_CONTACT: &str = "SELECT id, last_name, first_name, address, phone_number, email
     FROM Contact WHERE id = ?1";

const INSERT_CONTACT: &str =
    "INSERT INTO Contact (last_name, first_name, address, phone_number, email)
     VALUES (?1, ?2, ?3, ?4, ?5)";

const UPDATE_CONTACT: &str = "UPDATE Contact
     SET last_name = ?1, first_name = ?2, address = ?3, phone_number = ?4, email = ?5
     WHERE id = ?6";

const DELETE_CONTACT: &str = "DELETE FROM Contact WHERE id = ?1";

/// Every contact as a list entry.
pub fn list_entries(store: &Store) -> Result<Vec<ContactEntry>, StoreError> {
    let result = store.query(SELECT_ENTRIES)?;
    result.rows().map(entry_from_row).collect()
}

/// Entries whose last name equals `last_name` exactly. The value is bound as
/// given, so an empty string only matches rows with an empty last name.
pub fn find_entries_by_last_name(
    store: &Store,
    last_name: &str,
) -> Result<Vec<ContactEntry>, StoreError> {
    let result = store.query_with_params(SELECT_ENTRIES_BY_LAST_NAME, &[last_name])?;
    result.rows().map(entry_from_row).collect()
}

/// Full row for `id`, or `None` when it has disappeared in the meantime.
pub fn fetch_contact(store: &Store, id: i64) -> Result<Option<Contact>, StoreError> {
    // Parameters travel as text; the INTEGER affinity of `id` converts the
    // bound value before comparison.
    let id = id.to_string();
    let result = store.query_with_params(SELECT_CONTACT, &[id.as_str()])?;
    let contact = match result.rows().next() {
        Some(row) => Some(contact_from_row(row)?),
        None => None,
    };
    Ok(contact)
}

/// Insert a new row and return its generated id.
pub fn insert_contact(store: &Store, draft: &ContactDraft) -> Result<i64, StoreError> {
    store.update_with_params(
        INSERT_CONTACT,
        &[
            draft.last_name.as_str(),
            draft.first_name.as_str(),
            draft.address.as_str(),
            draft.phone_number.as_str(),
            draft.email.as_str(),
        ],
    )?;
    store.last_insert_id()
}

/// Overwrite all business fields of row `id`. Returns the affected-row count
/// so the caller can tell "not found" apart from success.
pub fn update_contact(store: &Store, id: i64, draft: &ContactDraft) -> Result<usize, StoreError> {
    let id = id.to_string();
    store.update_with_params(
        UPDATE_CONTACT,
        &[
            draft.last_name.as_str(),
            draft.first_name.as_str(),
            draft.address.as_str(),
            draft.phone_number.as_str(),
            draft.email.as_str(),
            id.as_str(),
        ],
    )
}

pub fn delete_contact(store: &Store, id: i64) -> Result<usize, StoreError> {
    let id = id.to_string();
    store.update_with_params(DELETE_CONTACT, &[id.as_str()])
}

fn entry_from_row(row: Row<'_>) -> Result<ContactEntry, StoreError> {
    Ok(ContactEntry {
        id: required_integer(&row, "id")?,
        last_name: required_text(&row, "last_name")?,
        first_name: required_text(&row, "first_name")?,
    })
}

fn contact_from_row(row: Row<'_>) -> Result<Contact, StoreError> {
    Ok(Contact {
        id: required_integer(&row, "id")?,
        last_name: required_text(&row, "last_name")?,
        first_name: required_text(&row, "first_name")?,
        address: optional_text(&row, "address"),
        phone_number: optional_text(&row, "phone_number"),
        email: optional_text(&row, "email"),
    })
}

fn required_integer(row: &Row<'_>, column: &str) -> Result<i64, StoreError> {
    row.integer(column).ok_or_else(|| StoreError::Column {
        column: column.to_string(),
    })
}

fn required_text(row: &Row<'_>, column: &str) -> Result<String, StoreError> {
    row.text(column)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Column {
            column: column.to_string(),
        })
}

fn optional_text(row: &Row<'_>, column: &str) -> String {
    row.text(column).unwrap_or_default().to_string()
}
