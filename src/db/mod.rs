//! Persistence module split across logical submodules.

mod connection;
mod contacts;

pub use connection::{ResultSet, Row, Store, StoreError, CONTACT_TABLE};
pub use contacts::{
    delete_contact, fetch_contact, find_entries_by_last_name, insert_contact, list_entries,
    update_contact,
};
