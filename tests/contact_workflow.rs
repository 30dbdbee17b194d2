use contact_manager::db::{
    fetch_contact, find_entries_by_last_name, insert_contact, list_entries, update_contact,
};
use contact_manager::ui::ContactField;
use contact_manager::{ActionError, ContactController, ContactDraft, Store, StoreError};
use tempfile::TempDir;

fn temp_store() -> (Store, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("contacts.sqlite")).unwrap();
    (store, dir)
}

fn draft(fields: [&str; 5]) -> ContactDraft {
    let [last_name, first_name, address, phone_number, email] = fields.map(str::to_string);
    ContactDraft {
        last_name,
        first_name,
        address,
        phone_number,
        email,
    }
}

fn fill_form(controller: &mut ContactController, fields: [&str; 5]) {
    let form = controller.form_mut();
    form.clear();
    for (field, value) in ContactField::ALL.into_iter().zip(fields) {
        form.focus(field);
        value.chars().for_each(|ch| {
            form.push_char(ch);
        });
    }
}

fn labels(controller: &ContactController) -> Vec<String> {
    controller.entries().iter().map(ToString::to_string).collect()
}

#[test]
fn reopening_the_same_file_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("contacts.sqlite");

    let mut first = Store::open(&path).unwrap();
    insert_contact(&first, &draft(["Doe", "Jane", "", "", ""])).unwrap();
    first.close().unwrap();

    let second = Store::open(&path).unwrap();
    let tables = second
        .query("SELECT name FROM sqlite_master WHERE type = 'table' AND lower(name) = 'contact'")
        .unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(list_entries(&second).unwrap().len(), 1);
}

#[test]
fn second_handle_on_open_file_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.sqlite");
    let mut owner = Store::open(&path).unwrap();
    insert_contact(&owner, &draft(["Doe", "Jane", "", "", ""])).unwrap();

    let err = Store::open(&path).err().unwrap();
    assert!(matches!(err, StoreError::Locked { .. }));
    assert_eq!(list_entries(&owner).unwrap().len(), 1);

    owner.close().unwrap();
    let reopened = Store::open(&path).unwrap();
    assert_eq!(list_entries(&reopened).unwrap().len(), 1);
}

#[test]
fn existing_table_in_other_case_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.sqlite");
    drop(store_with_upper_case_table(&path));
    let store = Store::open(&path).unwrap();
    let rows = store.query("SELECT last_name FROM CONTACT").unwrap();
    assert_eq!(rows.len(), 1);
}

/// Recreate the table under an upper-case name using the raw primitives.
fn store_with_upper_case_table(path: &std::path::Path) -> Store {
    let store = Store::open(path).unwrap();
    store.update("DROP TABLE Contact").unwrap();
    store
        .update(
            "CREATE TABLE CONTACT (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                last_name TEXT NOT NULL,
                first_name TEXT NOT NULL,
                address TEXT,
                phone_number TEXT,
                email TEXT
            )",
        )
        .unwrap();
    store
        .update("INSERT INTO CONTACT (last_name, first_name) VALUES ('Upper', 'Case')")
        .unwrap();
    store
}

#[test]
fn round_trip_returns_inserted_values() {
    let (store, _dir) = temp_store();
    let new = draft(["Doe", "Jane", "1 Main St", "555-1111", "jane@x.com"]);
    let id = insert_contact(&store, &new).unwrap();

    let entries = find_entries_by_last_name(&store, "Doe").unwrap();
    let entry = entries.iter().find(|e| e.first_name == "Jane").unwrap();
    assert_eq!(entry.id, id);
    let contact = fetch_contact(&store, entry.id).unwrap().unwrap();
    assert_eq!(contact.to_draft(), new);
}

#[test]
fn validation_blocks_add_and_update() {
    let (store, _dir) = temp_store();
    let mut controller = ContactController::new();
    fill_form(&mut controller, ["Doe", "Jane", "", "", ""]);
    controller.add(&store).unwrap();

    fill_form(&mut controller, ["", "Jane", "changed", "", ""]);
    assert!(matches!(controller.add(&store), Err(ActionError::MissingName)));
    assert!(matches!(controller.update(&store), Err(ActionError::MissingName)));

    fill_form(&mut controller, ["Doe", "", "changed", "", ""]);
    assert!(matches!(controller.update(&store), Err(ActionError::MissingName)));

    let entries = list_entries(&store).unwrap();
    assert_eq!(entries.len(), 1);
    let stored = fetch_contact(&store, entries[0].id).unwrap().unwrap();
    assert_eq!(stored.address, "");
}

#[test]
fn navigation_wraps_over_displayed_list() {
    let (store, _dir) = temp_store();
    for last in ["A", "B", "C", "D"] {
        insert_contact(&store, &draft([last, "X", "", "", ""])).unwrap();
    }
    let mut controller = ContactController::new();
    controller.load(&store).unwrap();

    controller.select(&store, 3).unwrap();
    controller.next(&store).unwrap();
    assert_eq!(controller.selected(), Some(0));
    assert_eq!(controller.form().last_name, "A");

    controller.previous(&store).unwrap();
    assert_eq!(controller.selected(), Some(3));
    assert_eq!(controller.form().last_name, "D");
}

#[test]
fn update_with_no_matching_row_changes_nothing() {
    let (store, _dir) = temp_store();
    let keep = draft(["Doe", "Jane", "1 Main St", "555-1111", "jane@x.com"]);
    let id = insert_contact(&store, &keep).unwrap();

    let affected = update_contact(&store, id + 1, &draft(["Ghost", "Gus", "", "", ""])).unwrap();
    assert_eq!(affected, 0);
    assert_eq!(fetch_contact(&store, id).unwrap().unwrap().to_draft(), keep);

    let mut controller = ContactController::new();
    controller.load(&store).unwrap();
    controller.select(&store, 0).unwrap();
    store
        .update_with_params("DELETE FROM Contact WHERE last_name = ?", &["Doe"])
        .unwrap();
    assert!(matches!(controller.update(&store), Err(ActionError::NotFound)));
}

#[test]
fn find_matches_last_name_exactly() {
    let (store, _dir) = temp_store();
    for (last, first) in [
        ("Smith", "Ann"),
        ("Smithson", "Sam"),
        ("SMITH", "Loud"),
        ("Jones", "Jo"),
        ("Smith", "Bob"),
    ] {
        insert_contact(&store, &draft([last, first, "", "", ""])).unwrap();
    }

    let mut controller = ContactController::new();
    fill_form(&mut controller, ["Smith", "", "", "", ""]);
    assert_eq!(controller.find(&store).unwrap(), 2);
    assert_eq!(labels(&controller), ["Smith, Ann", "Smith, Bob"]);
}

#[test]
fn add_list_select_delete_scenario() {
    let (store, _dir) = temp_store();
    let mut controller = ContactController::new();

    fill_form(
        &mut controller,
        ["Doe", "Jane", "1 Main St", "555-1111", "jane@x.com"],
    );
    controller.add(&store).unwrap();

    controller.load(&store).unwrap();
    let idx = labels(&controller)
        .iter()
        .position(|label| label == "Doe, Jane")
        .unwrap();

    controller.clear_form();
    controller.select(&store, idx).unwrap();
    let form = controller.form();
    assert_eq!(form.last_name, "Doe");
    assert_eq!(form.first_name, "Jane");
    assert_eq!(form.address, "1 Main St");
    assert_eq!(form.phone_number, "555-1111");
    assert_eq!(form.email, "jane@x.com");

    controller.delete(&store).unwrap();
    controller.load(&store).unwrap();
    assert!(!labels(&controller).contains(&"Doe, Jane".to_string()));
}

#[test]
fn duplicate_names_stay_distinct_by_id() {
    let (store, _dir) = temp_store();
    insert_contact(&store, &draft(["Doe", "Jane", "first", "", ""])).unwrap();
    insert_contact(&store, &draft(["Doe", "Jane", "second", "", ""])).unwrap();

    let mut controller = ContactController::new();
    controller.load(&store).unwrap();
    controller.select(&store, 1).unwrap();
    assert_eq!(controller.form().address, "second");

    controller.delete(&store).unwrap();
    let remaining = list_entries(&store).unwrap();
    assert_eq!(remaining.len(), 1);
    let survivor = fetch_contact(&store, remaining[0].id).unwrap().unwrap();
    assert_eq!(survivor.address, "first");
}

#[test]
fn closed_store_refuses_work() {
    let (mut store, _dir) = temp_store();
    store.close().unwrap();
    store.close().unwrap();

    let mut controller = ContactController::new();
    let err = controller.load(&store).unwrap_err();
    assert!(matches!(err, ActionError::Store(StoreError::Closed)));
}

#[test]
fn unopenable_path_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file in the way").unwrap();

    let err = Store::open(&blocker.join("contacts.sqlite")).err().unwrap();
    assert!(matches!(err, StoreError::DataDir { .. }));
}
