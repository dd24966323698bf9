use chrono::{DateTime, TimeZone, Utc};
use contactmap_core::db::open_db_in_memory;
use contactmap_core::{
    Contact, ContactPatch, ContactRepository, ContactService, ContactServiceError,
    ContactValidationError, Coordinate, RepoError, SqliteContactRepository,
};
use uuid::Uuid;

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let contact = Contact::new(
        "Ada",
        Some("met at the conference".to_string()),
        Coordinate::new(51.507351, -0.127758),
        Some(at(2024, 3, 1, 9)),
    );
    let id = repo.insert_contact(&contact).unwrap();

    let loaded = repo.get_contact(id).unwrap().unwrap();
    assert_eq!(loaded, contact);
}

#[test]
fn fetch_all_orders_most_recent_first_with_null_timestamps_last() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let undated = Contact::new("undated", None, Coordinate::new(0.0, 0.0), None);
    let old = Contact::new("old", None, Coordinate::new(0.0, 0.0), Some(at(2020, 1, 1, 0)));
    let new = Contact::new("new", None, Coordinate::new(0.0, 0.0), Some(at(2024, 1, 1, 0)));
    for contact in [&undated, &old, &new] {
        repo.insert_contact(contact).unwrap();
    }

    let contacts = repo.fetch_all().unwrap();
    assert_eq!(names(&contacts), vec!["new", "old", "undated"]);
}

#[test]
fn equal_timestamps_keep_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let when = Some(at(2024, 5, 5, 5));
    for name in ["first", "second", "third"] {
        repo.insert_contact(&Contact::new(name, None, Coordinate::new(1.0, 1.0), when))
            .unwrap();
    }

    assert_eq!(
        names(&repo.fetch_all().unwrap()),
        vec!["first", "second", "third"]
    );
}

#[test]
fn insert_rejects_invalid_coordinates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let contact = Contact::new("far north", None, Coordinate::new(91.0, 0.0), None);
    let err = repo.insert_contact(&contact).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ContactValidationError::LatitudeOutOfRange(_))
    ));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn update_patch_touches_only_given_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let contact = Contact::new(
        "Grace",
        Some("navy".to_string()),
        Coordinate::new(38.9, -77.0),
        Some(at(2023, 7, 4, 12)),
    );
    repo.insert_contact(&contact).unwrap();

    repo.update_contact(
        contact.id,
        &ContactPatch {
            name: Some("Grace Hopper".to_string()),
            description: None,
        },
    )
    .unwrap();
    let renamed = repo.get_contact(contact.id).unwrap().unwrap();
    assert_eq!(renamed.name, "Grace Hopper");
    assert_eq!(renamed.description.as_deref(), Some("navy"));
    assert_eq!(renamed.timestamp, contact.timestamp);
    assert_eq!(renamed.coordinate(), contact.coordinate());

    repo.update_contact(
        contact.id,
        &ContactPatch {
            name: None,
            description: Some(None),
        },
    )
    .unwrap();
    let cleared = repo.get_contact(contact.id).unwrap().unwrap();
    assert_eq!(cleared.name, "Grace Hopper");
    assert_eq!(cleared.description, None);
}

#[test]
fn update_and_delete_unknown_id_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let err = repo
        .update_contact(missing, &ContactPatch::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));

    let err = repo.delete_contact(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn batch_delete_all_removes_everything() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    for name in ["a", "b", "c"] {
        repo.insert_contact(&Contact::new(name, None, Coordinate::new(0.0, 0.0), None))
            .unwrap();
    }

    assert_eq!(repo.batch_delete_all().unwrap(), 3);
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn replace_all_is_atomic_when_a_row_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let existing = Contact::new("keep", None, Coordinate::new(0.0, 0.0), None);
    repo.insert_contact(&existing).unwrap();

    // Same id twice violates the uuid UNIQUE constraint on the second insert.
    let duplicate = Contact::new("dup", None, Coordinate::new(1.0, 1.0), None);
    let err = repo
        .replace_all(&[duplicate.clone(), duplicate])
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let remaining = repo.fetch_all().unwrap();
    assert_eq!(remaining, vec![existing]);
}

#[test]
fn service_create_trims_and_stamps_contact() {
    let conn = open_db_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::try_new(&conn).unwrap());

    let before = Utc::now();
    let created = service
        .create_contact(
            "  Linus  ",
            Some("  kernel  ".to_string()),
            Coordinate::new(60.17, 24.94),
            None,
        )
        .unwrap();

    assert_eq!(created.name, "Linus");
    assert_eq!(created.description.as_deref(), Some("kernel"));
    // Storage keeps millisecond precision.
    let stamped = created.timestamp.unwrap();
    assert!(stamped.timestamp_millis() >= before.timestamp_millis());
}

#[test]
fn service_create_rejects_blank_name_and_bad_coordinate() {
    let conn = open_db_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::try_new(&conn).unwrap());

    let err = service
        .create_contact("   ", None, Coordinate::new(0.0, 0.0), None)
        .unwrap_err();
    assert!(matches!(
        err,
        ContactServiceError::Validation(ContactValidationError::EmptyName)
    ));

    let err = service
        .create_contact("Ada", None, Coordinate::new(0.0, 181.0), None)
        .unwrap_err();
    assert!(matches!(
        err,
        ContactServiceError::Validation(ContactValidationError::LongitudeOutOfRange(_))
    ));
    assert!(service.list_contacts().unwrap().is_empty());
}

#[test]
fn service_edit_keeps_coordinate_and_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::try_new(&conn).unwrap());
    let created = service
        .create_contact(
            "Ada",
            Some("first".to_string()),
            Coordinate::new(10.0, 20.0),
            Some(at(2022, 2, 2, 2)),
        )
        .unwrap();

    let edited = service
        .edit_contact(created.id, "Ada L.", Some(" ".to_string()))
        .unwrap();
    assert_eq!(edited.name, "Ada L.");
    assert_eq!(edited.description, None);
    assert_eq!(edited.coordinate(), created.coordinate());
    assert_eq!(edited.timestamp, created.timestamp);

    let err = service.edit_contact(created.id, "", None).unwrap_err();
    assert!(matches!(err, ContactServiceError::Validation(_)));
}

#[test]
fn service_delete_maps_missing_contact() {
    let conn = open_db_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::try_new(&conn).unwrap());
    let created = service
        .create_contact("Ada", None, Coordinate::new(0.0, 0.0), None)
        .unwrap();

    service.delete_contact(created.id).unwrap();
    let err = service.delete_contact(created.id).unwrap_err();
    assert!(matches!(err, ContactServiceError::ContactNotFound(id) if id == created.id));
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

fn names(contacts: &[Contact]) -> Vec<&str> {
    contacts.iter().map(|contact| contact.name.as_str()).collect()
}
