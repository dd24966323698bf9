//! Contact repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the create/read/update/delete/batch-delete store used by core.
//! - Own the destructive whole-collection replace used by import.
//!
//! # Invariants
//! - `fetch_all` order is `timestamp DESC`, null timestamps last, then
//!   insertion order.
//! - `replace_all` deletes every row and inserts the new rows in one
//!   transaction; either the whole replace commits or nothing does.
//! - Write paths reject invalid coordinates. Names are not checked here
//!   because imports may carry defaulted empty names.

use crate::db::DbError;
use crate::model::contact::{Contact, ContactId, ContactValidationError, Coordinate};
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

const CONTACT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    latitude,
    longitude,
    timestamp
FROM contacts";

const CONTACT_INSERT_SQL: &str = "INSERT INTO contacts (
    uuid,
    name,
    description,
    latitude,
    longitude,
    timestamp
) VALUES (?1, ?2, ?3, ?4, ?5, ?6);";

const REQUIRED_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "description",
    "latitude",
    "longitude",
    "timestamp",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    NotFound(ContactId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Partial update for the editable contact fields.
///
/// Coordinates and timestamp are immutable after creation and therefore
/// not representable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    /// `Some` replaces the name.
    pub name: Option<String>,
    /// `Some(None)` clears the description, `Some(Some(_))` replaces it.
    pub description: Option<Option<String>>,
}

/// Row counts reported by a whole-collection replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub deleted: usize,
    pub inserted: usize,
}

/// Contact store contract.
pub trait ContactRepository {
    /// Returns every contact, most recent timestamp first.
    fn fetch_all(&self) -> RepoResult<Vec<Contact>>;
    fn count(&self) -> RepoResult<usize>;
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    fn insert_contact(&self, contact: &Contact) -> RepoResult<ContactId>;
    fn update_contact(&self, id: ContactId, patch: &ContactPatch) -> RepoResult<()>;
    fn delete_contact(&self, id: ContactId) -> RepoResult<()>;
    /// Deletes every contact in one statement and returns the row count.
    fn batch_delete_all(&self) -> RepoResult<usize>;
    /// Deletes every contact, then inserts `contacts` in slice order, and
    /// commits once.
    fn replace_all(&self, contacts: &[Contact]) -> RepoResult<ReplaceOutcome>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Fails when the `contacts` table or one of its columns is missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_contact_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn fetch_all(&self) -> RepoResult<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL}
             ORDER BY timestamp IS NULL ASC, timestamp DESC, seq ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }

    fn count(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative contact count {count}")))
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }
        Ok(None)
    }

    fn insert_contact(&self, contact: &Contact) -> RepoResult<ContactId> {
        contact.coordinate().validate()?;
        insert_row(self.conn, contact)?;
        Ok(contact.id)
    }

    fn update_contact(&self, id: ContactId, patch: &ContactPatch) -> RepoResult<()> {
        let (description_set, description) = match &patch.description {
            Some(value) => (1_i64, value.as_deref()),
            None => (0_i64, None),
        };

        let changed = self.conn.execute(
            "UPDATE contacts
             SET
                name = COALESCE(?2, name),
                description = CASE WHEN ?3 = 1 THEN ?4 ELSE description END,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                patch.name.as_deref(),
                description_set,
                description,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn batch_delete_all(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM contacts;", [])?)
    }

    fn replace_all(&self, contacts: &[Contact]) -> RepoResult<ReplaceOutcome> {
        for contact in contacts {
            contact.coordinate().validate()?;
        }

        let started_at = Instant::now();
        let result = (|| -> RepoResult<ReplaceOutcome> {
            let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
            let deleted = tx.execute("DELETE FROM contacts;", [])?;
            for contact in contacts {
                insert_row(&tx, contact)?;
            }
            tx.commit()?;
            Ok(ReplaceOutcome {
                deleted,
                inserted: contacts.len(),
            })
        })();

        match &result {
            Ok(outcome) => info!(
                "event=contacts_replace module=repo status=ok deleted={} inserted={} duration_ms={}",
                outcome.deleted,
                outcome.inserted,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=contacts_replace module=repo status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

fn insert_row(conn: &Connection, contact: &Contact) -> RepoResult<()> {
    let mut stmt = conn.prepare_cached(CONTACT_INSERT_SQL)?;
    stmt.execute(params![
        contact.id.to_string(),
        contact.name.as_str(),
        contact.description.as_deref(),
        contact.latitude,
        contact.longitude,
        contact.timestamp.map(|value| value.timestamp_millis()),
    ])?;
    Ok(())
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in contacts.uuid"))
    })?;

    let timestamp = match row.get::<_, Option<i64>>("timestamp")? {
        Some(millis) => Some(DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(
            || {
                RepoError::InvalidData(format!(
                    "timestamp `{millis}` out of range in contacts.timestamp"
                ))
            },
        )?),
        None => None,
    };

    let coordinate = Coordinate::new(row.get("latitude")?, row.get("longitude")?);
    let contact = Contact::with_id(
        id,
        row.get::<_, String>("name")?,
        row.get("description")?,
        coordinate,
        timestamp,
    );
    contact.coordinate().validate()?;
    Ok(contact)
}

fn ensure_contact_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "contacts")? {
        return Err(RepoError::MissingRequiredTable("contacts"));
    }
    for &column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "contacts", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "contacts",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get("name")?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
