//! FFI use-case API for the mobile UI shell.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions via FRB.
//! - Translate core errors into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Contact ids cross the boundary as UUID strings.
//! - Timestamps cross the boundary as epoch milliseconds.

use contactmap_core::db::open_db;
use contactmap_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AuthorizationState, Contact, ContactInterchange, ContactService, Coordinate, MapPin,
    RadiusQuery, SqliteContactRepository, StaticLocation, ViewportQuery,
};
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const CONTACT_DB_FILE_NAME: &str = "contactmap.sqlite3";
const CONTACT_DB_PATH_ENV: &str = "CONTACTMAP_DB_PATH";
static CONTACT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat contact view for the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactItem {
    pub contact_id: String,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Epoch milliseconds; `None` for imported records without a usable time.
    pub timestamp_ms: Option<i64>,
}

impl From<&Contact> for ContactItem {
    fn from(contact: &Contact) -> Self {
        Self {
            contact_id: contact.id.to_string(),
            name: contact.name.clone(),
            description: contact.description.clone(),
            latitude: contact.latitude,
            longitude: contact.longitude,
            timestamp_ms: contact.timestamp.map(|value| value.timestamp_millis()),
        }
    }
}

/// Result of a single-contact mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactActionResponse {
    pub ok: bool,
    /// Contact after the mutation; `None` on failure and after delete.
    pub contact: Option<ContactItem>,
    pub message: String,
}

impl ContactActionResponse {
    fn success(message: impl Into<String>, contact: Option<&Contact>) -> Self {
        Self {
            ok: true,
            contact: contact.map(ContactItem::from),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            contact: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactListResponse {
    pub ok: bool,
    /// Most recent first.
    pub items: Vec<ContactItem>,
    pub message: String,
}

/// One map pin with its declutter offset in display points.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPinItem {
    pub contact: ContactItem,
    pub offset_dx: f64,
    pub offset_dy: f64,
}

impl From<&MapPin> for MapPinItem {
    fn from(pin: &MapPin) -> Self {
        Self {
            contact: ContactItem::from(&pin.contact),
            offset_dx: pin.placement.offset.dx,
            offset_dy: pin.placement.offset.dy,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPinsResponse {
    pub ok: bool,
    pub pins: Vec<MapPinItem>,
    pub message: String,
}

impl MapPinsResponse {
    fn from_result(operation: &str, result: Result<Vec<MapPin>, String>) -> Self {
        match result {
            Ok(pins) => Self {
                ok: true,
                message: format!("{} pin(s).", pins.len()),
                pins: pins.iter().map(MapPinItem::from).collect(),
            },
            Err(err) => Self {
                ok: false,
                pins: Vec::new(),
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    /// Interchange document; never a placeholder on failure.
    pub document: Option<String>,
    pub message: String,
}

/// Pre-flight numbers for the "replace N with M" confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPreviewResponse {
    pub ok: bool,
    pub import_count: u64,
    pub existing_count: u64,
    pub defaulted_records: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCommitResponse {
    pub ok: bool,
    pub imported_count: u64,
    pub message: String,
}

/// Records a new contact stamped with the current time.
#[flutter_rust_bridge::frb(sync)]
pub fn contact_create(
    name: String,
    description: Option<String>,
    latitude: f64,
    longitude: f64,
) -> ContactActionResponse {
    let result = with_contact_service(|service| {
        service
            .create_contact(
                name.as_str(),
                description,
                Coordinate::new(latitude, longitude),
                None,
            )
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(contact) => ContactActionResponse::success("Contact created.", Some(&contact)),
        Err(err) => ContactActionResponse::failure(format!("contact_create failed: {err}")),
    }
}

/// Replaces name and description of an existing contact.
#[flutter_rust_bridge::frb(sync)]
pub fn contact_edit(
    contact_id: String,
    name: String,
    description: Option<String>,
) -> ContactActionResponse {
    let result = parse_contact_id(contact_id.as_str()).and_then(|id| {
        with_contact_service(|service| {
            service
                .edit_contact(id, name.as_str(), description)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(contact) => ContactActionResponse::success("Contact updated.", Some(&contact)),
        Err(err) => ContactActionResponse::failure(format!("contact_edit failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn contact_delete(contact_id: String) -> ContactActionResponse {
    let result = parse_contact_id(contact_id.as_str()).and_then(|id| {
        with_contact_service(|service| service.delete_contact(id).map_err(|err| err.to_string()))
    });
    match result {
        Ok(()) => ContactActionResponse::success("Contact deleted.", None),
        Err(err) => ContactActionResponse::failure(format!("contact_delete failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn contacts_list() -> ContactListResponse {
    match with_contact_service(|service| service.list_contacts().map_err(|err| err.to_string())) {
        Ok(contacts) => ContactListResponse {
            ok: true,
            message: format!("{} contact(s).", contacts.len()),
            items: contacts.iter().map(ContactItem::from).collect(),
        },
        Err(err) => ContactListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("contacts_list failed: {err}"),
        },
    }
}

/// Pins inside the visible map rectangle.
///
/// Spans are full widths in degrees, as reported by the map widget.
#[flutter_rust_bridge::frb(sync)]
pub fn map_pins_in_viewport(
    center_latitude: f64,
    center_longitude: f64,
    latitude_span: f64,
    longitude_span: f64,
) -> MapPinsResponse {
    let query = ViewportQuery::rectangle(
        Coordinate::new(center_latitude, center_longitude),
        latitude_span,
        longitude_span,
    );
    MapPinsResponse::from_result(
        "map_pins_in_viewport",
        with_contact_service(|service| {
            service
                .map_pins(Some(&query))
                .map_err(|err| err.to_string())
        }),
    )
}

/// Pins within `radius_meters` of the last known fix.
///
/// # FFI contract
/// - `authorization`: `not_determined|denied|authorized_while_active`.
/// - Missing fix or missing permission yields an empty, successful result.
#[flutter_rust_bridge::frb(sync)]
pub fn map_pins_near(
    current_latitude: Option<f64>,
    current_longitude: Option<f64>,
    authorization: String,
    radius_meters: f64,
) -> MapPinsResponse {
    let authorization = AuthorizationState::from_label(authorization.as_str()).unwrap_or_else(|| {
        warn!("event=map_pins_near module=ffi status=degraded reason=unknown_authorization_label");
        AuthorizationState::NotDetermined
    });
    let location = StaticLocation {
        coordinate: current_latitude
            .zip(current_longitude)
            .map(|(latitude, longitude)| Coordinate::new(latitude, longitude)),
        authorization,
    };
    let query =
        RadiusQuery::around_current_location(&location, radius_meters).map(ViewportQuery::Radius);

    MapPinsResponse::from_result(
        "map_pins_near",
        with_contact_service(|service| {
            service
                .map_pins(query.as_ref())
                .map_err(|err| err.to_string())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn contacts_export() -> ExportResponse {
    match with_interchange(|interchange| interchange.export().map_err(|err| err.to_string())) {
        Ok(document) => ExportResponse {
            ok: true,
            document: Some(document),
            message: "Export ready.".to_string(),
        },
        Err(err) => ExportResponse {
            ok: false,
            document: None,
            message: format!("contacts_export failed: {err}"),
        },
    }
}

/// Parses a candidate document and reports counts; writes nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn contacts_import_preview(document: String) -> ImportPreviewResponse {
    let result = with_interchange(|interchange| {
        interchange
            .preview_import(document.as_str())
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(preview) => ImportPreviewResponse {
            ok: true,
            import_count: preview.import_count as u64,
            existing_count: preview.existing_count as u64,
            defaulted_records: preview.defaulted_records as u64,
            message: format!(
                "Replace {} existing contact(s) with {} imported.",
                preview.existing_count, preview.import_count
            ),
        },
        Err(err) => ImportPreviewResponse {
            ok: false,
            import_count: 0,
            existing_count: 0,
            defaulted_records: 0,
            message: format!("contacts_import_preview failed: {err}"),
        },
    }
}

/// Replaces every stored contact with the document's records.
///
/// Call only after the user confirmed the preview.
#[flutter_rust_bridge::frb(sync)]
pub fn contacts_import_commit(document: String) -> ImportCommitResponse {
    let result = with_interchange(|interchange| {
        interchange
            .commit_import(document.as_str())
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(imported) => ImportCommitResponse {
            ok: true,
            imported_count: imported as u64,
            message: format!("Imported {imported} contact(s)."),
        },
        Err(err) => ImportCommitResponse {
            ok: false,
            imported_count: 0,
            message: format!("contacts_import_commit failed: {err}"),
        },
    }
}

fn parse_contact_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid contact id `{raw}`"))
}

fn resolve_contact_db_path() -> PathBuf {
    CONTACT_DB_PATH
        .get_or_init(|| {
            std::env::var(CONTACT_DB_PATH_ENV)
                .ok()
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(CONTACT_DB_FILE_NAME))
        })
        .clone()
}

fn open_contact_db() -> Result<Connection, String> {
    open_db(resolve_contact_db_path()).map_err(|err| format!("contact DB open failed: {err}"))
}

fn with_contact_service<T>(
    f: impl FnOnce(&ContactService<SqliteContactRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_contact_db()?;
    let repo = SqliteContactRepository::try_new(&conn)
        .map_err(|err| format!("contact repo init failed: {err}"))?;
    f(&ContactService::new(repo))
}

fn with_interchange<T>(
    f: impl FnOnce(&ContactInterchange<SqliteContactRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_contact_db()?;
    let repo = SqliteContactRepository::try_new(&conn)
        .map_err(|err| format!("contact repo init failed: {err}"))?;
    f(&ContactInterchange::new(repo))
}
