//! Contact use-case service.
//!
//! # Responsibility
//! - Provide create/edit/delete/list entry points for UI callers.
//! - Answer map and "near me" queries over a fresh store snapshot.
//!
//! # Invariants
//! - Created and edited contacts always have a non-blank, trimmed name.
//! - Edits touch name/description only.
//! - Service APIs never bypass repository validation.

use crate::layout::overlap::{layout_pins, LayoutConfig, PinPlacement};
use crate::location::LocationSource;
use crate::model::contact::{
    normalize_description, Contact, ContactId, ContactValidationError, Coordinate,
};
use crate::repo::contact_repo::{ContactPatch, ContactRepository, RepoError, RepoResult};
use crate::spatial::indexer::{visible_set, visible_set_for};
use crate::spatial::query::{RadiusQuery, ViewportQuery};
use chrono::{DateTime, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for contact use-cases.
#[derive(Debug)]
pub enum ContactServiceError {
    Validation(ContactValidationError),
    ContactNotFound(ContactId),
    Repo(RepoError),
    /// Write succeeded but read-back did not find the row.
    InconsistentState(&'static str),
}

impl Display for ContactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ContactNotFound(id) => write!(f, "contact not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent contact state: {details}"),
        }
    }
}

impl Error for ContactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContactValidationError> for ContactServiceError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ContactServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ContactNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Contact with its pin offset, in visible-set order.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPin {
    pub contact: Contact,
    pub placement: PinPlacement,
}

/// Contact service facade over repository implementations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
    layout: LayoutConfig,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_layout(repo, LayoutConfig::default())
    }

    pub fn with_layout(repo: R, layout: LayoutConfig) -> Self {
        Self { repo, layout }
    }

    /// Records a new person-met event.
    ///
    /// `timestamp` defaults to now.
    pub fn create_contact(
        &self,
        name: &str,
        description: Option<String>,
        coordinate: Coordinate,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Contact, ContactServiceError> {
        let contact = Contact::new(
            name.trim(),
            description.map(|value| value.trim().to_string()),
            coordinate,
            Some(timestamp.unwrap_or_else(Utc::now)),
        );
        contact.validate()?;

        let id = self.repo.insert_contact(&contact)?;
        info!("event=contact_create module=service status=ok contact_id={id}");
        self.repo
            .get_contact(id)?
            .ok_or(ContactServiceError::InconsistentState(
                "created contact not found in read-back",
            ))
    }

    /// Replaces name and description; coordinate and timestamp stay put.
    pub fn edit_contact(
        &self,
        id: ContactId,
        name: &str,
        description: Option<String>,
    ) -> Result<Contact, ContactServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactValidationError::EmptyName.into());
        }

        let patch = ContactPatch {
            name: Some(name.to_string()),
            description: Some(normalize_description(
                description.map(|value| value.trim().to_string()),
            )),
        };
        self.repo.update_contact(id, &patch)?;
        info!("event=contact_edit module=service status=ok contact_id={id}");

        self.repo
            .get_contact(id)?
            .ok_or(ContactServiceError::InconsistentState(
                "edited contact not found in read-back",
            ))
    }

    pub fn delete_contact(&self, id: ContactId) -> Result<(), ContactServiceError> {
        self.repo.delete_contact(id)?;
        info!("event=contact_delete module=service status=ok contact_id={id}");
        Ok(())
    }

    pub fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        self.repo.get_contact(id)
    }

    /// Lists all contacts, most recent first.
    pub fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        self.repo.fetch_all()
    }

    /// Contacts matching `query`, in store order.
    pub fn visible_contacts(&self, query: &ViewportQuery) -> RepoResult<Vec<Contact>> {
        let snapshot = self.repo.fetch_all()?;
        Ok(visible_set(&snapshot, query).to_owned_contacts())
    }

    /// Contacts within `radius_meters` of the current fix.
    ///
    /// Without a usable fix the result is empty, not an error.
    pub fn contacts_near(
        &self,
        location: &impl LocationSource,
        radius_meters: f64,
    ) -> RepoResult<Vec<Contact>> {
        let Some(query) = RadiusQuery::around_current_location(location, radius_meters) else {
            return Ok(Vec::new());
        };
        self.visible_contacts(&ViewportQuery::Radius(query))
    }

    /// Visible contacts paired with declutter offsets.
    pub fn map_pins(&self, query: Option<&ViewportQuery>) -> RepoResult<Vec<MapPin>> {
        let snapshot = self.repo.fetch_all()?;
        let visible = visible_set_for(&snapshot, query);
        let placements = layout_pins(&visible, &self.layout);
        Ok(visible
            .iter()
            .zip(placements)
            .map(|(&contact, placement)| MapPin {
                contact: contact.clone(),
                placement,
            })
            .collect())
    }
}
