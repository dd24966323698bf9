//! Export / preview / commit use-cases over a contact store.

use super::document::{parse_document, render_document};
use super::error::{ExportError, ImportError};
use super::policy::{PermissiveDefaults, RecordPolicy};
use crate::model::contact::Contact;
use crate::repo::contact_repo::ContactRepository;
use log::{error, info, warn};
use std::time::Instant;

/// Pre-flight numbers for a "replace N existing with M imported" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportPreview {
    pub import_count: usize,
    pub existing_count: usize,
    /// Records that will be imported with at least one defaulted field.
    pub defaulted_records: usize,
}

/// Contacts decoded from a document, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    pub contacts: Vec<Contact>,
    pub defaulted_records: usize,
}

/// Renders an in-memory contact collection, preserving its order.
pub fn export_contacts(contacts: &[Contact]) -> Result<String, ExportError> {
    render_document(contacts)
}

/// Parses and decodes a document without touching any store.
pub fn plan_import(text: &str, policy: &impl RecordPolicy) -> Result<ImportPlan, ImportError> {
    let records = parse_document(text)?;
    let mut contacts = Vec::with_capacity(records.len());
    let mut defaulted_records = 0;

    for (index, record) in records.iter().enumerate() {
        let decoded = policy.decode(index, record)?;
        if !decoded.defaulted.is_empty() {
            defaulted_records += 1;
        }
        contacts.push(decoded.contact);
    }

    Ok(ImportPlan {
        contacts,
        defaulted_records,
    })
}

/// Whole-collection interchange service.
pub struct ContactInterchange<R: ContactRepository, P: RecordPolicy = PermissiveDefaults> {
    repo: R,
    policy: P,
}

impl<R: ContactRepository> ContactInterchange<R> {
    /// Creates a service using the legacy permissive record policy.
    pub fn new(repo: R) -> Self {
        Self::with_policy(repo, PermissiveDefaults)
    }
}

impl<R: ContactRepository, P: RecordPolicy> ContactInterchange<R, P> {
    pub fn with_policy(repo: R, policy: P) -> Self {
        Self { repo, policy }
    }

    /// Exports the stored collection in store order.
    pub fn export(&self) -> Result<String, ExportError> {
        let started_at = Instant::now();
        let contacts = self.repo.fetch_all()?;
        let document = export_contacts(&contacts).inspect_err(|err| {
            error!("event=contacts_export module=interchange status=error error={err}");
        })?;
        info!(
            "event=contacts_export module=interchange status=ok count={} duration_ms={}",
            contacts.len(),
            started_at.elapsed().as_millis()
        );
        Ok(document)
    }

    /// Parses `text` and reports counts without mutating the store.
    pub fn preview_import(&self, text: &str) -> Result<ImportPreview, ImportError> {
        let plan = plan_import(text, &self.policy).inspect_err(|err| {
            warn!("event=import_preview module=interchange status=rejected error={err}");
        })?;
        let existing_count = self.repo.count()?;

        info!(
            "event=import_preview module=interchange status=ok import_count={} existing_count={} defaulted_records={}",
            plan.contacts.len(),
            existing_count,
            plan.defaulted_records
        );
        Ok(ImportPreview {
            import_count: plan.contacts.len(),
            existing_count,
            defaulted_records: plan.defaulted_records,
        })
    }

    /// Replaces the whole stored collection with the document's records.
    ///
    /// Parsing happens first, so a malformed document leaves the store
    /// untouched. Returns the number of imported contacts, including those
    /// with defaulted fields.
    pub fn commit_import(&self, text: &str) -> Result<usize, ImportError> {
        let started_at = Instant::now();
        let plan = plan_import(text, &self.policy).inspect_err(|err| {
            warn!("event=import_commit module=interchange status=rejected error={err}");
        })?;

        let outcome = self.repo.replace_all(&plan.contacts).inspect_err(|err| {
            error!("event=import_commit module=interchange status=error error={err}");
        })?;

        info!(
            "event=import_commit module=interchange status=ok deleted={} inserted={} defaulted_records={} duration_ms={}",
            outcome.deleted,
            outcome.inserted,
            plan.defaulted_records,
            started_at.elapsed().as_millis()
        );
        Ok(outcome.inserted)
    }
}
