//! Visible-set computation over a contact snapshot.
//!
//! Every call is an O(n) pass over the snapshot; nothing is cached between
//! calls, so a newer query simply supersedes the previous result.

use super::geo::great_circle_distance_meters;
use super::query::{RadiusQuery, RectangleQuery, ViewportQuery};
use crate::model::contact::{Contact, ContactId, Coordinate};
use std::ops::Deref;

/// Ordered subset of a contact snapshot matching one query.
///
/// Order is inherited from the snapshot (most recent first when the
/// snapshot comes from `ContactRepository::fetch_all`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleSet<'a> {
    contacts: Vec<&'a Contact>,
}

impl<'a> VisibleSet<'a> {
    pub fn empty() -> Self {
        Self {
            contacts: Vec::new(),
        }
    }

    pub fn ids(&self) -> Vec<ContactId> {
        self.contacts.iter().map(|contact| contact.id).collect()
    }

    /// Clones the matching contacts out of the snapshot.
    pub fn to_owned_contacts(&self) -> Vec<Contact> {
        self.contacts.iter().map(|&contact| contact.clone()).collect()
    }
}

impl<'a> Deref for VisibleSet<'a> {
    type Target = [&'a Contact];

    fn deref(&self) -> &Self::Target {
        &self.contacts
    }
}

impl<'a> FromIterator<&'a Contact> for VisibleSet<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Contact>>(iter: I) -> Self {
        Self {
            contacts: iter.into_iter().collect(),
        }
    }
}

/// Contacts inside the flat degree box around `center`.
///
/// Membership is `|dlat| <= latitude_span / 2 && |dlon| <= longitude_span / 2`,
/// boundary inclusive. Longitude compression at high latitude is ignored on
/// purpose so the result agrees with what the map widget shows.
///
/// A missing center yields an empty set.
pub fn filter_by_rectangle(
    contacts: &[Contact],
    center: Option<Coordinate>,
    latitude_span: f64,
    longitude_span: f64,
) -> VisibleSet<'_> {
    let Some(center) = center else {
        return VisibleSet::empty();
    };
    if contacts.is_empty() {
        return VisibleSet::empty();
    }

    let half_lat = latitude_span / 2.0;
    let half_lon = longitude_span / 2.0;
    contacts
        .iter()
        .filter(|contact| {
            (contact.latitude - center.latitude).abs() <= half_lat
                && (contact.longitude - center.longitude).abs() <= half_lon
        })
        .collect()
}

/// Contacts whose great-circle distance to `center` is at most
/// `radius_meters`.
///
/// A missing center yields an empty set.
pub fn filter_by_radius(
    contacts: &[Contact],
    center: Option<Coordinate>,
    radius_meters: f64,
) -> VisibleSet<'_> {
    let Some(center) = center else {
        return VisibleSet::empty();
    };
    if contacts.is_empty() {
        return VisibleSet::empty();
    }

    contacts
        .iter()
        .filter(|contact| {
            great_circle_distance_meters(center, contact.coordinate()) <= radius_meters
        })
        .collect()
}

/// Dispatches on the query shape.
pub fn visible_set<'a>(contacts: &'a [Contact], query: &ViewportQuery) -> VisibleSet<'a> {
    match query {
        ViewportQuery::Rectangle(RectangleQuery {
            center,
            latitude_span,
            longitude_span,
        }) => filter_by_rectangle(contacts, Some(*center), *latitude_span, *longitude_span),
        ViewportQuery::Radius(RadiusQuery {
            center,
            radius_meters,
        }) => filter_by_radius(contacts, Some(*center), *radius_meters),
    }
}

/// Like [`visible_set`] but tolerates an absent query (no location fix).
pub fn visible_set_for<'a>(
    contacts: &'a [Contact],
    query: Option<&ViewportQuery>,
) -> VisibleSet<'a> {
    match query {
        Some(query) => visible_set(contacts, query),
        None => VisibleSet::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_by_radius, filter_by_rectangle};
    use crate::model::contact::{Contact, Coordinate};

    fn at(latitude: f64, longitude: f64) -> Contact {
        Contact::new("c", None, Coordinate::new(latitude, longitude), None)
    }

    #[test]
    fn nan_contacts_never_match() {
        let contacts = vec![at(f64::NAN, 0.0), at(0.0, 0.0)];
        let center = Some(Coordinate::new(0.0, 0.0));
        assert_eq!(filter_by_rectangle(&contacts, center, 10.0, 10.0).len(), 1);
        assert_eq!(filter_by_radius(&contacts, center, 1_000.0).len(), 1);
    }

    #[test]
    fn negative_or_nan_extent_matches_nothing() {
        let contacts = vec![at(0.0, 0.0)];
        let center = Some(Coordinate::new(0.0, 0.0));
        assert!(filter_by_rectangle(&contacts, center, -1.0, 1.0).is_empty());
        assert!(filter_by_radius(&contacts, center, f64::NAN).is_empty());
    }
}
