//! Overlap grouping and radial offsets.
//!
//! The default grouping is a direct pairwise threshold scan per contact,
//! not a clustering pass. In chained configurations two members of a
//! "group" can disagree about its membership (A sees B and C, B does not see
//! C). Pin positions on screen depend on this, so it is kept as-is;
//! `TransitiveClustering` is available for callers that want closed groups.

use crate::model::contact::{Contact, ContactId};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Angular threshold, roughly 10 m at the equator.
pub const DEFAULT_OVERLAP_EPSILON_DEGREES: f64 = 0.0001;
/// Fan-out radius in display points.
pub const DEFAULT_FAN_RADIUS: f64 = 60.0;

/// Tunables for pin layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub epsilon_degrees: f64,
    pub radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            epsilon_degrees: DEFAULT_OVERLAP_EPSILON_DEGREES,
            radius: DEFAULT_FAN_RADIUS,
        }
    }
}

/// Screen-space offset applied to one pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutOffset {
    pub dx: f64,
    pub dy: f64,
}

impl LayoutOffset {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// One contact paired with where its pin should be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinPlacement {
    pub contact_id: ContactId,
    pub offset: LayoutOffset,
}

/// The group a contact belongs to, as seen from that contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPosition {
    /// 0-based slot in discovery order.
    pub index: usize,
    pub size: usize,
}

/// Strategy deciding which contacts overlap a given one.
pub trait OverlapGrouping {
    /// Returns the position of `contacts[target]` within its overlap group,
    /// or `None` when the contact takes no part in grouping.
    fn group_position(
        &self,
        contacts: &[&Contact],
        target: usize,
        epsilon_degrees: f64,
    ) -> Option<GroupPosition>;
}

/// Per-contact scan of the full visible collection (default behavior).
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseThreshold;

impl OverlapGrouping for PairwiseThreshold {
    fn group_position(
        &self,
        contacts: &[&Contact],
        target: usize,
        epsilon_degrees: f64,
    ) -> Option<GroupPosition> {
        let subject = contacts.get(target)?;
        if !has_finite_coordinate(subject) {
            return None;
        }

        let mut size = 0;
        let mut index = 0;
        for (position, other) in contacts.iter().enumerate() {
            if !within_epsilon(subject, other, epsilon_degrees) {
                continue;
            }
            if position == target {
                index = size;
            }
            size += 1;
        }
        Some(GroupPosition { index, size })
    }
}

/// Closed groups: connected components of the "within epsilon" relation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitiveClustering;

impl OverlapGrouping for TransitiveClustering {
    fn group_position(
        &self,
        contacts: &[&Contact],
        target: usize,
        epsilon_degrees: f64,
    ) -> Option<GroupPosition> {
        let subject = contacts.get(target)?;
        if !has_finite_coordinate(subject) {
            return None;
        }

        let mut in_group = vec![false; contacts.len()];
        in_group[target] = true;
        let mut frontier = vec![target];
        while let Some(current) = frontier.pop() {
            for (position, other) in contacts.iter().enumerate() {
                if !in_group[position]
                    && within_epsilon(contacts[current], other, epsilon_degrees)
                {
                    in_group[position] = true;
                    frontier.push(position);
                }
            }
        }

        let index = in_group[..target].iter().filter(|&&member| member).count();
        let size = in_group.iter().filter(|&&member| member).count();
        Some(GroupPosition { index, size })
    }
}

/// Offsets for every visible contact using the default pairwise grouping.
pub fn compute_offsets(contacts: &[&Contact], config: &LayoutConfig) -> Vec<LayoutOffset> {
    compute_offsets_with(&PairwiseThreshold, contacts, config)
}

/// Offsets for every visible contact, parallel to `contacts`.
pub fn compute_offsets_with(
    grouping: &impl OverlapGrouping,
    contacts: &[&Contact],
    config: &LayoutConfig,
) -> Vec<LayoutOffset> {
    (0..contacts.len())
        .map(|target| {
            grouping
                .group_position(contacts, target, config.epsilon_degrees)
                .map_or(LayoutOffset::ZERO, |position| {
                    radial_offset(position, config.radius)
                })
        })
        .collect()
}

/// Pairs each visible contact id with its offset.
pub fn layout_pins(contacts: &[&Contact], config: &LayoutConfig) -> Vec<PinPlacement> {
    contacts
        .iter()
        .zip(compute_offsets(contacts, config))
        .map(|(contact, offset)| PinPlacement {
            contact_id: contact.id,
            offset,
        })
        .collect()
}

/// Slot `index` of `size` on a circle of `radius`, starting at angle 0.
pub fn radial_offset(position: GroupPosition, radius: f64) -> LayoutOffset {
    if position.size <= 1 {
        return LayoutOffset::ZERO;
    }
    let angle = TAU * position.index as f64 / position.size as f64;
    LayoutOffset {
        dx: radius * angle.cos(),
        dy: radius * angle.sin(),
    }
}

fn has_finite_coordinate(contact: &Contact) -> bool {
    contact.latitude.is_finite() && contact.longitude.is_finite()
}

fn within_epsilon(a: &Contact, b: &Contact, epsilon_degrees: f64) -> bool {
    (a.latitude - b.latitude).abs() < epsilon_degrees
        && (a.longitude - b.longitude).abs() < epsilon_degrees
}
