//! Viewport query shapes.

use crate::location::{usable_fix, LocationSource};
use crate::model::contact::Coordinate;
use serde::{Deserialize, Serialize};

/// Axis-aligned degree box: center plus full span on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleQuery {
    pub center: Coordinate,
    pub latitude_span: f64,
    pub longitude_span: f64,
}

/// Circle around a center, radius in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusQuery {
    pub center: Coordinate,
    pub radius_meters: f64,
}

impl RadiusQuery {
    /// Builds a "near me" query, or `None` without a usable location fix.
    pub fn around_current_location(
        source: &impl LocationSource,
        radius_meters: f64,
    ) -> Option<Self> {
        usable_fix(source).map(|center| Self {
            center,
            radius_meters,
        })
    }
}

/// Active query driving the visible set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewportQuery {
    Rectangle(RectangleQuery),
    Radius(RadiusQuery),
}

impl ViewportQuery {
    pub fn rectangle(center: Coordinate, latitude_span: f64, longitude_span: f64) -> Self {
        Self::Rectangle(RectangleQuery {
            center,
            latitude_span,
            longitude_span,
        })
    }

    pub fn radius(center: Coordinate, radius_meters: f64) -> Self {
        Self::Radius(RadiusQuery {
            center,
            radius_meters,
        })
    }

    pub fn center(&self) -> Coordinate {
        match self {
            Self::Rectangle(query) => query.center,
            Self::Radius(query) => query.center,
        }
    }
}
