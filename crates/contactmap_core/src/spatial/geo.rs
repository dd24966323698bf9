//! Great-circle helpers.

use crate::model::contact::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in meters.
///
/// Returns NaN when either coordinate has a NaN component.
pub fn great_circle_distance_meters(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards asin against rounding just above 1.0 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::{great_circle_distance_meters, EARTH_RADIUS_METERS};
    use crate::model::contact::Coordinate;
    use std::f64::consts::PI;

    #[test]
    fn identical_points_are_zero_apart() {
        let point = Coordinate::new(37.7749, -122.4194);
        assert_eq!(great_circle_distance_meters(point, point), 0.0);
    }

    #[test]
    fn antipodal_points_are_half_circumference_apart() {
        let distance =
            great_circle_distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert!((distance - PI * EARTH_RADIUS_METERS).abs() < 1e-3);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let distance =
            great_circle_distance_meters(Coordinate::new(10.0, 5.0), Coordinate::new(11.0, 5.0));
        assert!((distance - 111_194.9).abs() < 1.0, "got {distance}");
    }
}
