use contactmap_core::db::open_db_in_memory;
use contactmap_core::spatial::geo::EARTH_RADIUS_METERS;
use contactmap_core::{
    filter_by_radius, filter_by_rectangle, great_circle_distance_meters, visible_set,
    AuthorizationState, Contact, ContactService, Coordinate, RadiusQuery, SqliteContactRepository,
    StaticLocation, ViewportQuery,
};

#[test]
fn rectangle_is_boundary_inclusive_on_both_axes() {
    let center = Coordinate::new(10.0, 20.0);
    let contacts = vec![
        named("lat edge", 10.5, 20.0),
        named("lon edge", 10.0, 21.0),
        named("corner", 10.5, 21.0),
        named("just outside", 10.5000001, 20.0),
    ];

    let visible = filter_by_rectangle(&contacts, Some(center), 1.0, 2.0);
    assert_eq!(names(&visible), vec!["lat edge", "lon edge", "corner"]);
}

#[test]
fn rectangle_ignores_longitude_compression() {
    // At 80N one degree of longitude is ~19 km, yet the box stays in degrees.
    let contacts = vec![named("polar", 80.0, 10.9)];
    let visible = filter_by_rectangle(&contacts, Some(Coordinate::new(80.0, 10.0)), 1.0, 2.0);
    assert_eq!(visible.len(), 1);
}

#[test]
fn zero_span_matches_exact_coordinate_only() {
    let contacts = vec![named("exact", 1.25, 2.5), named("near", 1.2500001, 2.5)];
    let visible = filter_by_rectangle(&contacts, Some(Coordinate::new(1.25, 2.5)), 0.0, 0.0);
    assert_eq!(names(&visible), vec!["exact"]);
}

#[test]
fn radius_boundary_is_inclusive() {
    let center = Coordinate::new(0.0, 0.0);
    // Due north of the center, 500 m along the meridian.
    let target = Coordinate::new((500.0 / EARTH_RADIUS_METERS).to_degrees(), 0.0);
    let distance = great_circle_distance_meters(center, target);
    assert!((distance - 500.0).abs() < 1e-6, "got {distance}");

    let contacts = vec![named("target", target.latitude, target.longitude)];
    assert_eq!(filter_by_radius(&contacts, Some(center), distance).len(), 1);
    assert!(filter_by_radius(&contacts, Some(center), distance - 0.001).is_empty());
}

#[test]
fn zero_radius_matches_exact_coordinate_only() {
    let contacts = vec![named("exact", 45.0, 7.0), named("near", 45.00001, 7.0)];
    let visible = filter_by_radius(&contacts, Some(Coordinate::new(45.0, 7.0)), 0.0);
    assert_eq!(names(&visible), vec!["exact"]);
}

#[test]
fn filters_preserve_input_order() {
    let contacts = vec![
        named("c", 0.001, 0.0),
        named("far", 5.0, 5.0),
        named("a", 0.0, 0.001),
        named("b", -0.001, 0.0),
    ];
    let center = Some(Coordinate::new(0.0, 0.0));

    assert_eq!(
        names(&filter_by_rectangle(&contacts, center, 0.01, 0.01)),
        vec!["c", "a", "b"]
    );
    assert_eq!(
        names(&filter_by_radius(&contacts, center, 1_000.0)),
        vec!["c", "a", "b"]
    );
}

#[test]
fn missing_center_and_empty_input_yield_empty_sets() {
    let contacts = vec![named("a", 0.0, 0.0)];
    assert!(filter_by_rectangle(&contacts, None, 10.0, 10.0).is_empty());
    assert!(filter_by_radius(&contacts, None, 10_000.0).is_empty());

    let none: Vec<Contact> = Vec::new();
    let center = Some(Coordinate::new(0.0, 0.0));
    assert!(filter_by_rectangle(&none, center, 10.0, 10.0).is_empty());
    assert!(filter_by_radius(&none, center, 10.0).is_empty());
}

#[test]
fn query_dispatch_keeps_the_two_algorithms_apart() {
    // 0.9 degrees east at 60N is ~50 km: inside a 2-degree box, outside 40 km.
    let contacts = vec![named("east", 60.0, 10.9)];
    let center = Coordinate::new(60.0, 10.0);

    let rectangle = ViewportQuery::rectangle(center, 2.0, 2.0);
    let radius = ViewportQuery::radius(center, 40_000.0);
    assert_eq!(visible_set(&contacts, &rectangle).len(), 1);
    assert!(visible_set(&contacts, &radius).is_empty());
}

#[test]
fn near_me_requires_authorized_fix() {
    let conn = open_db_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::try_new(&conn).unwrap());
    let here = Coordinate::new(40.7128, -74.0060);
    service.create_contact("close", None, here, None).unwrap();

    let authorized = StaticLocation::authorized(here);
    assert_eq!(service.contacts_near(&authorized, 100.0).unwrap().len(), 1);

    let denied = StaticLocation {
        coordinate: Some(here),
        authorization: AuthorizationState::Denied,
    };
    assert!(service.contacts_near(&denied, 100.0).unwrap().is_empty());

    let no_fix = StaticLocation::unavailable(AuthorizationState::AuthorizedWhileActive);
    assert!(service.contacts_near(&no_fix, 100.0).unwrap().is_empty());
    assert!(RadiusQuery::around_current_location(&no_fix, 100.0).is_none());
}

fn named(name: &str, latitude: f64, longitude: f64) -> Contact {
    Contact::new(name, None, Coordinate::new(latitude, longitude), None)
}

fn names<'a>(contacts: &[&'a Contact]) -> Vec<&'a str> {
    contacts.iter().map(|contact| contact.name.as_str()).collect()
}
