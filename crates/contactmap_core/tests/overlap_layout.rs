use contactmap_core::db::open_db_in_memory;
use contactmap_core::{
    compute_offsets, compute_offsets_with, layout_pins, Contact, ContactService, Coordinate,
    LayoutConfig, LayoutOffset, SqliteContactRepository, TransitiveClustering, ViewportQuery,
};
use std::f64::consts::FRAC_PI_2;

const EPS: f64 = 1e-9;

#[test]
fn single_contact_without_neighbours_gets_zero_offset() {
    let contacts = [at(48.0, 11.0), at(48.1, 11.0)];
    let offsets = compute_offsets(&refs(&contacts), &LayoutConfig::default());
    assert_eq!(offsets, vec![LayoutOffset::ZERO, LayoutOffset::ZERO]);
}

#[test]
fn four_coincident_contacts_fan_out_at_right_angles() {
    let contacts = [at(1.0, 2.0), at(1.0, 2.0), at(1.0, 2.0), at(1.0, 2.0)];
    let config = LayoutConfig::default();
    let offsets = compute_offsets(&refs(&contacts), &config);

    for (index, offset) in offsets.iter().enumerate() {
        let angle = FRAC_PI_2 * index as f64;
        assert!((offset.dx - config.radius * angle.cos()).abs() < EPS);
        assert!((offset.dy - config.radius * angle.sin()).abs() < EPS);
        assert!((offset.dx.hypot(offset.dy) - config.radius).abs() < EPS);
    }
    for (i, a) in offsets.iter().enumerate() {
        for b in &offsets[i + 1..] {
            assert!((a.dx - b.dx).abs() > 1.0 || (a.dy - b.dy).abs() > 1.0);
        }
    }
}

#[test]
fn slots_follow_collection_order_and_skip_far_contacts() {
    let contacts = [at(0.0, 0.0), at(5.0, 5.0), at(0.00005, 0.0)];
    let offsets = compute_offsets(&refs(&contacts), &LayoutConfig::default());

    assert_eq!(offsets[0], LayoutOffset { dx: 60.0, dy: 0.0 });
    assert_eq!(offsets[1], LayoutOffset::ZERO);
    assert!((offsets[2].dx + 60.0).abs() < EPS);
    assert!(offsets[2].dy.abs() < EPS);
}

#[test]
fn threshold_is_strict() {
    let config = LayoutConfig {
        epsilon_degrees: 0.5,
        radius: 60.0,
    };
    let contacts = [at(0.0, 0.0), at(0.5, 0.0)];
    let offsets = compute_offsets(&refs(&contacts), &config);
    assert!(offsets.iter().all(LayoutOffset::is_zero));
}

#[test]
fn pairwise_grouping_is_not_transitive() {
    // A-B and A-C are within epsilon, B-C are not.
    let config = LayoutConfig {
        epsilon_degrees: 1.0,
        radius: 60.0,
    };
    let contacts = [at(0.0, 0.0), at(0.0, -0.8), at(0.0, 0.8)];
    let visible = refs(&contacts);

    let pairwise = compute_offsets(&visible, &config);
    // A sees a group of 3 and takes slot 0; B and C each see a group of 2.
    assert_eq!(pairwise[0], LayoutOffset { dx: 60.0, dy: 0.0 });
    assert!((pairwise[1].dx + 60.0).abs() < EPS);
    assert!((pairwise[2].dx + 60.0).abs() < EPS);

    let transitive = compute_offsets_with(&TransitiveClustering, &visible, &config);
    let third = 2.0 * std::f64::consts::PI / 3.0;
    assert_eq!(transitive[0], LayoutOffset { dx: 60.0, dy: 0.0 });
    assert!((transitive[1].dx - 60.0 * third.cos()).abs() < EPS);
    assert!((transitive[2].dy - 60.0 * (2.0 * third).sin()).abs() < EPS);
}

#[test]
fn nan_coordinates_are_excluded_from_grouping() {
    let contacts = [at(f64::NAN, 0.0), at(3.0, 3.0), at(3.0, 3.0)];
    let offsets = compute_offsets(&refs(&contacts), &LayoutConfig::default());
    assert_eq!(offsets[0], LayoutOffset::ZERO);
    assert_eq!(offsets[1], LayoutOffset { dx: 60.0, dy: 0.0 });
    assert!((offsets[2].dx + 60.0).abs() < EPS);
}

#[test]
fn layout_is_deterministic_for_same_snapshot() {
    let contacts = [at(1.0, 1.0), at(1.0, 1.0), at(1.00001, 1.0)];
    let visible = refs(&contacts);
    let first = layout_pins(&visible, &LayoutConfig::default());
    let second = layout_pins(&visible, &LayoutConfig::default());
    assert_eq!(first, second);
    assert_eq!(first[1].contact_id, contacts[1].id);
}

#[test]
fn map_pins_combine_visible_set_and_offsets() {
    let conn = open_db_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::try_new(&conn).unwrap());
    let spot = Coordinate::new(35.6762, 139.6503);
    service.create_contact("one", None, spot, None).unwrap();
    service.create_contact("two", None, spot, None).unwrap();
    service
        .create_contact("elsewhere", None, Coordinate::new(-33.86, 151.2), None)
        .unwrap();

    let query = ViewportQuery::rectangle(spot, 0.1, 0.1);
    let pins = service.map_pins(Some(&query)).unwrap();
    assert_eq!(pins.len(), 2);
    assert!(pins.iter().all(|pin| !pin.placement.offset.is_zero()));
    assert_ne!(pins[0].placement.offset, pins[1].placement.offset);

    assert!(service.map_pins(None).unwrap().is_empty());
}

fn at(latitude: f64, longitude: f64) -> Contact {
    Contact::new("pin", None, Coordinate::new(latitude, longitude), None)
}

fn refs(contacts: &[Contact]) -> Vec<&Contact> {
    contacts.iter().collect()
}
