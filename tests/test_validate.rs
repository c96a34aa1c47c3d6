use geo_dissolve::{is_valid_feature, is_valid_polygon};
use geojson::{Feature, Geometry, Value};

/// Closed ring with `n` positions (n - 1 distinct vertices plus closure)
fn closed_ring(n: usize) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = (0..n - 1)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::TAU / (n - 1) as f64;
            vec![32.58 + 0.01 * angle.cos(), 0.31 + 0.01 * angle.sin()]
        })
        .collect();
    ring.push(ring[0].clone());
    ring
}

fn polygon(outer: Vec<Vec<f64>>) -> Geometry {
    Geometry::new(Value::Polygon(vec![outer]))
}

#[test]
fn test_ring_of_three_positions_is_invalid() {
    assert!(!is_valid_polygon(Some(&polygon(closed_ring(3)))));
}

#[test]
fn test_minimal_closed_triangle_is_valid() {
    assert!(is_valid_polygon(Some(&polygon(closed_ring(4)))));
}

#[test]
fn test_multipolygon_with_one_valid_member_is_valid() {
    let geometry = Geometry::new(Value::MultiPolygon(vec![
        vec![closed_ring(6)],
        vec![vec![vec![0.0, 0.0], vec![1.0, 1.0]]],
    ]));
    assert!(is_valid_polygon(Some(&geometry)));
}

#[test]
fn test_multipolygon_with_no_valid_member_is_invalid() {
    let geometry = Geometry::new(Value::MultiPolygon(vec![
        vec![closed_ring(3)],
        vec![vec![vec![0.0, 0.0], vec![1.0, 1.0]]],
    ]));
    assert!(!is_valid_polygon(Some(&geometry)));
}

#[test]
fn test_feature_without_geometry_is_invalid() {
    let feature = Feature {
        bbox: None,
        geometry: None,
        id: None,
        properties: None,
        foreign_members: None,
    };
    assert!(!is_valid_feature(&feature));
}

#[test]
fn test_validity_is_recomputed_after_replacing_geometry() {
    let mut feature = Feature {
        bbox: None,
        geometry: Some(polygon(closed_ring(3))),
        id: None,
        properties: None,
        foreign_members: None,
    };
    assert!(!is_valid_feature(&feature));

    feature.geometry = Some(polygon(closed_ring(5)));
    assert!(is_valid_feature(&feature));
}
