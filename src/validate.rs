//! Structural validity checks for polygon geometries
//!
//! These checks only look at ring lengths. Self-intersections and other
//! topological defects are left to the union kernel and the zero-buffer
//! repair.

use geojson::{Feature, Geometry, PolygonType, Value};

/// Minimum positions in a closed ring: a triangle plus the closing position
pub const MIN_RING_POSITIONS: usize = 4;

/// Check whether a geometry carries enough ring data to be unioned
///
/// * Polygon: the outer ring has at least [`MIN_RING_POSITIONS`] positions
/// * MultiPolygon: at least one member polygon passes the polygon check
/// * Anything else, or no geometry at all: invalid
///
/// The MultiPolygon check is lenient on purpose. Malformed sibling parts are
/// still handed to the kernel as-is.
pub fn is_valid_polygon(geometry: Option<&Geometry>) -> bool {
    match geometry.map(|g| &g.value) {
        Some(Value::Polygon(rings)) => has_valid_outer_ring(rings),
        Some(Value::MultiPolygon(polygons)) => polygons.iter().any(|p| has_valid_outer_ring(p)),
        _ => false,
    }
}

/// [`is_valid_polygon`] applied to a feature's geometry
pub fn is_valid_feature(feature: &Feature) -> bool {
    is_valid_polygon(feature.geometry.as_ref())
}

fn has_valid_outer_ring(rings: &PolygonType) -> bool {
    rings
        .first()
        .map(|outer| outer.len() >= MIN_RING_POSITIONS)
        .unwrap_or(false)
}
