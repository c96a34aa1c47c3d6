//! Conversion between GeoJSON geometry values and `geo` multipolygons
//!
//! The kernel works on `geo::MultiPolygon<f64>`; features stay in GeoJSON
//! form everywhere else. A Polygon converts to a one-member MultiPolygon, and
//! on the way back a one-member MultiPolygon is emitted as a plain Polygon.

use crate::error::{DissolveError, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, Geometry, PolygonType, Position, Value};

/// Convert a GeoJSON geometry into the kernel representation
pub fn to_multi_polygon(geometry: &Geometry) -> Result<MultiPolygon<f64>> {
    match &geometry.value {
        Value::Polygon(rings) => Ok(MultiPolygon::new(vec![polygon_from_rings(rings)?])),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .map(|rings| polygon_from_rings(rings))
            .collect::<Result<Vec<_>>>()
            .map(MultiPolygon::new),
        other => Err(DissolveError::UnsupportedGeometry(geometry_kind(other))),
    }
}

/// Convert a feature's geometry, treating a missing geometry as unsupported
pub fn feature_to_multi_polygon(feature: &Feature) -> Result<MultiPolygon<f64>> {
    match feature.geometry.as_ref() {
        Some(geometry) => to_multi_polygon(geometry),
        None => Err(DissolveError::UnsupportedGeometry("none")),
    }
}

/// Convert a kernel result back into a GeoJSON geometry
pub fn from_multi_polygon(multi: &MultiPolygon<f64>) -> Geometry {
    let mut polygons: Vec<PolygonType> = multi.0.iter().map(rings_from_polygon).collect();

    let value = if polygons.len() == 1 {
        Value::Polygon(polygons.remove(0))
    } else {
        Value::MultiPolygon(polygons)
    };

    Geometry::new(value)
}

/// Short name of a GeoJSON geometry kind, for diagnostics
pub fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn polygon_from_rings(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let mut iter = rings.iter();
    let exterior = match iter.next() {
        Some(ring) => line_string(ring)?,
        None => LineString::new(Vec::new()),
    };
    let interiors = iter.map(|ring| line_string(ring)).collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

fn line_string(ring: &[Position]) -> Result<LineString<f64>> {
    ring.iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            other => Err(DissolveError::MalformedPosition(other.len())),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn rings_from_polygon(polygon: &Polygon<f64>) -> PolygonType {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64) -> Vec<Position> {
        vec![
            vec![x, y],
            vec![x + 1.0, y],
            vec![x + 1.0, y + 1.0],
            vec![x, y + 1.0],
            vec![x, y],
        ]
    }

    #[test]
    fn test_polygon_becomes_single_member_multipolygon() {
        let geometry = Geometry::new(Value::Polygon(vec![square(0.0, 0.0)]));
        let multi = to_multi_polygon(&geometry).unwrap();

        assert_eq!(multi.0.len(), 1);
        assert_eq!(multi.0[0].exterior().0.len(), 5);
        assert!(multi.0[0].interiors().is_empty());
    }

    #[test]
    fn test_single_member_multipolygon_is_emitted_as_polygon() {
        let geometry = Geometry::new(Value::MultiPolygon(vec![vec![square(0.0, 0.0)]]));
        let multi = to_multi_polygon(&geometry).unwrap();

        match from_multi_polygon(&multi).value {
            Value::Polygon(rings) => assert_eq!(rings[0], square(0.0, 0.0)),
            other => panic!("Expected Polygon, got {}", geometry_kind(&other)),
        }
    }

    #[test]
    fn test_two_members_stay_multipolygon() {
        let geometry = Geometry::new(Value::MultiPolygon(vec![
            vec![square(0.0, 0.0)],
            vec![square(5.0, 5.0)],
        ]));
        let multi = to_multi_polygon(&geometry).unwrap();

        match from_multi_polygon(&multi).value {
            Value::MultiPolygon(polygons) => assert_eq!(polygons.len(), 2),
            other => panic!("Expected MultiPolygon, got {}", geometry_kind(&other)),
        }
    }

    #[test]
    fn test_one_dimensional_position_is_rejected() {
        let mut ring = square(0.0, 0.0);
        ring[2] = vec![1.0];
        let geometry = Geometry::new(Value::Polygon(vec![ring]));

        assert!(matches!(
            to_multi_polygon(&geometry),
            Err(DissolveError::MalformedPosition(1))
        ));
    }

    #[test]
    fn test_point_is_unsupported() {
        let geometry = Geometry::new(Value::Point(vec![0.0, 0.0]));
        assert!(matches!(
            to_multi_polygon(&geometry),
            Err(DissolveError::UnsupportedGeometry("Point"))
        ));
    }
}
