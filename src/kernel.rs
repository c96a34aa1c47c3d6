//! Geometry kernel seam
//!
//! The dissolve engine never calls a geometry library directly. It goes
//! through [`GeometryKernel`], which exposes the two primitives it needs:
//! pairwise union and zero-distance buffering. [`GeoKernel`] backs both with
//! the `geo` crate; tests substitute kernels that fail on demand.
//!
//! `geo`'s zero-distance buffer returns nothing for a self-intersecting ring
//! such as a bowtie. [`GeoKernel::zero_buffer`] then falls back to a unary
//! union of the members, which resolves the crossing into simple polygons.

use crate::error::{DissolveError, Result};
use geo::{unary_union, BooleanOps, Buffer, MultiPolygon};
use std::panic::{self, AssertUnwindSafe};

/// Union and repair primitives consumed by the dissolve engine
///
/// Both operations report failure through `Err`; implementations must not
/// panic.
pub trait GeometryKernel {
    /// Union two multipolygons into one
    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>>;

    /// Buffer by a distance of zero, regularizing self-intersections and
    /// degenerate rings
    fn zero_buffer(&self, geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>>;
}

impl<K: GeometryKernel + ?Sized> GeometryKernel for &K {
    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        (**self).union(a, b)
    }

    fn zero_buffer(&self, geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        (**self).zero_buffer(geometry)
    }
}

/// Kernel backed by `geo`'s boolean operations and buffer
///
/// Non-finite ordinates are rejected before reaching `geo`, and a panic
/// inside `geo` is reported as [`DissolveError::KernelPanic`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoKernel;

impl GeometryKernel for GeoKernel {
    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        ensure_finite(a)?;
        ensure_finite(b)?;

        let merged = guarded("union", || BooleanOps::union(a, b))?;
        if merged.0.is_empty() {
            return Err(DissolveError::EmptyResult("union"));
        }
        Ok(merged)
    }

    fn zero_buffer(&self, geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        ensure_finite(geometry)?;

        let mut buffered = guarded("zero buffer", || Buffer::buffer(geometry, 0.0))?;
        if buffered.0.is_empty() {
            buffered = guarded("zero buffer", || unary_union(geometry.0.iter()))?;
        }
        if buffered.0.is_empty() {
            return Err(DissolveError::EmptyResult("zero buffer"));
        }
        Ok(buffered)
    }
}

fn ensure_finite(geometry: &MultiPolygon<f64>) -> Result<()> {
    let bad = geometry
        .0
        .iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .flat_map(|ring| ring.coords())
        .find(|c| !c.x.is_finite() || !c.y.is_finite());

    match bad {
        Some(c) => Err(DissolveError::NonFiniteCoordinate { x: c.x, y: c.y }),
        None => Ok(()),
    }
}

fn guarded<T>(operation: &'static str, f: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        DissolveError::KernelPanic { operation, message }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    fn unit_square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ]])
    }

    #[test]
    fn test_union_of_adjacent_squares() {
        let merged = GeoKernel.union(&unit_square(0.0, 0.0), &unit_square(1.0, 0.0)).unwrap();
        assert!((merged.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_of_overlapping_squares() {
        let a = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ]]);
        // 0.25 of the unit square overlaps the 2x2 square
        let merged = GeoKernel.union(&a, &unit_square(1.5, 1.5)).unwrap();
        assert!((merged.unsigned_area() - 4.75).abs() < 1e-9);
    }

    #[test]
    fn test_union_rejects_nan() {
        let bad = unit_square(f64::NAN, 0.0);
        let result = GeoKernel.union(&unit_square(0.0, 0.0), &bad);
        assert!(matches!(result, Err(DissolveError::NonFiniteCoordinate { .. })));
    }

    #[test]
    fn test_zero_buffer_keeps_square_area() {
        let buffered = GeoKernel.zero_buffer(&unit_square(3.0, 3.0)).unwrap();
        assert_eq!(buffered.0.len(), 1);
        assert!((buffered.unsigned_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_buffer_of_degenerate_ring_is_empty() {
        let sliver = MultiPolygon::new(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]]);
        assert!(matches!(
            GeoKernel.zero_buffer(&sliver),
            Err(DissolveError::EmptyResult("zero buffer"))
        ));
    }

    #[test]
    fn test_zero_buffer_resolves_bowtie() {
        let bowtie = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 1.0, y: 0.0),
            (x: 0.0, y: 1.0),
        ]]);

        let repaired = GeoKernel.zero_buffer(&bowtie).unwrap();
        assert!(!repaired.0.is_empty());
        assert!(repaired.unsigned_area() > 0.0);
        assert!(repaired.unsigned_area() <= 0.5 + 1e-9);
    }

    #[test]
    fn test_zero_buffer_rejects_infinity() {
        let bad = unit_square(0.0, f64::INFINITY);
        assert!(GeoKernel.zero_buffer(&bad).is_err());
    }

    #[test]
    fn test_guarded_converts_panic() {
        let result: Result<()> = guarded("test", || panic!("boom"));
        match result {
            Err(DissolveError::KernelPanic { operation, message }) => {
                assert_eq!(operation, "test");
                assert_eq!(message, "boom");
            }
            other => panic!("Expected KernelPanic, got {:?}", other),
        }
    }
}
