//! Zero-buffer repair of union-hostile features

use crate::convert::{feature_to_multi_polygon, from_multi_polygon};
use crate::error::{DissolveError, Result};
use crate::kernel::GeometryKernel;
use crate::validate::is_valid_polygon;
use geo::MultiPolygon;
use geojson::Feature;

/// Try to repair a feature's geometry with a zero-distance buffer
///
/// Returns a new feature carrying the repaired geometry and the original
/// properties, or `None` when conversion or buffering fails or the buffered
/// geometry is still structurally invalid. Failure is an expected outcome
/// and is only logged.
pub fn try_repair<K: GeometryKernel>(feature: &Feature, kernel: &K) -> Option<Feature> {
    let repaired = feature_to_multi_polygon(feature)
        .and_then(|multi| kernel.zero_buffer(&multi))
        .map(|multi| from_multi_polygon(&multi));

    match repaired {
        Ok(geometry) if is_valid_polygon(Some(&geometry)) => Some(Feature {
            bbox: None,
            geometry: Some(geometry),
            id: feature.id.clone(),
            properties: feature.properties.clone(),
            foreign_members: None,
        }),
        Ok(_) => {
            tracing::debug!("zero-buffer repair produced a structurally invalid geometry");
            None
        }
        Err(err) => {
            tracing::debug!(error = %err, "zero-buffer repair failed");
            None
        }
    }
}

/// Repair an operand already in kernel form
///
/// Used by the dissolve engine when a union fails. The buffered result must
/// still pass the structural check once converted back to GeoJSON.
pub(crate) fn repair_multi_polygon<K: GeometryKernel>(
    multi: &MultiPolygon<f64>,
    kernel: &K,
) -> Result<MultiPolygon<f64>> {
    let buffered = kernel.zero_buffer(multi)?;
    if is_valid_polygon(Some(&from_multi_polygon(&buffered))) {
        Ok(buffered)
    } else {
        Err(DissolveError::InvalidRepair)
    }
}
