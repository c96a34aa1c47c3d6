//! Safe dissolve engine
//!
//! Folds a group of features into one geometry by pairwise union, in input
//! order. When a union fails, both operands are repaired with a zero buffer
//! and the union is retried once. When the retry also fails, the incoming
//! feature is dropped and the accumulator is kept as it was, so one bad
//! feature costs only its own contribution to the unit's boundary.
//!
//! Union order follows the input order. Overlapping inputs can produce
//! different topology under a different order; no sorting is applied.

use crate::convert::{feature_to_multi_polygon, from_multi_polygon};
use crate::error::DissolveError;
use crate::kernel::GeometryKernel;
use crate::repair::repair_multi_polygon;
use geo::MultiPolygon;
use geojson::Feature;
use std::borrow::Borrow;

/// Outcome of folding one feature into the accumulator
#[derive(Debug)]
pub enum MergeStep {
    /// Union succeeded on the first attempt
    Merged { index: usize },

    /// Union succeeded after zero-buffer repair of one or both operands
    MergedAfterRepair {
        index: usize,
        accumulator_repaired: bool,
        operand_repaired: bool,
    },

    /// Union failed twice; the feature at `index` contributes nothing
    Dropped { index: usize, error: DissolveError },

    /// The feature's geometry could not be converted for the kernel
    Unconvertible { index: usize, error: DissolveError },
}

impl MergeStep {
    /// Position of the feature in the input list
    pub fn index(&self) -> usize {
        match self {
            MergeStep::Merged { index }
            | MergeStep::MergedAfterRepair { index, .. }
            | MergeStep::Dropped { index, .. }
            | MergeStep::Unconvertible { index, .. } => *index,
        }
    }

    /// Whether the feature ended up in the merged geometry
    pub fn contributed(&self) -> bool {
        matches!(self, MergeStep::Merged { .. } | MergeStep::MergedAfterRepair { .. })
    }
}

/// Per-feature record of one dissolve run
#[derive(Debug, Default)]
pub struct DissolveReport {
    /// Index of the feature the accumulator started from
    pub seed: Option<usize>,
    pub steps: Vec<MergeStep>,
}

impl DissolveReport {
    /// Number of features in the result, seed included
    pub fn contributed(&self) -> usize {
        self.seed.map(|_| 1).unwrap_or(0) + self.steps.iter().filter(|s| s.contributed()).count()
    }

    pub fn repaired(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, MergeStep::MergedAfterRepair { .. }))
            .count()
    }

    /// Features that were left out of the result
    pub fn dropped(&self) -> usize {
        self.steps.iter().filter(|s| !s.contributed()).count()
    }
}

/// Merge all features into a single feature
///
/// Returns `None` for an empty list or when no feature has a geometry the
/// kernel accepts. The result carries the first feature's properties.
pub fn dissolve<F, K>(features: &[F], kernel: &K) -> Option<Feature>
where
    F: Borrow<Feature>,
    K: GeometryKernel,
{
    dissolve_with_report(features, kernel).map(|(feature, _)| feature)
}

/// [`dissolve`], also returning what happened to each input feature
pub fn dissolve_with_report<F, K>(features: &[F], kernel: &K) -> Option<(Feature, DissolveReport)>
where
    F: Borrow<Feature>,
    K: GeometryKernel,
{
    let mut report = DissolveReport::default();

    // Convert every operand up front
    let mut operands: Vec<(usize, MultiPolygon<f64>)> = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        let feature: &Feature = feature.borrow();
        match feature_to_multi_polygon(feature) {
            Ok(multi) => operands.push((index, multi)),
            Err(error) => {
                tracing::warn!(index, error = %error, "skipping feature the kernel cannot represent");
                report.steps.push(MergeStep::Unconvertible { index, error });
            }
        }
    }

    let mut operands = operands.into_iter();
    let (seed, mut accumulator) = operands.next()?;
    report.seed = Some(seed);
    let mut merged_any = false;

    for (index, operand) in operands {
        let (next, step) = merge_step(index, &accumulator, &operand, kernel);
        if let Some(next) = next {
            accumulator = next;
            merged_any = true;
        }
        report.steps.push(step);
    }

    let first: &Feature = features[seed].borrow();
    let geometry = if merged_any {
        Some(from_multi_polygon(&accumulator))
    } else {
        first.geometry.clone()
    };

    let feature = Feature {
        bbox: None,
        geometry,
        id: None,
        properties: first.properties.clone(),
        foreign_members: None,
    };

    Some((feature, report))
}

/// One fold step: union, then repair-and-retry, then drop
fn merge_step<K: GeometryKernel>(
    index: usize,
    accumulator: &MultiPolygon<f64>,
    operand: &MultiPolygon<f64>,
    kernel: &K,
) -> (Option<MultiPolygon<f64>>, MergeStep) {
    let first_error = match kernel.union(accumulator, operand) {
        Ok(merged) => return (Some(merged), MergeStep::Merged { index }),
        Err(error) => error,
    };
    tracing::debug!(index, error = %first_error, "union failed, repairing both operands");

    let repaired_accumulator = repair_multi_polygon(accumulator, kernel).ok();
    let repaired_operand = repair_multi_polygon(operand, kernel).ok();

    let retry = kernel.union(
        repaired_accumulator.as_ref().unwrap_or(accumulator),
        repaired_operand.as_ref().unwrap_or(operand),
    );

    match retry {
        Ok(merged) => (
            Some(merged),
            MergeStep::MergedAfterRepair {
                index,
                accumulator_repaired: repaired_accumulator.is_some(),
                operand_repaired: repaired_operand.is_some(),
            },
        ),
        Err(error) => {
            tracing::warn!(index, error = %error, "union failed after repair, dropping feature from merge");
            (None, MergeStep::Dropped { index, error })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::GeoKernel;
    use geojson::{Geometry, JsonObject, Value};

    fn square_feature(x: f64, y: f64, name: &str) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("name".to_string(), serde_json::json!(name));
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![vec![
                vec![x, y],
                vec![x + 1.0, y],
                vec![x + 1.0, y + 1.0],
                vec![x, y + 1.0],
                vec![x, y],
            ]]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    #[test]
    fn test_empty_input_returns_none() {
        let features: Vec<Feature> = Vec::new();
        assert!(dissolve(&features, &GeoKernel).is_none());
    }

    #[test]
    fn test_single_feature_keeps_geometry_verbatim() {
        let only = square_feature(2.0, 3.0, "only");
        let result = dissolve(&[&only], &GeoKernel).unwrap();

        assert_eq!(result.geometry, only.geometry);
        assert_eq!(result.properties, only.properties);
    }

    #[test]
    fn test_first_feature_properties_are_kept() {
        let features = vec![square_feature(0.0, 0.0, "first"), square_feature(1.0, 0.0, "second")];
        let (result, report) = dissolve_with_report(&features, &GeoKernel).unwrap();

        assert_eq!(
            result.properties.unwrap().get("name"),
            Some(&serde_json::json!("first"))
        );
        assert_eq!(report.contributed(), 2);
        assert_eq!(report.dropped(), 0);
    }

    #[test]
    fn test_unconvertible_seed_is_skipped() {
        let mut point = square_feature(0.0, 0.0, "point");
        point.geometry = Some(Geometry::new(Value::Point(vec![0.0, 0.0])));
        let features = vec![point, square_feature(5.0, 5.0, "square")];

        let (result, report) = dissolve_with_report(&features, &GeoKernel).unwrap();
        assert_eq!(report.seed, Some(1));
        assert_eq!(report.dropped(), 1);
        assert_eq!(result.geometry, features[1].geometry);
    }

    #[test]
    fn test_nothing_convertible_returns_none() {
        let mut point = square_feature(0.0, 0.0, "point");
        point.geometry = None;
        assert!(dissolve(&[point], &GeoKernel).is_none());
    }
}
