//! Level orchestrator
//!
//! Runs one render pass over a raw feature collection:
//!
//! 1. Preprocess: drop features with no geometry, repair structurally
//!    invalid ones, skip the ones that cannot be repaired
//! 2. For division, subcounty and parish: group by the level's key and
//!    dissolve each group
//! 3. For village: pass every valid feature through under its village name
//! 4. Tag every output feature with exactly `{name, level}`
//!
//! Nothing here returns an error. Every failure ends as a [`SkipRecord`], a
//! [`DroppedGroup`], a log event, or the user-visible notice.

use crate::config::RenderConfig;
use crate::dissolve::dissolve_with_report;
use crate::group::{group_by_key, key_value};
use crate::kernel::{GeoKernel, GeometryKernel};
use crate::level::AdminLevel;
use crate::repair::try_repair;
use crate::validate::is_valid_feature;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use std::fmt;

/// Why a raw feature was excluded before grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingGeometry,
    RepairFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingGeometry => f.write_str("missing geometry"),
            SkipReason::RepairFailed => f.write_str("invalid geometry, repair failed"),
        }
    }
}

/// A raw feature excluded from the render, kept for diagnostics
#[derive(Debug, Clone)]
pub struct SkipRecord {
    /// Position in the raw collection
    pub index: usize,
    pub reason: SkipReason,
    pub original: Feature,
}

/// A unit whose group could not be dissolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedGroup {
    pub level: AdminLevel,
    pub name: String,
}

/// Features that survived preprocessing, plus the ones that did not
#[derive(Debug, Default)]
pub struct Preprocessed {
    pub valid: Vec<Feature>,
    pub skipped: Vec<SkipRecord>,
    /// How many of `valid` are zero-buffer repairs
    pub repaired: usize,
}

/// Receiver for the user-visible status message
pub trait StatusSink {
    fn show(&mut self, message: &str);
}

impl<F: FnMut(&str)> StatusSink for F {
    fn show(&mut self, message: &str) {
        self(message)
    }
}

/// Result of one render pass, replaced wholesale on the next one
///
/// A level that is disabled, or that produced no units, has no collection.
#[derive(Debug, Default)]
pub struct RenderOutput {
    pub divisions: Option<FeatureCollection>,
    pub subcounties: Option<FeatureCollection>,
    pub parishes: Option<FeatureCollection>,
    pub villages: Option<FeatureCollection>,
    pub skipped: Vec<SkipRecord>,
    pub dropped_groups: Vec<DroppedGroup>,
    /// Set when nothing could be displayed at all
    pub notice: Option<String>,
}

impl RenderOutput {
    pub fn collection(&self, level: AdminLevel) -> Option<&FeatureCollection> {
        match level {
            AdminLevel::Division => self.divisions.as_ref(),
            AdminLevel::Subcounty => self.subcounties.as_ref(),
            AdminLevel::Parish => self.parishes.as_ref(),
            AdminLevel::Village => self.villages.as_ref(),
        }
    }

    fn collection_mut(&mut self, level: AdminLevel) -> &mut Option<FeatureCollection> {
        match level {
            AdminLevel::Division => &mut self.divisions,
            AdminLevel::Subcounty => &mut self.subcounties,
            AdminLevel::Parish => &mut self.parishes,
            AdminLevel::Village => &mut self.villages,
        }
    }

    /// Produced collections in render order, coarsest level first
    pub fn layers(&self) -> Vec<(AdminLevel, &FeatureCollection)> {
        AdminLevel::ALL
            .into_iter()
            .filter_map(|level| self.collection(level).map(|c| (level, c)))
            .collect()
    }

    /// True when no level produced a collection
    pub fn is_empty(&self) -> bool {
        AdminLevel::ALL
            .into_iter()
            .all(|level| self.collection(level).is_none())
    }
}

/// Runs the preprocess, group and dissolve pipeline for every enabled level
#[derive(Debug, Clone, Default)]
pub struct LevelOrchestrator<K = GeoKernel> {
    config: RenderConfig,
    kernel: K,
}

impl LevelOrchestrator<GeoKernel> {
    pub fn new(config: RenderConfig) -> Self {
        Self::with_kernel(config, GeoKernel)
    }
}

impl<K: GeometryKernel> LevelOrchestrator<K> {
    pub fn with_kernel(config: RenderConfig, kernel: K) -> Self {
        Self { config, kernel }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render all enabled levels from the raw collection
    pub fn render(&self, raw: &FeatureCollection) -> RenderOutput {
        let _span = tracing::info_span!("render_levels", features = raw.features.len()).entered();

        let Preprocessed {
            valid,
            skipped,
            repaired,
        } = preprocess(&raw.features, &self.kernel);
        self.log_skips(&skipped, repaired);

        let mut output = RenderOutput {
            skipped,
            ..RenderOutput::default()
        };

        if valid.is_empty() {
            tracing::warn!("no valid polygons after preprocessing");
            output.notice = Some(self.config.empty_notice.clone());
            return output;
        }

        for level in self.config.enabled_levels.levels() {
            let units = if level.is_dissolved() {
                self.dissolve_level(level, &valid, &mut output.dropped_groups)
            } else {
                self.village_units(&valid)
            };

            tracing::debug!(admin_level = level.label(), units = units.len(), "level rendered");
            if !units.is_empty() {
                *output.collection_mut(level) = Some(FeatureCollection {
                    bbox: None,
                    features: units,
                    foreign_members: None,
                });
            }
        }

        output
    }

    /// [`render`](Self::render), also pushing the notice to a status sink
    pub fn render_to(&self, raw: &FeatureCollection, status: &mut dyn StatusSink) -> RenderOutput {
        let output = self.render(raw);
        if let Some(notice) = output.notice.as_deref() {
            status.show(notice);
        }
        output
    }

    fn dissolve_level(
        &self,
        level: AdminLevel,
        valid: &[Feature],
        dropped: &mut Vec<DroppedGroup>,
    ) -> Vec<Feature> {
        let groups = group_by_key(valid, self.config.key_for(level));
        let mut units = Vec::with_capacity(groups.len());

        for (name, members) in groups {
            match dissolve_with_report(&members, &self.kernel) {
                Some((merged, report)) => {
                    if report.dropped() > 0 {
                        tracing::info!(
                            admin_level = level.label(),
                            group = %name,
                            dropped = report.dropped(),
                            merged = report.contributed(),
                            "dissolved with features left out"
                        );
                    }
                    units.push(unit_feature(merged.geometry, &name, level));
                }
                None => {
                    tracing::warn!(admin_level = level.label(), group = %name, "group could not be dissolved");
                    dropped.push(DroppedGroup { level, name });
                }
            }
        }

        units
    }

    fn village_units(&self, valid: &[Feature]) -> Vec<Feature> {
        valid
            .iter()
            .map(|feature| {
                let name = key_value(feature, &self.config.village_key)
                    .or_else(|| key_value(feature, &self.config.village_fallback_key))
                    .unwrap_or_else(|| self.config.village_placeholder.clone());
                unit_feature(feature.geometry.clone(), &name, AdminLevel::Village)
            })
            .collect()
    }

    fn log_skips(&self, skipped: &[SkipRecord], repaired: usize) {
        if repaired > 0 {
            tracing::info!(repaired, "features repaired with zero buffer");
        }
        if skipped.is_empty() {
            return;
        }

        tracing::warn!(
            skipped = skipped.len(),
            sample = skipped.len().min(self.config.skip_sample_limit),
            "features skipped during preprocessing"
        );
        for record in skipped.iter().take(self.config.skip_sample_limit) {
            tracing::warn!(index = record.index, reason = %record.reason, "skipped feature");
        }
    }
}

/// Render every level with the default configuration and the `geo` kernel
pub fn render_levels(raw: &FeatureCollection) -> RenderOutput {
    LevelOrchestrator::new(RenderConfig::default()).render(raw)
}

/// Split raw features into usable ones and skip records
///
/// Valid features are kept as they are, invalid ones are replaced by their
/// zero-buffer repair when it succeeds.
pub fn preprocess<K: GeometryKernel>(features: &[Feature], kernel: &K) -> Preprocessed {
    let mut out = Preprocessed::default();

    for (index, feature) in features.iter().enumerate() {
        if feature.geometry.is_none() {
            out.skipped.push(SkipRecord {
                index,
                reason: SkipReason::MissingGeometry,
                original: feature.clone(),
            });
            continue;
        }

        if is_valid_feature(feature) {
            out.valid.push(feature.clone());
            continue;
        }

        match try_repair(feature, kernel) {
            Some(repaired) => {
                out.repaired += 1;
                out.valid.push(repaired);
            }
            None => out.skipped.push(SkipRecord {
                index,
                reason: SkipReason::RepairFailed,
                original: feature.clone(),
            }),
        }
    }

    out
}

/// Sidebar text for an output unit, e.g. `Division: Central`
pub fn unit_label(feature: &Feature) -> String {
    let properties = feature.properties.as_ref();
    let text = |key: &str| {
        properties
            .and_then(|p| p.get(key))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    };

    let level = text("level")
        .and_then(AdminLevel::from_label)
        .map(|level| {
            let label = level.label();
            let mut chars = label.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .unwrap_or_else(|| "Unit".to_string());

    format!("{}: {}", level, text("name").unwrap_or("Unknown"))
}

fn unit_feature(geometry: Option<Geometry>, name: &str, level: AdminLevel) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), serde_json::json!(name));
    properties.insert("level".to_string(), serde_json::json!(level.label()));

    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(properties: serde_json::Value) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: properties.as_object().cloned(),
            foreign_members: None,
        }
    }

    #[test]
    fn test_unit_label() {
        let f = feature(serde_json::json!({"name": "Kawempe", "level": "division"}));
        assert_eq!(unit_label(&f), "Division: Kawempe");
    }

    #[test]
    fn test_unit_label_falls_back_to_unknown() {
        let f = feature(serde_json::json!({"level": "parish", "name": ""}));
        assert_eq!(unit_label(&f), "Parish: Unknown");

        let bare = feature(serde_json::json!(null));
        assert_eq!(unit_label(&bare), "Unit: Unknown");
    }

    #[test]
    fn test_skip_reason_text() {
        assert_eq!(SkipReason::MissingGeometry.to_string(), "missing geometry");
        assert_eq!(SkipReason::RepairFailed.to_string(), "invalid geometry, repair failed");
    }

    #[test]
    fn test_closure_status_sink() {
        let mut shown = Vec::new();
        let mut sink = |message: &str| shown.push(message.to_string());
        sink.show("No valid polygons to display");
        assert_eq!(shown, vec!["No valid polygons to display".to_string()]);
    }

    #[test]
    fn test_missing_geometry_is_skipped() {
        let features = vec![feature(serde_json::json!({"division-name": "Central"}))];
        let result = preprocess(&features, &GeoKernel);

        assert!(result.valid.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].reason, SkipReason::MissingGeometry);
        assert_eq!(result.skipped[0].index, 0);
    }
}
