//! # geo-dissolve
//!
//! Dissolves GeoJSON administrative-boundary features into one polygon per
//! unit, for the nested levels of Kampala's local government: division,
//! subcounty, parish and village.
//!
//! Village-level features carry the name of every unit they belong to. For
//! each level, features are grouped by that level's name attribute and each
//! group is merged by pairwise union. Malformed rings are repaired with a
//! zero-distance buffer; features that still refuse to merge are dropped from
//! their group instead of failing the whole unit.
//!
//! ## Pipeline
//!
//! | Stage | Function | Failure becomes |
//! |-------|----------|-----------------|
//! | Validate | [`is_valid_polygon`] | repair attempt |
//! | Repair | [`try_repair`] | [`SkipRecord`] |
//! | Group | [`group_by_key`] | feature left ungrouped |
//! | Dissolve | [`dissolve`] | [`MergeStep::Dropped`] / [`DroppedGroup`] |
//! | Orchestrate | [`render_levels`] | [`RenderOutput::notice`] |
//!
//! Nothing in the pipeline returns an error to the caller of
//! [`render_levels`]; it always yields whatever partial result was reachable.
//!
//! ## Examples
//!
//! ### Render every level
//!
//! ```rust,ignore
//! use geo_dissolve::{parse_feature_collection, render_levels};
//!
//! let raw = parse_feature_collection(&std::fs::read_to_string("kampala.geojson")?)?;
//! let output = render_levels(&raw);
//!
//! for (level, collection) in output.layers() {
//!     println!("{}: {} units", level, collection.features.len());
//! }
//! if let Some(notice) = &output.notice {
//!     eprintln!("{}", notice);
//! }
//! ```
//!
//! ### Only the levels toggled on, with custom keys
//!
//! ```rust,ignore
//! use geo_dissolve::{AdminLevel, LevelOrchestrator, LevelSelection, RenderConfig};
//!
//! let config = RenderConfig::from_json(r#"{ "division_key": "DNAME" }"#)?
//!     .with_levels(LevelSelection::only(&[AdminLevel::Division, AdminLevel::Parish]));
//!
//! let output = LevelOrchestrator::new(config).render(&raw);
//! assert!(output.villages.is_none());
//! ```
//!
//! ### Dissolve a single group
//!
//! ```rust,ignore
//! use geo_dissolve::{dissolve, group_by_key, GeoKernel};
//!
//! let groups = group_by_key(&raw.features, "division-name");
//! if let Some(central) = groups.get("Central") {
//!     let merged = dissolve(central, &GeoKernel);
//! }
//! ```
//!
//! ## Geometry kernel
//!
//! Union and zero buffer are reached through the [`GeometryKernel`] trait.
//! [`GeoKernel`] implements it with the `geo` crate's boolean operations and
//! buffer. Union order follows input order, so overlapping inputs may merge
//! to slightly different topology if reordered.
//!
//! ## Logging
//!
//! Skip summaries, repair failures and per-group dissolve failures are
//! emitted as `tracing` events. The crate never installs a subscriber.

mod config;
mod convert;
mod dissolve;
mod error;
mod group;
mod kernel;
mod level;
mod render;
mod repair;
mod source;
mod validate;

pub use config::{RenderConfig, DEFAULT_SKIP_SAMPLE_LIMIT};
pub use convert::{feature_to_multi_polygon, from_multi_polygon, geometry_kind, to_multi_polygon};
pub use dissolve::{dissolve, dissolve_with_report, DissolveReport, MergeStep};
pub use error::{DissolveError, Result};
pub use group::{group_by_key, key_value, Groups};
pub use kernel::{GeoKernel, GeometryKernel};
pub use level::{AdminLevel, LevelSelection};
pub use render::{
    preprocess,
    render_levels,
    unit_label,
    DroppedGroup,
    LevelOrchestrator,
    Preprocessed,
    RenderOutput,
    SkipReason,
    SkipRecord,
    StatusSink,
};
pub use repair::try_repair;
pub use source::{load_feature_collection, parse_feature_collection, SourceCache};
pub use validate::{is_valid_feature, is_valid_polygon, MIN_RING_POSITIONS};
