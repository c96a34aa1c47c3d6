//! Error type shared by the conversion, kernel and loading layers
//!
//! None of these errors escape [`render_levels`](crate::render_levels); the
//! orchestrator turns each one into a skip record, a dropped group or a log
//! event.

use thiserror::Error;

/// Failures produced while converting, unioning or repairing geometries
#[derive(Debug, Error)]
pub enum DissolveError {
    /// Geometry kind the engine cannot union (points, lines, collections)
    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(&'static str),

    /// A position with fewer than two ordinates
    #[error("malformed position: expected [x, y], found {0} ordinate(s)")]
    MalformedPosition(usize),

    /// NaN or infinite ordinate fed to the geometry kernel
    #[error("non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },

    /// The third-party geometry operation panicked
    #[error("geometry kernel panicked during {operation}: {message}")]
    KernelPanic {
        operation: &'static str,
        message: String,
    },

    /// A kernel operation returned no polygons
    #[error("{0} produced an empty geometry")]
    EmptyResult(&'static str),

    /// A repair produced polygons whose rings are still too short
    #[error("repaired geometry is still structurally invalid")]
    InvalidRepair,

    /// The raw source document could not be parsed
    #[error("failed to parse GeoJSON source: {0}")]
    Source(#[from] geojson::Error),

    /// Invalid render configuration document
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read GeoJSON source: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DissolveError>;
