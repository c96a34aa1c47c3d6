//! Render configuration: attribute keys per level and diagnostic limits
//!
//! Every field has a default, so a partial JSON document only overrides the
//! keys it names:
//!
//! ```json
//! { "division_key": "DNAME_2019", "enabled_levels": ["division", "parish"] }
//! ```

use crate::error::Result;
use crate::level::{AdminLevel, LevelSelection};
use serde::{Deserialize, Serialize};

/// Default number of skip records echoed to the log
pub const DEFAULT_SKIP_SAMPLE_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub division_key: String,
    pub subcounty_key: String,
    pub parish_key: String,
    pub village_key: String,

    /// Enumeration-area name, used when a village has no name of its own
    pub village_fallback_key: String,

    /// Name given to villages with neither key set
    pub village_placeholder: String,

    /// Skip records included in the diagnostic sample
    pub skip_sample_limit: usize,

    /// Message shown when no feature survives preprocessing
    pub empty_notice: String,

    pub enabled_levels: LevelSelection,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            division_key: "division-name".to_string(),
            subcounty_key: "subcounty-name".to_string(),
            parish_key: "parish-name".to_string(),
            village_key: "village-name".to_string(),
            village_fallback_key: "ea-name".to_string(),
            village_placeholder: "Village".to_string(),
            skip_sample_limit: DEFAULT_SKIP_SAMPLE_LIMIT,
            empty_notice: "No valid polygons to display".to_string(),
            enabled_levels: LevelSelection::all(),
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Property key that names a feature's unit at `level`
    pub fn key_for(&self, level: AdminLevel) -> &str {
        match level {
            AdminLevel::Division => &self.division_key,
            AdminLevel::Subcounty => &self.subcounty_key,
            AdminLevel::Parish => &self.parish_key,
            AdminLevel::Village => &self.village_key,
        }
    }

    pub fn with_levels(mut self, levels: LevelSelection) -> Self {
        self.enabled_levels = levels;
        self
    }
}
