//! Administrative levels and level toggles

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the nested local-government levels, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    Division,
    Subcounty,
    Parish,
    Village,
}

impl AdminLevel {
    /// All levels in render order
    pub const ALL: [AdminLevel; 4] = [
        AdminLevel::Division,
        AdminLevel::Subcounty,
        AdminLevel::Parish,
        AdminLevel::Village,
    ];

    /// Value written to the `level` property of output features
    pub fn label(self) -> &'static str {
        match self {
            AdminLevel::Division => "division",
            AdminLevel::Subcounty => "subcounty",
            AdminLevel::Parish => "parish",
            AdminLevel::Village => "village",
        }
    }

    /// Villages are the finest granularity and pass through undissolved
    pub fn is_dissolved(self) -> bool {
        !matches!(self, AdminLevel::Village)
    }

    /// Parse a level label, case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(label.trim()))
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of levels the viewer currently has toggled on
///
/// A plain value: the renderer builds a new one from its checkboxes on every
/// change instead of mutating shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSelection {
    bits: u8,
}

impl LevelSelection {
    pub fn all() -> Self {
        Self::ALL_BITS
    }

    pub fn none() -> Self {
        Self { bits: 0 }
    }

    pub fn only(levels: &[AdminLevel]) -> Self {
        levels.iter().fold(Self::none(), |selection, level| selection.with(*level))
    }

    pub fn with(self, level: AdminLevel) -> Self {
        Self { bits: self.bits | level.bit() }
    }

    pub fn without(self, level: AdminLevel) -> Self {
        Self { bits: self.bits & !level.bit() }
    }

    /// Set or clear one level, as a checkbox change would
    pub fn toggled(self, level: AdminLevel, on: bool) -> Self {
        if on {
            self.with(level)
        } else {
            self.without(level)
        }
    }

    pub fn contains(self, level: AdminLevel) -> bool {
        self.bits & level.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Enabled levels in render order
    pub fn levels(self) -> Vec<AdminLevel> {
        AdminLevel::ALL
            .into_iter()
            .filter(|level| self.contains(*level))
            .collect()
    }

    const ALL_BITS: LevelSelection = LevelSelection { bits: 0b1111 };
}

impl Default for LevelSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<AdminLevel> for LevelSelection {
    fn from_iter<I: IntoIterator<Item = AdminLevel>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), |selection, level| selection.with(level))
    }
}

impl Serialize for LevelSelection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.levels().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LevelSelection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let levels = Vec::<AdminLevel>::deserialize(deserializer)?;
        Ok(levels.into_iter().collect())
    }
}
