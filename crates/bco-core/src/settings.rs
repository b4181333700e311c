// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Export settings, persisted as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{BuildParams, HARD_TRIANGLE_CEILING};
use crate::mesh::IndexBase;

/// Error type for settings operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong.
        reason: String,
    },
}

/// Knobs of one export run.
///
/// Missing JSON fields take their defaults, so `{}` is a valid file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    /// Top-level cell edge length.
    pub cell_size: i32,
    /// Quadtree levels below the top-level cells.
    pub max_depth: u32,
    /// Split threshold.
    pub max_tri_count: usize,
    /// Swap Y and Z of the input (Z-up authoring tools).
    pub flip_yz: bool,
    /// Base of face indices in the input mesh.
    pub index_base: IndexBase,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            cell_size: 1000,
            max_depth: 2,
            max_tri_count: 20,
            flip_yz: false,
            index_base: IndexBase::One,
        }
    }
}

impl ExportSettings {
    /// Parses and validates settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Writes settings as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Checks ranges the builder relies on.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cell_size <= 0 {
            return Err(SettingsError::Invalid {
                field: "cell_size",
                reason: format!("{} is not positive", self.cell_size),
            });
        }
        if self.max_tri_count == 0 || self.max_tri_count > HARD_TRIANGLE_CEILING {
            return Err(SettingsError::Invalid {
                field: "max_tri_count",
                reason: format!(
                    "{} is outside 1..={HARD_TRIANGLE_CEILING}",
                    self.max_tri_count
                ),
            });
        }
        Ok(())
    }

    /// Builder parameters for a file export.
    pub fn build_params(&self) -> BuildParams {
        BuildParams::export(self.cell_size, self.max_depth, self.max_tri_count)
    }
}
