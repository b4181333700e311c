// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::parse::{has_hex_prefix, parse_declarations, Declaration};
use super::{FlagSettings, RemapError, SurfaceProperties};
use crate::bco::MaterialEntry;
use crate::mesh::FloorType;

/// Resolved remap table.
///
/// Built once per export run and passed explicitly to ingestion and to the
/// material-table builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    flags: BTreeMap<FloorType, FlagSettings>,
    names: BTreeMap<String, SurfaceProperties>,
}

impl RemapTable {
    /// Parses remap text.
    pub fn parse(text: &str) -> Result<Self, RemapError> {
        let decls = parse_declarations(text)?;
        let mut table = Self::default();

        // Pass 1: bare flags.
        for decl in &decls {
            if let Declaration::Flag {
                line,
                floor_type,
                settings,
            } = decl
            {
                if table.flags.insert(*floor_type, *settings).is_some() {
                    warn!(line, flag = %floor_type, "duplicate flag declaration, last one wins");
                }
            }
        }

        // Pass 2: names, inheriting from the flags above.
        for decl in decls {
            if let Declaration::Name {
                line,
                name,
                floor_type,
                extra_flag,
                extra_settings,
            } = decl
            {
                let inherited = table.flags.get(&floor_type).copied().unwrap_or_default();
                let props = SurfaceProperties {
                    floor_type,
                    extra_flag: extra_flag.unwrap_or(inherited.extra_flag),
                    extra_settings: extra_settings.unwrap_or(inherited.extra_settings),
                };
                if table.names.insert(name.clone(), props).is_some() {
                    warn!(line, material = %name, "duplicate material declaration, last one wins");
                }
            }
        }

        Ok(table)
    }

    /// Reads and parses a remap file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RemapError> {
        let path = path.as_ref();
        let table = Self::parse(&fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            flags = table.flags.len(),
            names = table.names.len(),
            "loaded remap table"
        );
        Ok(table)
    }

    /// Bare-flag declaration for a floor type.
    pub fn flag(&self, floor_type: FloorType) -> Option<&FlagSettings> {
        self.flags.get(&floor_type)
    }

    /// Name declaration for a material.
    pub fn name(&self, material: &str) -> Option<&SurfaceProperties> {
        self.names.get(material)
    }

    /// Resolves a material name to surface properties.
    ///
    /// Looks the name up first, then reads the name itself as a hex floor
    /// type (`0x0100` or `0100`) inheriting that flag's settings. `None`
    /// means the material is visual-only.
    pub fn resolve(&self, material: &str) -> Option<SurfaceProperties> {
        if let Some(props) = self.names.get(material) {
            return Some(*props);
        }
        let floor_type = hex_floor_type(material)?;
        let inherited = self.flags.get(&floor_type).copied().unwrap_or_default();
        Some(SurfaceProperties {
            floor_type,
            extra_flag: inherited.extra_flag,
            extra_settings: inherited.extra_settings,
        })
    }

    /// One material entry per distinct floor type, ascending.
    ///
    /// Sound parameters come from the bare-flag declaration, or are zero.
    pub fn material_table(
        &self,
        floor_types: impl IntoIterator<Item = FloorType>,
    ) -> Vec<MaterialEntry> {
        floor_types
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|floor_type| {
                let sound = self
                    .flags
                    .get(&floor_type)
                    .and_then(|f| f.sound)
                    .unwrap_or_default();
                MaterialEntry::new(floor_type, sound)
            })
            .collect()
    }
}

fn hex_floor_type(name: &str) -> Option<FloorType> {
    let digits = if has_hex_prefix(name) { &name[2..] } else { name };
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok().map(FloorType)
}
