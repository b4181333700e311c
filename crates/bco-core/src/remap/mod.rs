// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Material-name to floor-type configuration ("remap" table).
//!
//! The table is plain text, one declaration per line, `#` starts a comment:
//!
//! ```text
//! # bare flag: settings word, extra byte, optional sound tuple
//! 0x0100 = 0x10, 2, (7, 100, 200)
//! # material name: floor type, extra byte, extra settings
//! asphalt = 0x0100
//! gravel  = 0x0201, 1, 0x44
//! ```
//!
//! A name line that omits its extra byte or extra settings inherits them from
//! the bare-flag line for the same floor type (or 0). Parsing is two-pass so
//! declaration order does not matter. Duplicate keys log a warning and the
//! last declaration wins.

mod parse;
mod table;

use std::io;

use thiserror::Error;

use crate::mesh::FloorType;

pub use table::RemapTable;

/// Physics tags assigned to a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceProperties {
    /// Surface code.
    pub floor_type: FloorType,
    /// Extra byte flag.
    pub extra_flag: u8,
    /// 32-bit settings word.
    pub extra_settings: u32,
}

/// Sound parameters written to the material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoundSettings {
    /// Sound identifier.
    pub sound_id: i16,
    /// First sound parameter.
    pub setting_a: u32,
    /// Second sound parameter.
    pub setting_b: u32,
}

/// A bare-flag declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagSettings {
    /// Settings word inherited by material names.
    pub extra_settings: u32,
    /// Extra byte inherited by material names.
    pub extra_flag: u8,
    /// Sound tuple, if declared.
    pub sound: Option<SoundSettings>,
}

/// Errors produced while loading a remap table.
#[derive(Debug, Error)]
pub enum RemapError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A line does not follow the grammar.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What is wrong.
        message: String,
    },
}
