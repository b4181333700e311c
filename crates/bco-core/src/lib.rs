// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Track collision index.
//!
//! `bco-core` turns an authored triangle mesh into a spatial collision index
//! and persists it in the big-endian BCO container (magic `"0003"`):
//!
//! - [`mesh`]: ingestion of a raw vertex/face list, floor-type assignment and
//!   derived per-triangle attributes.
//! - [`remap`]: the material-name to floor-type configuration table.
//! - [`grid`]: the uniform X/Z grid with quadtree refinement of crowded cells.
//! - [`bco`]: the binary codec (writer, reader, structural validation).
//! - [`query`]: height probes and free-look picking over a built index.
//!
//! Everything here is synchronous and allocation-only; a built
//! [`CollisionIndex`] or [`RuntimeCollision`] is immutable and can be shared
//! across threads behind an `Arc` and swapped wholesale on reload.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::multiple_crate_versions,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::too_many_lines,
    clippy::option_if_let_else,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::float_cmp
)]
// The file format mixes u8/u16/u32 fields with f32 geometry; narrowing casts
// are range-checked before they happen.

pub mod bco;
pub mod grid;
pub mod mesh;
pub mod query;
pub mod remap;

mod attributes;
mod export;
mod index;
mod settings;

pub use attributes::{quantize_normal, MinMaxLookup, QuantizeError, TriangleAttributes};
pub use bco::{read_bco, validate_index, write_bco, BcoFile, EncodeError, ReadError};
pub use export::{export_mesh, Export, ExportError};
pub use grid::{build, build_from_mesh, BuildError, BuildParams, Grid, GridLayout, LeafView, Node};
pub use index::CollisionIndex;
pub use mesh::{Face, FloorType, IndexBase, IngestError, Ingested, Mesh, MeshInput, Triangle};
pub use query::{GroundHit, PickHit, QueryEngine, RuntimeCollision, TriangleSource};
pub use remap::{FlagSettings, RemapError, RemapTable, SoundSettings, SurfaceProperties};
pub use settings::{ExportSettings, SettingsError};
