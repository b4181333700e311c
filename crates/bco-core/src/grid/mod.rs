// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Uniform X/Z grid with quadtree refinement.
//!
//! # Node table
//!
//! Nodes live in one flat table, the same order the BCO grid section uses:
//!
//! - `gridX * gridZ` root cells first, row-major (`x + z * gridX`);
//! - then every subdivision, appended breadth-first as it happens, four
//!   contiguous children per split in quadrant order `q = qx + 2 * qz`.
//!
//! Leaves reference a contiguous run of triangle slots; slots hold indices
//! into the triangle array, never triangle copies.
//!
//! # Builders
//!
//! [`build`] takes explicit [`BuildParams`]. Export uses a shallow tree and a
//! hard leaf ceiling so the result fits the file format;
//! [`build_from_mesh`] uses [`BuildParams::runtime`] (deep tree, no ceiling)
//! for in-memory editor queries. Both run the same algorithm.

mod build;
mod node;
mod params;

pub use build::{build, build_from_mesh, BuildError};
pub use node::{Grid, GridLayout, LeafView, Node};
pub use params::{BuildParams, HARD_TRIANGLE_CEILING};
