// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! BCO collision file format.
//!
//! All integers are big-endian. A file is laid out as:
//!
//! | Section | Size | Notes |
//! |---------|------|-------|
//! | Header | 44 | magic `"0003"`, grid layout, section offsets |
//! | Grid table | 8 per node | root cells row-major, then subdivisions breadth-first |
//! | Triangle indices | 2 per slot | padded to 4 bytes with one `0x0000` slot |
//! | Triangles | 36 per record | mesh order |
//! | Vertices | 12 per vertex | `f32` x, y, z |
//! | Materials | 12 per entry | ascending floor type |
//!
//! A grid entry is `u8 leafCount, u8 pad, u16 childBase, u32 firstSlot`.
//! `leafCount == 0` with `childBase == 0xFFFF` is an empty leaf; any other
//! `childBase` with `leafCount == 0` points at four contiguous children.
//!
//! # Usage
//!
//! ```rust,no_run
//! use bco_core::{read_bco, write_bco, BcoFile, ReadError};
//!
//! # fn main() -> Result<(), ReadError> {
//! let file = BcoFile::open("track.bco")?;
//! let height = file.index().query().height_below(120.0, -40.0, f32::INFINITY);
//! println!("ground at {height:?}");
//! # Ok(())
//! # }
//! ```

mod codec;
mod read;
mod types;
mod validate;
mod write;

pub use read::{read_bco, read_header, BcoFile, ReadError};
pub use types::{
    BcoHeader, GridEntry, MaterialEntry, TriangleRecord, GRID_ENTRY_SIZE, HEADER_SIZE, MAGIC,
    MATERIAL_RECORD_SIZE, MAX_LEAF_TRIANGLES, MAX_TRIANGLES, NO_CHILDREN, NO_NEIGHBOR,
    TRIANGLE_RECORD_SIZE, TRIANGLE_SLOT_SIZE, VERTEX_RECORD_SIZE,
};
pub use validate::validate_index;
pub use write::{write_bco, EncodeError};
