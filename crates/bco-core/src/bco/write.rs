// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! BCO writer.
//!
//! The output is a pure function of the index: same index, same bytes.

use thiserror::Error;
use tracing::{debug, instrument};

use super::codec::{Encode, Writer};
use super::types::{
    BcoHeader, GridEntry, GRID_ENTRY_SIZE, HEADER_SIZE, MATERIAL_RECORD_SIZE, MAX_LEAF_TRIANGLES,
    MAX_TRIANGLES, NO_CHILDREN, TRIANGLE_RECORD_SIZE, TRIANGLE_SLOT_SIZE, VERTEX_RECORD_SIZE,
};
use crate::grid::Node;
use crate::index::CollisionIndex;

/// Values the file format cannot represent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Triangle slots are 16-bit.
    #[error("{count} triangles exceed the format limit of {max}")]
    TooManyTriangles {
        /// Triangles in the index.
        count: usize,
        /// Limit.
        max: usize,
    },

    /// Grid dimensions are 16-bit.
    #[error("grid of {cells_x}x{cells_z} cells exceeds 65535 per axis")]
    GridTooLarge {
        /// Cells along X.
        cells_x: u32,
        /// Cells along Z.
        cells_z: u32,
    },

    /// Child indices are 16-bit with `0xFFFF` reserved.
    #[error("node table of {count} entries exceeds the format limit of {max}")]
    TooManyNodes {
        /// Nodes in the table.
        count: usize,
        /// Limit.
        max: usize,
    },

    /// Leaf counts are 8-bit.
    #[error("leaf {node} holds {count} triangles, the format allows {max}")]
    LeafTooLarge {
        /// Node-table index.
        node: usize,
        /// Triangles in the leaf.
        count: usize,
        /// Limit.
        max: usize,
    },

    /// A slot references a triangle beyond the 16-bit range.
    #[error("slot {slot} references triangle {triangle}, beyond the 16-bit slot range")]
    SlotOutOfRange {
        /// Slot position.
        slot: usize,
        /// Referenced triangle.
        triangle: u32,
    },

    /// Material count is 16-bit.
    #[error("{count} materials exceed the format limit of 65535")]
    TooManyMaterials {
        /// Materials in the table.
        count: usize,
    },

    /// Section offsets are 32-bit.
    #[error("file of {size} bytes exceeds the 32-bit offset range")]
    FileTooLarge {
        /// Required size.
        size: u64,
    },
}

/// Serializes `index` to BCO bytes.
#[instrument(skip_all, fields(triangles = index.triangles().len(), nodes = index.grid().nodes().len()))]
pub fn write_bco(index: &CollisionIndex) -> Result<Vec<u8>, EncodeError> {
    let grid = index.grid();
    let layout = grid.layout();

    let triangle_count = index.triangles().len();
    if triangle_count > MAX_TRIANGLES {
        return Err(EncodeError::TooManyTriangles {
            count: triangle_count,
            max: MAX_TRIANGLES,
        });
    }
    let too_large = || EncodeError::GridTooLarge {
        cells_x: layout.cells_x,
        cells_z: layout.cells_z,
    };
    let grid_x = u16::try_from(layout.cells_x).map_err(|_| too_large())?;
    let grid_z = u16::try_from(layout.cells_z).map_err(|_| too_large())?;
    let material_count =
        u16::try_from(index.materials().len()).map_err(|_| EncodeError::TooManyMaterials {
            count: index.materials().len(),
        })?;

    let nodes = grid.nodes();
    if nodes.len() > usize::from(NO_CHILDREN) {
        return Err(EncodeError::TooManyNodes {
            count: nodes.len(),
            max: usize::from(NO_CHILDREN),
        });
    }
    let entries = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| grid_entry(i, node))
        .collect::<Result<Vec<_>, _>>()?;
    let slots = grid
        .slots()
        .iter()
        .enumerate()
        .map(|(slot, &triangle)| {
            u16::try_from(triangle).map_err(|_| EncodeError::SlotOutOfRange { slot, triangle })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let padded_slots = slots.len() + slots.len() % 2;

    // Section offsets.
    let indices_off = HEADER_SIZE as u64 + (entries.len() * GRID_ENTRY_SIZE) as u64;
    let triangles_off = indices_off + (padded_slots * TRIANGLE_SLOT_SIZE) as u64;
    let vertices_off = triangles_off + (triangle_count * TRIANGLE_RECORD_SIZE) as u64;
    let materials_off = vertices_off + (index.vertices().len() * VERTEX_RECORD_SIZE) as u64;
    let total = materials_off + (index.materials().len() * MATERIAL_RECORD_SIZE) as u64;
    let offset = |value: u64| u32::try_from(value).map_err(|_| EncodeError::FileTooLarge { size: total });
    // Every section starts at or before `total`, so checking it covers them all.
    offset(total)?;

    let header = BcoHeader {
        grid_x,
        grid_z,
        origin_x: layout.origin_x,
        origin_z: layout.origin_z,
        cell_size_x: layout.cell_size_x,
        cell_size_z: layout.cell_size_z,
        material_count,
        triangle_indices_offset: offset(indices_off)?,
        triangles_offset: offset(triangles_off)?,
        vertices_offset: offset(vertices_off)?,
        materials_offset: offset(materials_off)?,
    };

    let mut w = Writer::with_capacity(total as usize);
    header.encode(&mut w);
    for entry in &entries {
        entry.encode(&mut w);
    }
    for &slot in &slots {
        w.write_u16(slot);
    }
    if padded_slots != slots.len() {
        w.write_u16(0);
    }
    for tri in index.triangles() {
        tri.encode(&mut w);
    }
    for v in index.vertices() {
        w.write_f32(v.x());
        w.write_f32(v.y());
        w.write_f32(v.z());
    }
    for material in index.materials() {
        material.encode(&mut w);
    }

    debug_assert_eq!(w.len() as u64, total, "section offsets disagree with output");
    debug!(bytes = total, slots = slots.len(), "encoded collision file");
    Ok(w.into_vec())
}

fn grid_entry(index: usize, node: &Node) -> Result<GridEntry, EncodeError> {
    match *node {
        Node::Leaf { first_slot, count } => {
            let leaf_count = u8::try_from(count).map_err(|_| EncodeError::LeafTooLarge {
                node: index,
                count,
                max: MAX_LEAF_TRIANGLES,
            })?;
            let triangle_group = u32::try_from(first_slot).map_err(|_| EncodeError::FileTooLarge {
                size: first_slot as u64,
            })?;
            Ok(GridEntry {
                leaf_count,
                child_base: if count == 0 { NO_CHILDREN } else { 0 },
                triangle_group,
            })
        }
        Node::Branch { first_child } => {
            let child_base = u16::try_from(first_child)
                .ok()
                .filter(|&c| c != NO_CHILDREN)
                .ok_or(EncodeError::TooManyNodes {
                    count: first_child.saturating_add(4),
                    max: usize::from(NO_CHILDREN),
                })?;
            Ok(GridEntry {
                leaf_count: 0,
                child_base,
                triangle_group: 0,
            })
        }
    }
}
