// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! BCO reader and error types.

use std::fs;
use std::io;
use std::path::Path;

use bco_geom::Vec3;
use thiserror::Error;
use tracing::debug;

use super::codec::{Decode, Reader};
use super::types::{
    BcoHeader, GridEntry, MaterialEntry, TriangleRecord, GRID_ENTRY_SIZE, HEADER_SIZE,
    MATERIAL_RECORD_SIZE, NO_CHILDREN, TRIANGLE_RECORD_SIZE, TRIANGLE_SLOT_SIZE,
    VERTEX_RECORD_SIZE,
};
use super::validate::validate_index;
use crate::grid::{Grid, GridLayout, Node};
use crate::index::CollisionIndex;

/// Errors that can occur when reading or validating BCO files.
#[derive(Debug, Error)]
pub enum ReadError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The buffer ends inside a section.
    #[error("unexpected end of data in {section}: need {needed} bytes at offset {offset}, {available} available")]
    UnexpectedEof {
        /// Section being read.
        section: &'static str,
        /// Read position.
        offset: u64,
        /// Bytes requested.
        needed: u64,
        /// Bytes left.
        available: u64,
    },

    /// Magic bytes don't match.
    #[error("invalid magic: expected {expected:?}, got {actual:?}")]
    BadMagic {
        /// Expected magic bytes.
        expected: [u8; 4],
        /// Actual magic bytes found.
        actual: [u8; 4],
    },

    /// Header offsets or table contents are inconsistent.
    #[error("corrupt {section}: {reason}")]
    CorruptLayout {
        /// Section at fault.
        section: &'static str,
        /// What is inconsistent.
        reason: String,
    },
}

impl ReadError {
    pub(crate) fn corrupt(section: &'static str, reason: impl Into<String>) -> Self {
        Self::CorruptLayout {
            section,
            reason: reason.into(),
        }
    }
}

/// Record counts implied by a header and a file length.
struct Sections {
    nodes: usize,
    slots: usize,
    triangles: usize,
    vertices: usize,
}

/// Decodes only the header.
pub fn read_header(data: &[u8]) -> Result<BcoHeader, ReadError> {
    BcoHeader::decode(&mut Reader::at(data, 0, "header"))
}

/// Decodes and validates a BCO file.
///
/// The writer pads an odd slot count with one extra slot; a single trailing
/// slot that no leaf references is dropped here, so re-encoding reproduces
/// the input bytes.
pub fn read_bco(data: &[u8]) -> Result<CollisionIndex, ReadError> {
    decode_file(data).map(|(_, index)| index)
}

fn decode_file(data: &[u8]) -> Result<(BcoHeader, CollisionIndex), ReadError> {
    let header = read_header(data)?;
    let sections = sections(&header, data.len())?;

    let entries: Vec<GridEntry> = Reader::at(data, HEADER_SIZE, "grid").read_records(sections.nodes)?;
    let nodes: Vec<Node> = entries.iter().map(node_from_entry).collect();

    let mut slot_reader = Reader::at(data, header.triangle_indices_offset as usize, "triangle indices");
    let mut slots = (0..sections.slots)
        .map(|_| slot_reader.read_u16().map(u32::from))
        .collect::<Result<Vec<_>, _>>()?;
    let used = nodes
        .iter()
        .filter_map(|n| match *n {
            Node::Leaf { first_slot, count } if count > 0 => first_slot.checked_add(count),
            _ => None,
        })
        .max()
        .unwrap_or(0);
    if slots.len() % 2 == 0 && slots.len() == used + 1 {
        slots.pop();
    }

    let triangles: Vec<TriangleRecord> = Reader::at(data, header.triangles_offset as usize, "triangles")
        .read_records(sections.triangles)?;
    let mut vertex_reader = Reader::at(data, header.vertices_offset as usize, "vertices");
    let vertices = (0..sections.vertices)
        .map(|_| -> Result<Vec3, ReadError> {
            Ok(Vec3::new(
                vertex_reader.read_f32()?,
                vertex_reader.read_f32()?,
                vertex_reader.read_f32()?,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let materials: Vec<MaterialEntry> = Reader::at(data, header.materials_offset as usize, "materials")
        .read_records(usize::from(header.material_count))?;

    let layout = GridLayout {
        origin_x: header.origin_x,
        origin_z: header.origin_z,
        cell_size_x: header.cell_size_x,
        cell_size_z: header.cell_size_z,
        cells_x: u32::from(header.grid_x),
        cells_z: u32::from(header.grid_z),
    };
    let index = CollisionIndex::from_parts(
        Grid::from_parts(layout, nodes, slots),
        triangles,
        vertices,
        materials,
    );
    validate_index(&index)?;
    debug!(
        bytes = data.len(),
        nodes = sections.nodes,
        triangles = sections.triangles,
        vertices = sections.vertices,
        "decoded collision file"
    );
    Ok((header, index))
}

fn node_from_entry(entry: &GridEntry) -> Node {
    let first_slot = entry.triangle_group as usize;
    match (entry.leaf_count, entry.child_base) {
        (0, NO_CHILDREN) => Node::Leaf {
            first_slot,
            count: 0,
        },
        (0, child) => Node::Branch {
            first_child: usize::from(child),
        },
        (count, _) => Node::Leaf {
            first_slot,
            count: usize::from(count),
        },
    }
}

/// Checks cell sizes, section order and section sizes against the header
/// and the file length.
fn sections(header: &BcoHeader, len: usize) -> Result<Sections, ReadError> {
    if header.cell_size_x <= 0 || header.cell_size_z <= 0 {
        return Err(ReadError::corrupt(
            "header",
            format!(
                "cell size {}x{} is not positive",
                header.cell_size_x, header.cell_size_z
            ),
        ));
    }
    let indices = header.triangle_indices_offset as usize;
    let triangles = header.triangles_offset as usize;
    let vertices = header.vertices_offset as usize;
    let materials = header.materials_offset as usize;

    if !(HEADER_SIZE <= indices && indices <= triangles && triangles <= vertices && vertices <= materials) {
        return Err(ReadError::corrupt(
            "header",
            format!(
                "section offsets out of order: indices {indices}, triangles {triangles}, vertices {vertices}, materials {materials}"
            ),
        ));
    }
    let materials_len = usize::from(header.material_count) * MATERIAL_RECORD_SIZE;
    let end = materials + materials_len;
    if end > len {
        return Err(ReadError::UnexpectedEof {
            section: "materials",
            offset: materials as u64,
            needed: materials_len as u64,
            available: len.saturating_sub(materials) as u64,
        });
    }

    let count = |section: &'static str, bytes: usize, record: usize| {
        if bytes % record == 0 {
            Ok(bytes / record)
        } else {
            Err(ReadError::corrupt(
                section,
                format!("{bytes} bytes is not a multiple of the {record}-byte record"),
            ))
        }
    };
    let sections = Sections {
        nodes: count("grid", indices - HEADER_SIZE, GRID_ENTRY_SIZE)?,
        slots: count("triangle indices", triangles - indices, TRIANGLE_SLOT_SIZE)?,
        triangles: count("triangles", vertices - triangles, TRIANGLE_RECORD_SIZE)?,
        vertices: count("vertices", materials - vertices, VERTEX_RECORD_SIZE)?,
    };
    let roots = usize::from(header.grid_x) * usize::from(header.grid_z);
    if sections.nodes < roots {
        return Err(ReadError::corrupt(
            "grid",
            format!(
                "{} entries cannot hold {}x{} top-level cells",
                sections.nodes, header.grid_x, header.grid_z
            ),
        ));
    }
    Ok(sections)
}

/// A decoded BCO file.
#[derive(Debug, Clone)]
pub struct BcoFile {
    header: BcoHeader,
    index: CollisionIndex,
    size: usize,
}

impl BcoFile {
    /// Reads and decodes the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Decodes a file already in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ReadError> {
        let (header, index) = decode_file(data)?;
        Ok(Self {
            header,
            index,
            size: data.len(),
        })
    }

    /// Header as stored.
    pub fn header(&self) -> &BcoHeader {
        &self.header
    }

    /// Decoded index.
    pub fn index(&self) -> &CollisionIndex {
        &self.index
    }

    /// Takes the decoded index.
    pub fn into_index(self) -> CollisionIndex {
        self.index
    }

    /// File size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}
