// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Record types of the BCO format.

use super::codec::{Decode, Encode, Reader, Writer};
use super::read::ReadError;
use crate::attributes::MinMaxLookup;
use crate::mesh::FloorType;
use crate::remap::SoundSettings;

/// File magic.
pub const MAGIC: [u8; 4] = *b"0003";
/// Header size in bytes, magic included.
pub const HEADER_SIZE: usize = 44;
/// Grid table entry size.
pub const GRID_ENTRY_SIZE: usize = 8;
/// Triangle-index slot size.
pub const TRIANGLE_SLOT_SIZE: usize = 2;
/// Triangle record size.
pub const TRIANGLE_RECORD_SIZE: usize = 36;
/// Vertex record size.
pub const VERTEX_RECORD_SIZE: usize = 12;
/// Material record size.
pub const MATERIAL_RECORD_SIZE: usize = 12;
/// Neighbor slot value meaning "no neighbor".
pub const NO_NEIGHBOR: u16 = 0xFFFF;
/// Child base value marking an empty leaf.
pub const NO_CHILDREN: u16 = 0xFFFF;
/// Triangle slots are 16-bit.
pub const MAX_TRIANGLES: usize = 65_536;
/// Leaf triangle counts are 8-bit.
pub const MAX_LEAF_TRIANGLES: usize = 255;

/// File header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcoHeader {
    /// Top-level cells along X.
    pub grid_x: u16,
    /// Top-level cells along Z.
    pub grid_z: u16,
    /// Grid origin X.
    pub origin_x: i32,
    /// Grid origin Z.
    pub origin_z: i32,
    /// Cell extent along X.
    pub cell_size_x: i32,
    /// Cell extent along Z.
    pub cell_size_z: i32,
    /// Material table entries.
    pub material_count: u16,
    /// Byte offset of the triangle-index array.
    pub triangle_indices_offset: u32,
    /// Byte offset of the triangle records.
    pub triangles_offset: u32,
    /// Byte offset of the vertex records.
    pub vertices_offset: u32,
    /// Byte offset of the material table.
    pub materials_offset: u32,
}

impl Encode for BcoHeader {
    fn encode(&self, w: &mut Writer) {
        w.write_bytes(&MAGIC);
        w.write_u16(self.grid_x);
        w.write_u16(self.grid_z);
        w.write_i32(self.origin_x);
        w.write_i32(self.origin_z);
        w.write_i32(self.cell_size_x);
        w.write_i32(self.cell_size_z);
        w.write_u16(self.material_count);
        w.write_u16(0);
        w.write_u32(self.triangle_indices_offset);
        w.write_u32(self.triangles_offset);
        w.write_u32(self.vertices_offset);
        w.write_u32(self.materials_offset);
    }
}

impl Decode for BcoHeader {
    fn decode(r: &mut Reader<'_>) -> Result<Self, ReadError> {
        let magic: [u8; 4] = r.read_array()?;
        if magic != MAGIC {
            return Err(ReadError::BadMagic {
                expected: MAGIC,
                actual: magic,
            });
        }
        let grid_x = r.read_u16()?;
        let grid_z = r.read_u16()?;
        let origin_x = r.read_i32()?;
        let origin_z = r.read_i32()?;
        let cell_size_x = r.read_i32()?;
        let cell_size_z = r.read_i32()?;
        let material_count = r.read_u16()?;
        let _padding = r.read_u16()?;
        Ok(Self {
            grid_x,
            grid_z,
            origin_x,
            origin_z,
            cell_size_x,
            cell_size_z,
            material_count,
            triangle_indices_offset: r.read_u32()?,
            triangles_offset: r.read_u32()?,
            vertices_offset: r.read_u32()?,
            materials_offset: r.read_u32()?,
        })
    }
}

/// One grid/quadtree table entry as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridEntry {
    /// Triangles in a leaf; 0 for branches and empty leaves.
    pub leaf_count: u8,
    /// First child index, or [`NO_CHILDREN`].
    pub child_base: u16,
    /// First triangle-index slot.
    pub triangle_group: u32,
}

impl Encode for GridEntry {
    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.leaf_count);
        w.write_u8(0);
        w.write_u16(self.child_base);
        w.write_u32(self.triangle_group);
    }
}

impl Decode for GridEntry {
    fn decode(r: &mut Reader<'_>) -> Result<Self, ReadError> {
        let leaf_count = r.read_u8()?;
        let _padding = r.read_u8()?;
        Ok(Self {
            leaf_count,
            child_base: r.read_u16()?,
            triangle_group: r.read_u32()?,
        })
    }
}

/// Triangle record as stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleRecord {
    /// Zero-based vertex indices.
    pub vertices: [u32; 3],
    /// Plane constant `D`.
    pub plane_constant: f32,
    /// Normal scaled by 10000.
    pub normal: [i16; 3],
    /// Surface code.
    pub floor_type: FloorType,
    /// Footprint extreme lookup.
    pub min_max: MinMaxLookup,
    /// Extra byte flag.
    pub extra_flag: u8,
    /// Neighbor slots; written as [`NO_NEIGHBOR`].
    pub neighbors: [u16; 3],
    /// Settings word.
    pub extra_settings: u32,
}

impl Encode for TriangleRecord {
    fn encode(&self, w: &mut Writer) {
        for v in self.vertices {
            w.write_u32(v);
        }
        w.write_f32(self.plane_constant);
        for n in self.normal {
            w.write_i16(n);
        }
        w.write_u16(self.floor_type.0);
        w.write_u8(self.min_max.0);
        w.write_u8(self.extra_flag);
        for n in self.neighbors {
            w.write_u16(n);
        }
        w.write_u32(self.extra_settings);
    }
}

impl Decode for TriangleRecord {
    fn decode(r: &mut Reader<'_>) -> Result<Self, ReadError> {
        let vertices = [r.read_u32()?, r.read_u32()?, r.read_u32()?];
        let plane_constant = r.read_f32()?;
        let normal = [r.read_i16()?, r.read_i16()?, r.read_i16()?];
        let floor_type = FloorType(r.read_u16()?);
        let min_max = MinMaxLookup(r.read_u8()?);
        let extra_flag = r.read_u8()?;
        let neighbors = [r.read_u16()?, r.read_u16()?, r.read_u16()?];
        Ok(Self {
            vertices,
            plane_constant,
            normal,
            floor_type,
            min_max,
            extra_flag,
            neighbors,
            extra_settings: r.read_u32()?,
        })
    }
}

/// Per-floor-type material entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialEntry {
    /// Surface code.
    pub floor_type: FloorType,
    /// Sound identifier.
    pub sound_id: i16,
    /// First sound parameter.
    pub setting_a: u32,
    /// Second sound parameter.
    pub setting_b: u32,
}

impl MaterialEntry {
    /// Entry for `floor_type` with the given sound parameters.
    pub fn new(floor_type: FloorType, sound: SoundSettings) -> Self {
        Self {
            floor_type,
            sound_id: sound.sound_id,
            setting_a: sound.setting_a,
            setting_b: sound.setting_b,
        }
    }

    /// Sound parameters of this entry.
    pub fn sound(&self) -> SoundSettings {
        SoundSettings {
            sound_id: self.sound_id,
            setting_a: self.setting_a,
            setting_b: self.setting_b,
        }
    }
}

impl Encode for MaterialEntry {
    fn encode(&self, w: &mut Writer) {
        w.write_u16(self.floor_type.0);
        w.write_i16(self.sound_id);
        w.write_u32(self.setting_a);
        w.write_u32(self.setting_b);
    }
}

impl Decode for MaterialEntry {
    fn decode(r: &mut Reader<'_>) -> Result<Self, ReadError> {
        Ok(Self {
            floor_type: FloorType(r.read_u16()?),
            sound_id: r.read_i16()?,
            setting_a: r.read_u32()?,
            setting_b: r.read_u32()?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn encoded<T: Encode>(value: &T) -> Vec<u8> {
        let mut w = Writer::default();
        value.encode(&mut w);
        w.into_vec()
    }

    #[test]
    fn record_sizes_match_layout() {
        let header = BcoHeader {
            grid_x: 2,
            grid_z: 3,
            origin_x: -1000,
            origin_z: 0,
            cell_size_x: 1000,
            cell_size_z: 1000,
            material_count: 1,
            triangle_indices_offset: 92,
            triangles_offset: 96,
            vertices_offset: 132,
            materials_offset: 168,
        };
        assert_eq!(encoded(&header).len(), HEADER_SIZE);
        let entry = GridEntry {
            leaf_count: 1,
            child_base: 0,
            triangle_group: 0,
        };
        assert_eq!(encoded(&entry).len(), GRID_ENTRY_SIZE);
        let tri = TriangleRecord {
            vertices: [0, 1, 2],
            plane_constant: 0.0,
            normal: [0, 10000, 0],
            floor_type: FloorType(1),
            min_max: MinMaxLookup(0),
            extra_flag: 0,
            neighbors: [NO_NEIGHBOR; 3],
            extra_settings: 0,
        };
        assert_eq!(encoded(&tri).len(), TRIANGLE_RECORD_SIZE);
        assert_eq!(
            encoded(&MaterialEntry::new(FloorType(1), SoundSettings::default())).len(),
            MATERIAL_RECORD_SIZE
        );
    }

    #[test]
    fn triangle_record_field_order() {
        let tri = TriangleRecord {
            vertices: [1, 2, 3],
            plane_constant: -2.0,
            normal: [0, 10000, -1],
            floor_type: FloorType(0x0A0B),
            min_max: MinMaxLookup(0xE4),
            extra_flag: 7,
            neighbors: [NO_NEIGHBOR; 3],
            extra_settings: 0xDEAD_BEEF,
        };
        let bytes = encoded(&tri);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 1]);
        assert_eq!(&bytes[12..16], &(-2.0f32).to_be_bytes());
        assert_eq!(&bytes[16..22], &[0x00, 0x00, 0x27, 0x10, 0xFF, 0xFF]);
        assert_eq!(&bytes[22..26], &[0x0A, 0x0B, 0xE4, 7]);
        assert_eq!(&bytes[26..32], &[0xFF; 6]);
        assert_eq!(&bytes[32..36], &[0xDE, 0xAD, 0xBE, 0xEF]);

        let back = TriangleRecord::decode(&mut Reader::at(&bytes, 0, "triangles")).unwrap();
        assert_eq!(back, tri);
    }

    #[test]
    fn bad_magic_is_reported() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[..4].copy_from_slice(b"0002");
        let err = BcoHeader::decode(&mut Reader::at(&bytes, 0, "header")).unwrap_err();
        assert!(matches!(err, ReadError::BadMagic { actual, .. } if &actual == b"0002"));
    }
}
