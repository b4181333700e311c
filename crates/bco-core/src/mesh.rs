// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mesh ingestion and the in-memory triangle model.
//!
//! The upstream importer hands over a flat vertex list plus faces that carry
//! three vertex indices (zero- or one-based) and a material name. Ingestion
//! resolves each material through the [`RemapTable`], drops faces whose
//! material does not resolve (visual-only geometry) and keeps every vertex in
//! its original order so vertex indices stay stable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bco_geom::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::remap::RemapTable;

/// 16-bit surface classification code.
///
/// The high byte groups related surfaces, the low byte is the sub-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FloorType(pub u16);

impl FloorType {
    /// High byte: the surface group.
    pub fn group(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Low byte: the sub-type inside the group.
    pub fn subtype(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl fmt::Display for FloorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// Base of the vertex indices in a [`MeshInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBase {
    /// Indices start at 0.
    Zero,
    /// Indices start at 1 (OBJ convention).
    #[default]
    One,
}

/// One face of the source mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    /// Vertex indices in the input's [`IndexBase`].
    pub indices: [u32; 3],
    /// Material name as authored.
    pub material: String,
}

/// Raw mesh as produced by an importer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshInput {
    /// Vertex positions, in file order.
    pub vertices: Vec<Vec3>,
    /// Triangular faces.
    pub faces: Vec<Face>,
}

impl MeshInput {
    /// Swaps the Y and Z axes of every vertex, for meshes authored Z-up.
    pub fn flip_yz(&mut self) {
        for v in &mut self.vertices {
            *v = Vec3::new(v.x(), v.z(), v.y());
        }
    }
}

/// A collision triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Zero-based vertex indices.
    pub vertices: [u32; 3],
    /// Surface code.
    pub floor_type: FloorType,
    /// Extra per-surface byte flag.
    pub extra_flag: u8,
    /// 32-bit settings word.
    pub extra_settings: u32,
}

/// Errors raised while ingesting a [`MeshInput`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        /// Face position in the input.
        face: usize,
        /// Offending index as authored.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
    /// A one-based mesh contains a zero index.
    #[error("face {face} uses index 0 in a one-based mesh")]
    ZeroIndexInOneBasedMesh {
        /// Face position in the input.
        face: usize,
    },
}

/// Result of [`Mesh::ingest`].
#[derive(Debug, Clone)]
pub struct Ingested {
    /// Collision mesh.
    pub mesh: Mesh,
    /// Faces dropped because their material did not resolve.
    pub excluded_faces: usize,
    /// Distinct material names that did not resolve.
    pub unresolved_materials: BTreeSet<String>,
}

/// Collision triangles plus the vertex array they index into.
///
/// Every triangle's vertex indices are valid; the constructors enforce it and
/// the fields are private so it stays that way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Creates a mesh from already-resolved triangles.
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<Triangle>) -> Result<Self, IngestError> {
        for (face, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri
                .vertices
                .iter()
                .find(|&&i| i as usize >= vertices.len())
            {
                return Err(IngestError::VertexOutOfRange {
                    face,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }
        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Creates a mesh from zero-based index triples with floor type 0.
    ///
    /// Used by the editor, which queries geometry that carries no physics
    /// tags.
    pub fn from_indices(vertices: Vec<Vec3>, faces: &[[u32; 3]]) -> Result<Self, IngestError> {
        let triangles = faces
            .iter()
            .map(|&vertices| Triangle {
                vertices,
                floor_type: FloorType::default(),
                extra_flag: 0,
                extra_settings: 0,
            })
            .collect();
        Self::new(vertices, triangles)
    }

    /// Converts importer output into a collision mesh.
    pub fn ingest(
        input: &MeshInput,
        base: IndexBase,
        remap: &RemapTable,
    ) -> Result<Ingested, IngestError> {
        let vertex_count = input.vertices.len();
        let mut triangles = Vec::with_capacity(input.faces.len());
        let mut excluded_faces = 0;
        let mut unresolved_materials = BTreeSet::new();
        let mut resolved: BTreeMap<&str, Option<_>> = BTreeMap::new();

        for (face_ix, face) in input.faces.iter().enumerate() {
            let mut vertices = [0u32; 3];
            for (slot, &raw) in vertices.iter_mut().zip(&face.indices) {
                let index = match base {
                    IndexBase::Zero => raw,
                    IndexBase::One => raw
                        .checked_sub(1)
                        .ok_or(IngestError::ZeroIndexInOneBasedMesh { face: face_ix })?,
                };
                if index as usize >= vertex_count {
                    return Err(IngestError::VertexOutOfRange {
                        face: face_ix,
                        index: raw,
                        vertex_count,
                    });
                }
                *slot = index;
            }

            let props = *resolved
                .entry(face.material.as_str())
                .or_insert_with(|| {
                    let props = remap.resolve(&face.material);
                    debug!(material = %face.material, ?props, "resolved material");
                    props
                });
            let Some(props) = props else {
                debug!(face = face_ix, material = %face.material, "excluding visual-only face");
                excluded_faces += 1;
                unresolved_materials.insert(face.material.clone());
                continue;
            };
            triangles.push(Triangle {
                vertices,
                floor_type: props.floor_type,
                extra_flag: props.extra_flag,
                extra_settings: props.extra_settings,
            });
        }

        Ok(Ingested {
            mesh: Self {
                vertices: input.vertices.clone(),
                triangles,
            },
            excluded_faces,
            unresolved_materials,
        })
    }

    /// Vertex positions.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Collision triangles.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Positions of the corners of one of this mesh's own triangles.
    ///
    /// Callers outside the crate look triangles up by index through
    /// [`TriangleSource`](crate::query::TriangleSource) instead.
    pub(crate) fn corners(&self, tri: &Triangle) -> [Vec3; 3] {
        tri.vertices.map(|i| self.vertices[i as usize])
    }

    /// Distinct floor types, ascending.
    pub fn floor_types(&self) -> BTreeSet<FloorType> {
        self.triangles.iter().map(|t| t.floor_type).collect()
    }

    /// Edge adjacency for every triangle.
    ///
    /// Entry `k` of a triangle's array is the triangle sharing its edge
    /// `v[k] -> v[(k + 1) % 3]` (either winding), picking the lowest other
    /// index when several do, or `None` on a boundary edge.
    pub fn neighbors(&self) -> Vec<[Option<u32>; 3]> {
        let mut edges: BTreeMap<(u32, u32), Vec<u32>> = BTreeMap::new();
        for (ix, tri) in (0u32..).zip(&self.triangles) {
            for k in 0..3 {
                edges.entry(edge_key(tri, k)).or_default().push(ix);
            }
        }
        (0u32..)
            .zip(&self.triangles)
            .map(|(ix, tri)| {
                [0, 1, 2].map(|k| {
                    edges
                        .get(&edge_key(tri, k))
                        .and_then(|users| users.iter().copied().find(|&other| other != ix))
                })
            })
            .collect()
    }
}

fn edge_key(tri: &Triangle, k: usize) -> (u32, u32) {
    let a = tri.vertices[k];
    let b = tri.vertices[(k + 1) % 3];
    (a.min(b), a.max(b))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn quad_input(materials: [&str; 2]) -> MeshInput {
        MeshInput {
            vertices: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            faces: vec![
                Face {
                    indices: [1, 2, 3],
                    material: materials[0].to_owned(),
                },
                Face {
                    indices: [1, 3, 4],
                    material: materials[1].to_owned(),
                },
            ],
        }
    }

    #[test]
    fn floor_type_splits_into_group_and_subtype() {
        let ft = FloorType(0x0A03);
        assert_eq!(ft.group(), 0x0A);
        assert_eq!(ft.subtype(), 0x03);
        assert_eq!(ft.to_string(), "0x0A03");
    }

    #[test]
    fn ingest_converts_one_based_indices() {
        let remap = RemapTable::parse("road = 0x0100\ngrass = 0x0200, 3").unwrap();
        let out = Mesh::ingest(&quad_input(["road", "grass"]), IndexBase::One, &remap).unwrap();
        assert_eq!(out.excluded_faces, 0);
        let tris = out.mesh.triangles();
        assert_eq!(tris[0].vertices, [0, 1, 2]);
        assert_eq!(tris[1].vertices, [0, 2, 3]);
        assert_eq!(tris[0].floor_type, FloorType(0x0100));
        assert_eq!(tris[1].extra_flag, 3);
    }

    #[test]
    fn unresolved_material_is_excluded_but_vertices_stay() {
        let remap = RemapTable::parse("road = 0x0100").unwrap();
        let out = Mesh::ingest(&quad_input(["road", "Skybox"]), IndexBase::One, &remap).unwrap();
        assert_eq!(out.mesh.triangles().len(), 1);
        assert_eq!(out.mesh.vertices().len(), 4);
        assert_eq!(out.excluded_faces, 1);
        assert!(out.unresolved_materials.contains("Skybox"));
    }

    #[test]
    fn hex_material_name_resolves_without_table_entry() {
        let out = Mesh::ingest(
            &quad_input(["0x0301", "0302"]),
            IndexBase::One,
            &RemapTable::default(),
        )
        .unwrap();
        let types: Vec<_> = out.mesh.triangles().iter().map(|t| t.floor_type).collect();
        assert_eq!(types, vec![FloorType(0x0301), FloorType(0x0302)]);
    }

    #[test]
    fn bad_indices_are_rejected() {
        let remap = RemapTable::parse("road = 0x0100").unwrap();
        let mut input = quad_input(["road", "road"]);
        input.faces[1].indices = [1, 0, 2];
        assert_eq!(
            Mesh::ingest(&input, IndexBase::One, &remap).unwrap_err(),
            IngestError::ZeroIndexInOneBasedMesh { face: 1 }
        );
        input.faces[1].indices = [1, 2, 9];
        assert!(matches!(
            Mesh::ingest(&input, IndexBase::One, &remap),
            Err(IngestError::VertexOutOfRange { face: 1, index: 9, .. })
        ));
        assert!(Mesh::from_indices(vec![Vec3::ZERO], &[[0, 0, 1]]).is_err());
    }

    #[test]
    fn shared_edge_links_both_triangles() {
        let remap = RemapTable::parse("road = 0x0100").unwrap();
        let mesh = Mesh::ingest(&quad_input(["road", "road"]), IndexBase::One, &remap)
            .unwrap()
            .mesh;
        let n = mesh.neighbors();
        // Triangle 0 edge v2->v0 (0-based 2->0) is the diagonal.
        assert_eq!(n[0], [None, None, Some(1)]);
        // Triangle 1 edge v0->v1 (0->2) is the same diagonal.
        assert_eq!(n[1], [Some(0), None, None]);
    }

    #[test]
    fn flip_yz_swaps_axes() {
        let mut input = MeshInput {
            vertices: vec![Vec3::new(1.0, 2.0, 3.0)],
            faces: Vec::new(),
        };
        input.flip_yz();
        assert_eq!(input.vertices[0].to_array(), [1.0, 3.0, 2.0]);
    }
}
