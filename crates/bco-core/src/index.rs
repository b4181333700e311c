// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The collision index aggregate.

use bco_geom::Vec3;
use tracing::{instrument, warn};

use crate::attributes::TriangleAttributes;
use crate::bco::{MaterialEntry, TriangleRecord, MAX_TRIANGLES, NO_NEIGHBOR};
use crate::grid::{self, BuildError, BuildParams, Grid};
use crate::mesh::Mesh;
use crate::query::{QueryEngine, TriangleSource};
use crate::remap::RemapTable;

/// Everything a BCO file holds: grid, triangle records, vertices and the
/// material table.
///
/// Immutable once built. Reloading geometry means building a new index and
/// swapping it in.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionIndex {
    grid: Grid,
    triangles: Vec<TriangleRecord>,
    vertices: Vec<Vec3>,
    materials: Vec<MaterialEntry>,
}

impl CollisionIndex {
    /// Builds the exportable index of `mesh`.
    ///
    /// Derives per-triangle attributes, one material entry per floor type in
    /// use, and the grid. Degenerate triangles are kept and logged.
    #[instrument(skip_all, fields(triangles = mesh.triangles().len(), vertices = mesh.vertices().len()))]
    pub fn build(mesh: &Mesh, remap: &RemapTable, params: &BuildParams) -> Result<Self, BuildError> {
        let count = mesh.triangles().len();
        if count > MAX_TRIANGLES {
            return Err(BuildError::TooManyTriangles {
                count,
                max: MAX_TRIANGLES,
            });
        }

        let triangles = mesh
            .triangles()
            .iter()
            .enumerate()
            .map(|(i, tri)| {
                let attrs = TriangleAttributes::derive(&mesh.corners(tri))
                    .map_err(|source| BuildError::NormalOutOfRange { triangle: i, source })?;
                if attrs.is_degenerate() {
                    warn!(triangle = i, vertices = ?tri.vertices, "degenerate triangle has a zero normal");
                }
                Ok(TriangleRecord {
                    vertices: tri.vertices,
                    plane_constant: attrs.plane_constant,
                    normal: attrs.quantized_normal,
                    floor_type: tri.floor_type,
                    min_max: attrs.min_max,
                    extra_flag: tri.extra_flag,
                    neighbors: [NO_NEIGHBOR; 3],
                    extra_settings: tri.extra_settings,
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        let grid = grid::build(mesh, params)?;
        Ok(Self {
            grid,
            triangles,
            vertices: mesh.vertices().to_vec(),
            materials: remap.material_table(mesh.floor_types()),
        })
    }

    /// Assembles an index from decoded parts without checking them.
    pub fn from_parts(
        grid: Grid,
        triangles: Vec<TriangleRecord>,
        vertices: Vec<Vec3>,
        materials: Vec<MaterialEntry>,
    ) -> Self {
        Self {
            grid,
            triangles,
            vertices,
            materials,
        }
    }

    /// Spatial index.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Triangle records, in mesh order.
    pub fn triangles(&self) -> &[TriangleRecord] {
        &self.triangles
    }

    /// Vertex positions.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Material table, ascending by floor type.
    pub fn materials(&self) -> &[MaterialEntry] {
        &self.materials
    }

    /// Query engine over this index.
    pub fn query(&self) -> QueryEngine<'_, Self> {
        QueryEngine::new(&self.grid, self)
    }
}

impl TriangleSource for CollisionIndex {
    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn triangle_corners(&self, index: usize) -> Option<[Vec3; 3]> {
        let tri = self.triangles.get(index)?;
        let [a, b, c] = tri.vertices.map(|v| self.vertices.get(v as usize).copied());
        Some([a?, b?, c?])
    }
}
