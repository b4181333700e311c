// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Height probes and ray picking.
//!
//! Misses are `None`, never errors: no cell under the point, no triangle
//! hit, or only walls/degenerate triangles under it.
//!
//! Tie-breaking:
//! - vertical probes keep the hit closest to the start height; between equal
//!   heights the first candidate in leaf order (higher average height first)
//!   wins;
//! - [`QueryEngine::closest_height`] prefers the surface below on a tie;
//! - [`QueryEngine::first_hit`] prefers the lowest triangle index.
//!
//! Points exactly on a shared edge count as inside both triangles.

use bco_geom::{intersect_ray_triangle, intersect_vertical, Ray, Vec3, Vertical};

use crate::grid::{build_from_mesh, BuildError, Grid};
use crate::mesh::Mesh;

/// Anything that can hand out triangle corners by index.
pub trait TriangleSource {
    /// Number of triangles.
    fn triangle_count(&self) -> usize;

    /// Corners of triangle `index`, or `None` if it does not exist.
    fn triangle_corners(&self, index: usize) -> Option<[Vec3; 3]>;
}

impl TriangleSource for Mesh {
    fn triangle_count(&self) -> usize {
        self.triangles().len()
    }

    fn triangle_corners(&self, index: usize) -> Option<[Vec3; 3]> {
        self.triangles().get(index).map(|t| self.corners(t))
    }
}

/// Result of a vertical probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    /// Surface height.
    pub height: f32,
    /// Triangle that was hit.
    pub triangle: u32,
}

/// Result of [`QueryEngine::first_hit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Intersection point.
    pub point: Vec3,
    /// Ray parameter of the intersection.
    pub distance: f32,
    /// Triangle that was hit.
    pub triangle: u32,
}

/// Read-only queries over a grid and its triangles.
#[derive(Debug)]
pub struct QueryEngine<'a, S: ?Sized> {
    grid: &'a Grid,
    source: &'a S,
}

impl<S: ?Sized> Clone for QueryEngine<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for QueryEngine<'_, S> {}

impl<'a, S: TriangleSource + ?Sized> QueryEngine<'a, S> {
    /// Pairs a grid with the triangles its slots refer to.
    pub fn new(grid: &'a Grid, source: &'a S) -> Self {
        Self { grid, source }
    }

    /// Highest surface at or below `from_y` under `(x, z)`.
    ///
    /// Pass `f32::INFINITY` to get the topmost surface.
    pub fn ground_below(&self, x: f32, z: f32, from_y: f32) -> Option<GroundHit> {
        self.probe(x, z, from_y, Vertical::Down)
    }

    /// Lowest surface at or above `from_y` over `(x, z)`.
    pub fn ground_above(&self, x: f32, z: f32, from_y: f32) -> Option<GroundHit> {
        self.probe(x, z, from_y, Vertical::Up)
    }

    /// Height of [`Self::ground_below`].
    pub fn height_below(&self, x: f32, z: f32, from_y: f32) -> Option<f32> {
        self.ground_below(x, z, from_y).map(|hit| hit.height)
    }

    /// Surface nearest to `y` vertically, looking both down and up.
    pub fn ground_closest(&self, x: f32, z: f32, y: f32) -> Option<GroundHit> {
        match (self.ground_below(x, z, y), self.ground_above(x, z, y)) {
            (Some(below), Some(above)) => {
                if (above.height - y).abs() < (y - below.height).abs() {
                    Some(above)
                } else {
                    Some(below)
                }
            }
            (below, above) => below.or(above),
        }
    }

    /// Height of [`Self::ground_closest`].
    pub fn closest_height(&self, x: f32, z: f32, y: f32) -> Option<f32> {
        self.ground_closest(x, z, y).map(|hit| hit.height)
    }

    /// Nearest triangle hit by `ray`, testing every triangle.
    ///
    /// Linear in the triangle count; meant for clicks, not per-frame use.
    pub fn first_hit(&self, ray: &Ray) -> Option<PickHit> {
        let mut best: Option<PickHit> = None;
        for index in 0..self.source.triangle_count() {
            let Some(corners) = self.source.triangle_corners(index) else {
                continue;
            };
            let Some(hit) = intersect_ray_triangle(ray, &corners) else {
                continue;
            };
            if best.is_none_or(|b| hit.distance < b.distance) {
                best = Some(PickHit {
                    point: hit.point,
                    distance: hit.distance,
                    triangle: index as u32,
                });
            }
        }
        best
    }

    fn probe(&self, x: f32, z: f32, from_y: f32, dir: Vertical) -> Option<GroundHit> {
        let mut best: Option<GroundHit> = None;
        for &triangle in self.grid.candidates(x, z)? {
            let Some(corners) = self.source.triangle_corners(triangle as usize) else {
                continue;
            };
            let Some(height) = intersect_vertical(x, z, from_y, dir, &corners) else {
                continue;
            };
            let closer = best.is_none_or(|b| match dir {
                Vertical::Down => height > b.height,
                Vertical::Up => height < b.height,
            });
            if closer {
                best = Some(GroundHit { height, triangle });
            }
        }
        best
    }
}

/// A mesh with an in-memory query grid, for editors that never touch the
/// file format.
///
/// Build a new one to reload geometry; share it behind an `Arc` to let
/// several readers query it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeCollision {
    mesh: Mesh,
    grid: Grid,
}

impl RuntimeCollision {
    /// Indexes `mesh` with the runtime build parameters.
    pub fn build(mesh: Mesh) -> Result<Self, BuildError> {
        let grid = build_from_mesh(&mesh)?;
        Ok(Self { mesh, grid })
    }

    /// Indexed mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Query grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Query engine over the mesh.
    pub fn query(&self) -> QueryEngine<'_, Mesh> {
        QueryEngine::new(&self.grid, &self.mesh)
    }
}
