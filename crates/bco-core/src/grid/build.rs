// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Grid/quadtree construction.

use std::collections::VecDeque;

use bco_geom::{Aabb, Rect};
use thiserror::Error;
use tracing::{info, instrument};

use super::node::{Grid, GridLayout, Node};
use super::params::BuildParams;
use crate::attributes::QuantizeError;
use crate::mesh::Mesh;

/// Errors raised while building a collision index.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    /// Build parameters are unusable.
    #[error("invalid build parameters: {reason}")]
    InvalidParams {
        /// What is wrong.
        reason: &'static str,
    },

    /// The mesh has no collision triangles.
    #[error("mesh has no collision triangles")]
    EmptyMesh,

    /// The mesh is too large to index.
    #[error("mesh has {count} triangles, at most {max} can be indexed")]
    TooManyTriangles {
        /// Triangles in the mesh.
        count: usize,
        /// Limit.
        max: usize,
    },

    /// The mesh extent does not fit integer grid coordinates.
    #[error("mesh extent ({min_x}, {min_z})..({max_x}, {max_z}) does not fit a grid of cell size {cell_size}")]
    ExtentOverflow {
        /// Footprint minimum X.
        min_x: f32,
        /// Footprint minimum Z.
        min_z: f32,
        /// Footprint maximum X.
        max_x: f32,
        /// Footprint maximum Z.
        max_z: f32,
        /// Requested cell size.
        cell_size: i32,
    },

    /// The top-level grid alone exceeds the node budget.
    #[error("grid of {cells_x}x{cells_z} cells exceeds the limit of {max} nodes")]
    GridTooLarge {
        /// Cells along X.
        cells_x: u32,
        /// Cells along Z.
        cells_z: u32,
        /// Node budget.
        max: usize,
    },

    /// Subdivision would grow the node table past its budget.
    #[error("subdivision needs more than {max} nodes; lower max_depth or raise max_tri_count")]
    TooManyNodes {
        /// Node budget.
        max: usize,
    },

    /// A leaf still exceeds the ceiling at the deepest level.
    #[error(
        "cell ({min_x}, {min_z})..({max_x}, {max_z}) holds {count} triangles at depth {depth}, ceiling is {ceiling}"
    )]
    CellOverCapacity {
        /// Depth of the offending leaf.
        depth: u32,
        /// Triangles in the leaf.
        count: usize,
        /// Configured ceiling.
        ceiling: usize,
        /// Leaf minimum X.
        min_x: f32,
        /// Leaf minimum Z.
        min_z: f32,
        /// Leaf maximum X.
        max_x: f32,
        /// Leaf maximum Z.
        max_z: f32,
    },

    /// A triangle normal cannot be stored.
    #[error("triangle {triangle}: {source}")]
    NormalOutOfRange {
        /// Triangle index.
        triangle: usize,
        /// Quantization failure.
        #[source]
        source: QuantizeError,
    },
}

/// A node waiting for its triangle list to be resolved.
struct Pending {
    node: usize,
    depth: u32,
    rect: Rect,
    triangles: Vec<u32>,
}

/// Builds the grid/quadtree for `mesh`.
///
/// 1. Footprints of all triangles fix the grid layout.
/// 2. Triangles are ordered by descending average height (stable), so every
///    leaf lists higher surfaces first.
/// 3. Each triangle goes to every cell its footprint overlaps (inclusive
///    box test; queries re-check with exact intersection).
/// 4. Cells above `max_tri_count` split into four quadrants, breadth-first,
///    down to `max_depth`. A leaf at `max_depth` above the ceiling fails.
///
/// Without a ceiling, a split that would leave every quadrant with the full
/// parent list is skipped; the cell stays a leaf.
///
/// The node table never exceeds [`BuildParams::node_limit`]; a layout or a
/// subdivision that would is an error, raised before it is allocated.
#[instrument(skip_all, fields(triangles = mesh.triangles().len(), cell_size = params.cell_size))]
pub fn build(mesh: &Mesh, params: &BuildParams) -> Result<Grid, BuildError> {
    params.validate()?;
    let count = mesh.triangles().len();
    if count == 0 {
        return Err(BuildError::EmptyMesh);
    }
    if u32::try_from(count).is_err() {
        return Err(BuildError::TooManyTriangles {
            count,
            max: u32::MAX as usize,
        });
    }

    let boxes: Vec<Aabb> = mesh
        .triangles()
        .iter()
        .map(|t| Aabb::of_triangle(&mesh.corners(t)))
        .collect();
    let bounds = boxes.iter().skip(1).fold(boxes[0], |acc, b| acc.union(b)).xz();
    let footprints: Vec<Rect> = boxes.iter().map(Aabb::xz).collect();
    let layout = GridLayout::covering(&bounds, params.cell_size).ok_or(BuildError::ExtentOverflow {
        min_x: bounds.min_x(),
        min_z: bounds.min_z(),
        max_x: bounds.max_x(),
        max_z: bounds.max_z(),
        cell_size: params.cell_size,
    })?;

    // Layout size is checked before any per-cell list is allocated.
    let max_nodes = params.node_limit();
    if u64::from(layout.cells_x) * u64::from(layout.cells_z) > max_nodes as u64 {
        return Err(BuildError::GridTooLarge {
            cells_x: layout.cells_x,
            cells_z: layout.cells_z,
            max: max_nodes,
        });
    }

    let order = height_order(mesh);

    // Top-level assignment. Walking triangles in height order keeps every
    // cell list in that order too.
    let mut roots: Vec<Vec<u32>> = vec![Vec::new(); layout.root_count()];
    for &tri in &order {
        let fp = &footprints[tri as usize];
        let (x0, x1) = cell_span(fp.min_x(), fp.max_x(), layout.origin_x, layout.cell_size_x, layout.cells_x);
        let (z0, z1) = cell_span(fp.min_z(), fp.max_z(), layout.origin_z, layout.cell_size_z, layout.cells_z);
        for cz in z0..=z1 {
            for cx in x0..=x1 {
                if fp.overlaps(&layout.cell_rect(cx, cz)) {
                    roots[layout.root_index(cx, cz)].push(tri);
                }
            }
        }
    }

    let mut nodes = vec![Node::Leaf { first_slot: 0, count: 0 }; layout.root_count()];
    let mut slots: Vec<u32> = Vec::new();
    let mut queue: VecDeque<Pending> = VecDeque::with_capacity(nodes.len());
    let mut index = 0;
    for cz in 0..layout.cells_z {
        for cx in 0..layout.cells_x {
            queue.push_back(Pending {
                node: index,
                depth: 0,
                rect: layout.cell_rect(cx, cz),
                triangles: std::mem::take(&mut roots[index]),
            });
            index += 1;
        }
    }

    while let Some(pending) = queue.pop_front() {
        let len = pending.triangles.len();
        if len > params.max_tri_count && pending.depth < params.max_depth {
            let quadrants: [Vec<u32>; 4] = [0, 1, 2, 3].map(|q| {
                let rect = pending.rect.quadrant(q);
                pending
                    .triangles
                    .iter()
                    .copied()
                    .filter(|&t| footprints[t as usize].overlaps(&rect))
                    .collect()
            });
            let stalled = quadrants.iter().all(|q| q.len() == len);
            if !(stalled && params.ceiling.is_none()) {
                if nodes.len() + 4 > max_nodes {
                    return Err(BuildError::TooManyNodes { max: max_nodes });
                }
                let first_child = nodes.len();
                nodes[pending.node] = Node::Branch { first_child };
                for (q, triangles) in quadrants.into_iter().enumerate() {
                    nodes.push(Node::Leaf { first_slot: 0, count: 0 });
                    queue.push_back(Pending {
                        node: first_child + q,
                        depth: pending.depth + 1,
                        rect: pending.rect.quadrant(q),
                        triangles,
                    });
                }
                continue;
            }
        }

        if let Some(ceiling) = params.ceiling {
            if len > ceiling {
                return Err(BuildError::CellOverCapacity {
                    depth: pending.depth,
                    count: len,
                    ceiling,
                    min_x: pending.rect.min_x(),
                    min_z: pending.rect.min_z(),
                    max_x: pending.rect.max_x(),
                    max_z: pending.rect.max_z(),
                });
            }
        }
        nodes[pending.node] = Node::Leaf {
            first_slot: slots.len(),
            count: len,
        };
        slots.extend_from_slice(&pending.triangles);
    }

    let grid = Grid::from_parts(layout, nodes, slots);
    info!(
        cells = layout.root_count(),
        nodes = grid.nodes().len(),
        leaves = grid.leaves().len(),
        slots = grid.slots().len(),
        deepest = grid.max_leaf_depth(),
        "built collision grid"
    );
    Ok(grid)
}

/// Builds an in-memory query grid with [`BuildParams::runtime`].
pub fn build_from_mesh(mesh: &Mesh) -> Result<Grid, BuildError> {
    build(mesh, &BuildParams::runtime())
}

/// Triangle indices sorted by descending average vertex height, stable.
fn height_order(mesh: &Mesh) -> Vec<u32> {
    let heights: Vec<f32> = mesh
        .triangles()
        .iter()
        .map(|t| {
            let [a, b, c] = mesh.corners(t);
            (a.y() + b.y() + c.y()) / 3.0
        })
        .collect();
    let mut order: Vec<u32> = (0..heights.len() as u32).collect();
    order.sort_by(|&a, &b| heights[b as usize].total_cmp(&heights[a as usize]));
    order
}

/// Cells along one axis a footprint may touch, widened by one on the low
/// side so shared edges are offered to the exact overlap test.
fn cell_span(min: f32, max: f32, origin: i32, size: i32, count: u32) -> (u32, u32) {
    let cell = |v: f32| ((f64::from(v) - f64::from(origin)) / f64::from(size)).floor();
    let last = f64::from(count - 1);
    let lo = (cell(min) - 1.0).clamp(0.0, last);
    let hi = cell(max).clamp(0.0, last);
    (lo as u32, hi as u32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use bco_geom::Vec3;

    fn floor_tri(x: f32, z: f32, size: f32, y: f32) -> [Vec3; 3] {
        [
            Vec3::new(x, y, z),
            Vec3::new(x, y, z + size),
            Vec3::new(x + size, y, z),
        ]
    }

    fn mesh_of(tris: &[[Vec3; 3]]) -> Mesh {
        let vertices: Vec<Vec3> = tris.iter().flatten().copied().collect();
        let faces: Vec<[u32; 3]> = (0..tris.len() as u32).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]).collect();
        Mesh::from_indices(vertices, &faces).unwrap()
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert_eq!(build(&Mesh::default(), &BuildParams::default()), Err(BuildError::EmptyMesh));
    }

    #[test]
    fn leaves_list_higher_triangles_first() {
        let mesh = mesh_of(&[
            floor_tri(10.0, 10.0, 5.0, 1.0),
            floor_tri(10.0, 10.0, 5.0, 9.0),
            floor_tri(10.0, 10.0, 5.0, 4.0),
        ]);
        let grid = build(&mesh, &BuildParams::default()).unwrap();
        assert_eq!(grid.candidates(11.0, 11.0), Some(&[1, 2, 0][..]));
    }

    #[test]
    fn edge_touching_triangle_lands_in_both_cells() {
        // Spans x = 500..1000 and touches the x = 1000 cell boundary.
        let mesh = mesh_of(&[floor_tri(500.0, 100.0, 500.0, 0.0)]);
        let grid = build(&mesh, &BuildParams::default()).unwrap();
        let layout = grid.layout();
        assert_eq!(layout.cells_x, 2);
        let left = grid.nodes()[layout.root_index(0, 0)];
        let right = grid.nodes()[layout.root_index(1, 0)];
        assert_eq!(grid.leaf_triangles(&left), &[0]);
        assert_eq!(grid.leaf_triangles(&right), &[0]);
    }

    #[test]
    fn crowded_cell_splits_into_contiguous_children() {
        // Twelve small triangles, three per quadrant of cell (0, 0).
        let mut tris = Vec::new();
        for (qx, qz) in [(0.0, 0.0), (600.0, 0.0), (0.0, 600.0), (600.0, 600.0)] {
            for k in 0..3 {
                tris.push(floor_tri(qx + 10.0 + k as f32, qz + 10.0, 100.0, k as f32));
            }
        }
        let mesh = mesh_of(&tris);
        let params = BuildParams::export(1000, 2, 4);
        let grid = build(&mesh, &params).unwrap();
        let layout = *grid.layout();
        assert_eq!((layout.cells_x, layout.cells_z), (2, 2));
        let first_child = match grid.nodes()[0] {
            Node::Branch { first_child } => first_child,
            other => panic!("expected branch, got {other:?}"),
        };
        assert_eq!(first_child, layout.root_count());
        for q in 0..4 {
            let leaf = grid.nodes()[first_child + q];
            assert_eq!(grid.leaf_triangles(&leaf).len(), 3);
        }
        assert_eq!(grid.max_leaf_depth(), 1);
    }

    #[test]
    fn stalled_split_without_ceiling_stays_a_leaf() {
        // Every triangle covers the whole cell, so quadrants never shrink.
        let tris: Vec<_> = (0..40).map(|k| floor_tri(0.0, 0.0, 999.0, k as f32)).collect();
        let mesh = mesh_of(&tris);
        let grid = build_from_mesh(&mesh).unwrap();
        assert_eq!(grid.leaf_triangles(&grid.nodes()[0]).len(), 40);
        assert_eq!(grid.max_leaf_depth(), 0);
    }

    #[test]
    fn over_ceiling_leaf_reports_its_region() {
        let tris: Vec<_> = (0..6).map(|k| floor_tri(0.0, 0.0, 999.0, k as f32)).collect();
        let mesh = mesh_of(&tris);
        let params = BuildParams {
            ceiling: Some(5),
            ..BuildParams::export(1000, 1, 2)
        };
        match build(&mesh, &params) {
            Err(BuildError::CellOverCapacity {
                depth,
                count,
                ceiling,
                min_x,
                max_x,
                ..
            }) => {
                assert_eq!((depth, count, ceiling), (1, 6, 5));
                assert_eq!((min_x, max_x), (0.0, 500.0));
            }
            other => panic!("expected over-capacity error, got {other:?}"),
        }
    }
}
