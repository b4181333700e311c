// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::VecDeque;

use bco_geom::Rect;

/// Placement and size of the top-level cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// X of the low corner of cell `(0, 0)`.
    pub origin_x: i32,
    /// Z of the low corner of cell `(0, 0)`.
    pub origin_z: i32,
    /// Cell extent along X.
    pub cell_size_x: i32,
    /// Cell extent along Z.
    pub cell_size_z: i32,
    /// Number of cells along X.
    pub cells_x: u32,
    /// Number of cells along Z.
    pub cells_z: u32,
}

impl GridLayout {
    /// Smallest whole-cell layout covering `bounds`, plus one cell of slack
    /// on the high side of each axis.
    ///
    /// Returns `None` when the origin or cell count does not fit its integer
    /// type.
    pub fn covering(bounds: &Rect, cell_size: i32) -> Option<Self> {
        let (origin_x, cells_x) = snap_axis(bounds.min_x(), bounds.max_x(), cell_size)?;
        let (origin_z, cells_z) = snap_axis(bounds.min_z(), bounds.max_z(), cell_size)?;
        Some(Self {
            origin_x,
            origin_z,
            cell_size_x: cell_size,
            cell_size_z: cell_size,
            cells_x,
            cells_z,
        })
    }

    /// Number of top-level cells.
    pub fn root_count(&self) -> usize {
        self.cells_x as usize * self.cells_z as usize
    }

    /// Node-table index of cell `(cx, cz)`.
    pub fn root_index(&self, cx: u32, cz: u32) -> usize {
        cx as usize + cz as usize * self.cells_x as usize
    }

    /// World rectangle of cell `(cx, cz)`.
    pub fn cell_rect(&self, cx: u32, cz: u32) -> Rect {
        let x0 = f64::from(self.origin_x) + f64::from(cx) * f64::from(self.cell_size_x);
        let z0 = f64::from(self.origin_z) + f64::from(cz) * f64::from(self.cell_size_z);
        Rect::new(
            x0 as f32,
            z0 as f32,
            (x0 + f64::from(self.cell_size_x)) as f32,
            (z0 + f64::from(self.cell_size_z)) as f32,
        )
    }

    /// Cell containing `(x, z)`; coordinates outside the grid miss.
    pub fn cell_at(&self, x: f32, z: f32) -> Option<(u32, u32)> {
        let cx = cell_coord(x, self.origin_x, self.cell_size_x, self.cells_x)?;
        let cz = cell_coord(z, self.origin_z, self.cell_size_z, self.cells_z)?;
        Some((cx, cz))
    }
}

fn snap_axis(min: f32, max: f32, cell_size: i32) -> Option<(i32, u32)> {
    let cell = f64::from(cell_size);
    let origin = (f64::from(min) / cell).floor() * cell;
    let cells = ((f64::from(max) - origin) / cell).ceil() + 1.0;
    let origin_fits = origin >= f64::from(i32::MIN) && origin <= f64::from(i32::MAX);
    let cells_fit = cells >= 1.0 && cells <= f64::from(u32::MAX);
    (origin_fits && cells_fit).then_some((origin as i32, cells as u32))
}

fn cell_coord(value: f32, origin: i32, size: i32, count: u32) -> Option<u32> {
    let c = ((f64::from(value) - f64::from(origin)) / f64::from(size)).floor();
    (c >= 0.0 && c < f64::from(count)).then_some(c as u32)
}

/// One entry of the node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Terminal node listing `count` slots from `first_slot`.
    Leaf {
        /// First slot in [`Grid::slots`].
        first_slot: usize,
        /// Number of slots (may be zero).
        count: usize,
    },
    /// Internal node; its four children start at `first_child`.
    Branch {
        /// Node-table index of quadrant 0.
        first_child: usize,
    },
}

/// A leaf reached by [`Grid::leaves`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafView<'a> {
    /// Node-table index.
    pub node: usize,
    /// 0 for a top-level cell.
    pub depth: u32,
    /// Area the leaf covers.
    pub rect: Rect,
    /// Triangle indices in build order.
    pub triangles: &'a [u32],
}

/// Built spatial index: layout, node table and triangle slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    layout: GridLayout,
    nodes: Vec<Node>,
    slots: Vec<u32>,
}

impl Grid {
    /// Assembles a grid from its parts without checking them.
    ///
    /// The builder and the decoder are the intended callers; decoded parts
    /// go through [`validate_index`](crate::validate_index) first.
    pub fn from_parts(layout: GridLayout, nodes: Vec<Node>, slots: Vec<u32>) -> Self {
        Self {
            layout,
            nodes,
            slots,
        }
    }

    /// Top-level cell layout.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Node table.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Triangle slots referenced by leaves.
    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    /// Slots of a leaf; empty for branches or out-of-range runs.
    pub fn leaf_triangles(&self, node: &Node) -> &[u32] {
        match *node {
            Node::Leaf { first_slot, count } => first_slot
                .checked_add(count)
                .and_then(|end| self.slots.get(first_slot..end))
                .unwrap_or_default(),
            Node::Branch { .. } => &[],
        }
    }

    /// Candidate triangles for a vertical probe at `(x, z)`.
    ///
    /// Descends from the containing top-level cell to the leaf holding the
    /// point. `None` when the point lies outside the grid.
    pub fn candidates(&self, x: f32, z: f32) -> Option<&[u32]> {
        let (cx, cz) = self.layout.cell_at(x, z)?;
        let mut index = self.layout.root_index(cx, cz);
        let mut rect = self.layout.cell_rect(cx, cz);
        // A well-formed table descends strictly forward, so this bounds the walk.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index)? {
                node @ Node::Leaf { .. } => return Some(self.leaf_triangles(node)),
                Node::Branch { first_child } => {
                    let q = rect.quadrant_of(x, z);
                    rect = rect.quadrant(q);
                    index = first_child.checked_add(q)?;
                }
            }
        }
        None
    }

    /// All reachable leaves, breadth-first from the top-level cells.
    pub fn leaves(&self) -> Vec<LeafView<'_>> {
        let mut out = Vec::new();
        let mut queue = VecDeque::new();
        for cz in 0..self.layout.cells_z {
            for cx in 0..self.layout.cells_x {
                queue.push_back((self.layout.root_index(cx, cz), 0, self.layout.cell_rect(cx, cz)));
            }
        }
        while let Some((index, depth, rect)) = queue.pop_front() {
            match self.nodes.get(index) {
                Some(node @ Node::Leaf { .. }) => out.push(LeafView {
                    node: index,
                    depth,
                    rect,
                    triangles: self.leaf_triangles(node),
                }),
                Some(&Node::Branch { first_child }) if first_child > index => {
                    for q in 0..4 {
                        queue.push_back((first_child + q, depth + 1, rect.quadrant(q)));
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Deepest level holding a leaf.
    pub fn max_leaf_depth(&self) -> u32 {
        self.leaves().iter().map(|l| l.depth).max().unwrap_or(0)
    }
}
