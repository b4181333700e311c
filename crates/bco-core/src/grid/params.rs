// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use super::BuildError;
use crate::bco::{MAX_LEAF_TRIANGLES, NO_CHILDREN};

/// Largest leaf an export build accepts at its deepest level.
pub const HARD_TRIANGLE_CEILING: usize = 250;

const RUNTIME_MAX_DEPTH: u32 = 8;
const RUNTIME_MAX_TRI_COUNT: usize = 32;
/// Node budget of an in-memory grid, top-level cells included.
const RUNTIME_MAX_NODES: usize = 1 << 22;

/// Builder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildParams {
    /// Edge length of a top-level cell, in world units.
    pub cell_size: i32,
    /// Number of quadtree levels below the top-level cells.
    pub max_depth: u32,
    /// A cell holding more triangles than this is split.
    pub max_tri_count: usize,
    /// Leaves still above this count at `max_depth` fail the build.
    /// `None` accepts leaves of any size.
    pub ceiling: Option<usize>,
}

impl BuildParams {
    /// Parameters for a file export, with the hard ceiling.
    pub const fn export(cell_size: i32, max_depth: u32, max_tri_count: usize) -> Self {
        Self {
            cell_size,
            max_depth,
            max_tri_count,
            ceiling: Some(HARD_TRIANGLE_CEILING),
        }
    }

    /// Parameters for in-memory query grids: deep tree, no ceiling.
    pub const fn runtime() -> Self {
        Self {
            cell_size: 1000,
            max_depth: RUNTIME_MAX_DEPTH,
            max_tri_count: RUNTIME_MAX_TRI_COUNT,
            ceiling: None,
        }
    }

    /// Largest node table the build may produce, top-level cells included.
    ///
    /// Ceilinged builds target the file format, whose child indices are
    /// 16-bit with `0xFFFF` reserved.
    pub fn node_limit(&self) -> usize {
        if self.ceiling.is_some() {
            usize::from(NO_CHILDREN)
        } else {
            RUNTIME_MAX_NODES
        }
    }

    /// Rejects parameter sets the builder cannot honour.
    pub fn validate(&self) -> Result<(), BuildError> {
        let invalid = |reason: &'static str| Err(BuildError::InvalidParams { reason });
        if self.cell_size <= 0 {
            return invalid("cell size must be positive");
        }
        if self.max_tri_count == 0 {
            return invalid("max triangle count must be positive");
        }
        if let Some(ceiling) = self.ceiling {
            if ceiling > MAX_LEAF_TRIANGLES {
                return invalid("ceiling exceeds the 255-triangle leaf limit of the file format");
            }
            if self.max_tri_count > ceiling {
                return invalid("max triangle count exceeds the ceiling");
            }
        }
        Ok(())
    }
}

impl Default for BuildParams {
    fn default() -> Self {
        Self::export(1000, 2, 20)
    }
}
