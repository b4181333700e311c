// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Structural validation of a collision index.

use super::read::ReadError;
use super::types::MAX_TRIANGLES;
use crate::grid::Node;
use crate::index::CollisionIndex;

/// Checks every cross-reference inside `index`.
///
/// - the node table holds at least one entry per top-level cell;
/// - children start after their parent and fit in the table;
/// - non-empty leaves reference slots inside the slot array;
/// - every slot names an existing triangle;
/// - every triangle names existing vertices.
///
/// Indices produced by [`CollisionIndex::build`] always pass; the reader
/// runs this before handing a decoded index out.
pub fn validate_index(index: &CollisionIndex) -> Result<(), ReadError> {
    let grid = index.grid();
    let nodes = grid.nodes();
    let slots = grid.slots();
    let triangle_count = index.triangles().len();
    let vertex_count = index.vertices().len();

    if triangle_count > MAX_TRIANGLES {
        return Err(ReadError::corrupt(
            "triangles",
            format!("{triangle_count} triangles exceed the 16-bit slot range"),
        ));
    }
    let roots = grid.layout().root_count();
    if nodes.len() < roots {
        return Err(ReadError::corrupt(
            "grid",
            format!("{} entries for {roots} top-level cells", nodes.len()),
        ));
    }

    for (i, node) in nodes.iter().enumerate() {
        match *node {
            Node::Branch { first_child } => {
                if first_child <= i || first_child.saturating_add(4) > nodes.len() {
                    return Err(ReadError::corrupt(
                        "grid",
                        format!(
                            "node {i} children at {first_child} fall outside {}..{}",
                            i + 1,
                            nodes.len()
                        ),
                    ));
                }
            }
            Node::Leaf { first_slot, count } if count > 0 => {
                let end = first_slot.saturating_add(count);
                if end > slots.len() {
                    return Err(ReadError::corrupt(
                        "grid",
                        format!(
                            "leaf {i} slots {first_slot}..{end} exceed {} slots",
                            slots.len()
                        ),
                    ));
                }
            }
            Node::Leaf { .. } => {}
        }
    }

    if let Some((slot, &tri)) = slots
        .iter()
        .enumerate()
        .find(|(_, &t)| t as usize >= triangle_count)
    {
        return Err(ReadError::corrupt(
            "triangle indices",
            format!("slot {slot} references triangle {tri} of {triangle_count}"),
        ));
    }

    for (i, tri) in index.triangles().iter().enumerate() {
        if let Some(&v) = tri.vertices.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(ReadError::corrupt(
                "triangles",
                format!("triangle {i} references vertex {v} of {vertex_count}"),
            ));
        }
    }
    Ok(())
}
