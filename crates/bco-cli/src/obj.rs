// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Minimal Wavefront OBJ reader.
//!
//! Understands `v`, `f` and `usemtl`; everything else is skipped. Face
//! corners may be `a`, `a/b`, `a//c` or `a/b/c`; only the position index is
//! kept. Negative indices count back from the latest vertex. Polygons are
//! fan-triangulated around their first corner.

use std::io::{BufRead, BufReader, Read};

use anyhow::{bail, Context, Result};
use bco_core::{Face, MeshInput};
use bco_geom::Vec3;

/// Reads an OBJ stream into a mesh with one-based face indices.
///
/// Faces declared before any `usemtl` carry an empty material name.
pub fn read_obj<R: Read>(reader: R) -> Result<MeshInput> {
    let mut mesh = MeshInput::default();
    let mut material = String::new();

    for (ix, line) in BufReader::new(reader).lines().enumerate() {
        let line_no = ix + 1;
        let line = line.with_context(|| format!("reading line {line_no}"))?;
        let content = line.split('#').next().unwrap_or_default();
        let mut parts = content.split_whitespace();
        match parts.next() {
            Some("v") => {
                let mut coord = |axis: &str| -> Result<f32> {
                    let text = parts
                        .next()
                        .with_context(|| format!("line {line_no}: missing {axis} coordinate"))?;
                    text.parse()
                        .with_context(|| format!("line {line_no}: bad {axis} coordinate `{text}`"))
                };
                let (x, y, z) = (coord("x")?, coord("y")?, coord("z")?);
                mesh.vertices.push(Vec3::new(x, y, z));
            }
            Some("f") => {
                let corners = parts
                    .map(|corner| corner_index(corner, mesh.vertices.len(), line_no))
                    .collect::<Result<Vec<u32>>>()?;
                if corners.len() < 3 {
                    bail!("line {line_no}: face needs at least three corners");
                }
                for pair in corners[1..].windows(2) {
                    mesh.faces.push(Face {
                        indices: [corners[0], pair[0], pair[1]],
                        material: material.clone(),
                    });
                }
            }
            Some("usemtl") => {
                material = parts.collect::<Vec<_>>().join(" ");
            }
            _ => {}
        }
    }
    Ok(mesh)
}

/// One-based position index of a face corner.
fn corner_index(corner: &str, vertex_count: usize, line_no: usize) -> Result<u32> {
    let position = corner.split('/').next().unwrap_or_default();
    let index: i64 = position
        .parse()
        .with_context(|| format!("line {line_no}: bad face corner `{corner}`"))?;
    let resolved = if index < 0 {
        vertex_count as i64 + index + 1
    } else {
        index
    };
    if resolved < 1 || resolved > vertex_count as i64 {
        bail!("line {line_no}: corner `{corner}` does not name one of {vertex_count} vertices so far");
    }
    u32::try_from(resolved).with_context(|| format!("line {line_no}: corner `{corner}` out of range"))
}
