// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code, clippy::unwrap_used)]

use bco_core::{FloorType, Mesh, Triangle};
use bco_geom::Vec3;
use proptest::prelude::*;

/// Horizontal right triangle with its right angle at `(x, z)`.
pub fn flat(x: f32, z: f32, size: f32, y: f32) -> [Vec3; 3] {
    [
        Vec3::new(x, y, z),
        Vec3::new(x + size, y, z),
        Vec3::new(x, y, z + size),
    ]
}

/// Mesh with unshared vertices, one triangle per entry.
pub fn mesh_of(tris: &[([Vec3; 3], u16)]) -> Mesh {
    let vertices = tris.iter().flat_map(|(corners, _)| *corners).collect();
    let triangles = tris
        .iter()
        .enumerate()
        .map(|(i, &(_, floor_type))| {
            let base = 3 * i as u32;
            Triangle {
                vertices: [base, base + 1, base + 2],
                floor_type: FloorType(floor_type),
                extra_flag: (i % 7) as u8,
                extra_settings: i as u32 * 0x0101,
            }
        })
        .collect();
    Mesh::new(vertices, triangles).unwrap()
}

/// Coordinates on a quarter-unit lattice, exact in `f32`.
pub fn coord(range: std::ops::Range<i32>) -> impl Strategy<Value = f32> {
    range.prop_map(|v| v as f32 / 4.0)
}

pub fn vertex() -> impl Strategy<Value = Vec3> {
    (coord(-8000..8000), coord(-400..400), coord(-8000..8000)).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// Small triangles scattered over a few cells; floor types drawn from a
/// short list so materials repeat.
pub fn triangle_soup(max: usize) -> impl Strategy<Value = Vec<([Vec3; 3], u16)>> {
    let tri = (vertex(), coord(-600..600), coord(-600..600), coord(-40..40), coord(-600..600))
        .prop_map(|(a, dx, dz, dy, dz2)| {
            [
                a,
                Vec3::new(a.x() + dx, a.y() + dy, a.z()),
                Vec3::new(a.x(), a.y() - dy, a.z() + dz + dz2),
            ]
        });
    let floor = prop::sample::select(vec![0x0000u16, 0x0100, 0x0101, 0x0200, 0x0A07, 0xFFFF]);
    prop::collection::vec((tri, floor), 1..max)
}
