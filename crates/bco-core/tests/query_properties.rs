// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
//! Height probes and picking over built indices and runtime grids.

mod common;

use bco_core::{BuildParams, CollisionIndex, Mesh, RemapTable, RuntimeCollision};
use bco_geom::{Ray, Vec3};
use common::{flat, mesh_of};
use proptest::prelude::*;

/// Flat triangle at height `h` whose interior contains `(x, z)`.
fn covering(x: f32, z: f32, h: f32) -> [Vec3; 3] {
    flat(x - 50.0, z - 50.0, 150.0, h)
}

proptest! {
    #[test]
    fn topmost_probe_finds_a_flat_floor(
        x in -4000i32..4000,
        z in -4000i32..4000,
        h in -2000i32..2000,
        cell in prop::sample::select(vec![25, 100, 1000, 3000]),
        depth in 0u32..6,
    ) {
        let (x, z, h) = (x as f32, z as f32, h as f32 / 8.0);
        let mesh = mesh_of(&[(covering(x, z, h), 0x0100)]);
        let params = BuildParams::export(cell, depth, 1);
        let index = CollisionIndex::build(&mesh, &RemapTable::default(), &params).unwrap();
        let got = index.query().height_below(x, z, f32::INFINITY).unwrap();
        prop_assert!((got - h).abs() <= 1.0e-3, "expected {h}, got {got}");
    }

    #[test]
    fn closest_height_picks_the_nearer_floor(
        h1 in -500i32..500,
        gap in 2i32..400,
        t in 1i32..1000,
    ) {
        let (lo, hi) = (h1 as f32, (h1 + gap) as f32);
        // Strictly between the two floors.
        let y = lo + (hi - lo) * (t as f32 / 1000.0);
        prop_assume!(y > lo && y < hi);
        let mesh = mesh_of(&[(covering(10.0, 10.0, lo), 1), (covering(10.0, 10.0, hi), 2)]);
        let runtime = RuntimeCollision::build(mesh).unwrap();
        let got = runtime.query().closest_height(10.0, 10.0, y).unwrap();
        let expected = if (hi - y).abs() < (y - lo).abs() { hi } else { lo };
        prop_assert_eq!(got, expected);
    }
}

#[test]
fn stacked_floors_resolve_by_start_height() {
    let mesh = mesh_of(&[
        (covering(0.0, 0.0, 0.0), 1),
        (covering(0.0, 0.0, 30.0), 2),
        (covering(0.0, 0.0, 60.0), 3),
    ]);
    let index = CollisionIndex::build(&mesh, &RemapTable::default(), &BuildParams::default()).unwrap();
    let q = index.query();
    assert_eq!(q.height_below(0.0, 0.0, f32::INFINITY), Some(60.0));
    assert_eq!(q.height_below(0.0, 0.0, 59.0), Some(30.0));
    assert_eq!(q.height_below(0.0, 0.0, 30.0), Some(30.0));
    assert_eq!(q.height_below(0.0, 0.0, -1.0), None);
    assert_eq!(q.ground_below(0.0, 0.0, 10.0).unwrap().triangle, 0);
    assert_eq!(q.closest_height(0.0, 0.0, 50.0), Some(60.0));
    assert_eq!(q.closest_height(0.0, 0.0, -100.0), Some(0.0));
}

#[test]
fn walls_are_never_ground() {
    let wall = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(100.0, 0.0, 0.0),
        Vec3::new(0.0, 100.0, 0.0),
    ];
    let mesh = mesh_of(&[(wall, 1)]);
    let runtime = RuntimeCollision::build(mesh).unwrap();
    assert_eq!(runtime.query().height_below(10.0, 0.0, f32::INFINITY), None);

    // A horizontal ray still hits it.
    let ray = Ray::new(Vec3::new(10.0, 10.0, -50.0), Vec3::new(0.0, 0.0, 1.0));
    let hit = runtime.query().first_hit(&ray).unwrap();
    assert_eq!(hit.triangle, 0);
    assert!((hit.distance - 50.0).abs() < 1.0e-4);
}

#[test]
fn degenerate_triangles_are_always_missed() {
    let sliver = [
        Vec3::new(0.0, 5.0, 0.0),
        Vec3::new(10.0, 5.0, 10.0),
        Vec3::new(20.0, 5.0, 20.0),
    ];
    let mesh = mesh_of(&[(sliver, 1)]);
    let runtime = RuntimeCollision::build(mesh).unwrap();
    assert_eq!(runtime.query().height_below(10.0, 10.0, f32::INFINITY), None);
    let ray = Ray::new(Vec3::new(10.0, 50.0, 10.0), Vec3::new(0.0, -1.0, 0.0));
    assert!(runtime.query().first_hit(&ray).is_none());
}

#[test]
fn first_hit_reaches_distant_triangles() {
    let vertices = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(9000.0, 0.0, 9000.0),
        Vec3::new(9010.0, 0.0, 9000.0),
        Vec3::new(9000.0, 0.0, 9010.0),
    ];
    let mesh = Mesh::from_indices(vertices, &[[0, 1, 2], [3, 4, 5]]).unwrap();
    let runtime = RuntimeCollision::build(mesh).unwrap();
    let ray = Ray::new(Vec3::new(9001.0, 100.0, 9001.0), Vec3::new(0.0, -1.0, 0.0));
    let hit = runtime.query().first_hit(&ray).unwrap();
    assert_eq!(hit.triangle, 1);
    assert!((hit.point.y()).abs() < 1.0e-4);
}
