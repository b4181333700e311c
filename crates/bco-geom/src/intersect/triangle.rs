// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::intersect::plane::Plane;
use crate::types::ray::{Hit, Ray};
use crate::types::vec3::Vec3;

/// Direction of an axis-aligned vertical probe.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Vertical {
    /// Towards `-Y`.
    Down,
    /// Towards `+Y`.
    Up,
}

/// Returns `true` if `point` (assumed on the triangle's plane) lies inside
/// triangle `[a, b, c]` or on one of its edges.
///
/// Each edge's cross product with the point is projected on `normal`; the
/// point is inside iff all three projections are `>= 0`.
#[must_use]
pub fn triangle_contains(point: &Vec3, tri: &[Vec3; 3], normal: &Vec3) -> bool {
    let [a, b, c] = tri;
    let edges = [(a, b), (b, c), (c, a)];
    edges
        .iter()
        .all(|(from, to)| to.sub(from).cross(&point.sub(from)).dot(normal) >= 0.0)
}

/// Intersects `ray` with triangle `tri`.
///
/// Returns the intersection point and the ray parameter `t`, or `None` when
/// the ray is parallel to the plane, the plane lies behind the origin, or the
/// plane point falls outside the triangle.
#[must_use]
pub fn intersect_ray_triangle(ray: &Ray, tri: &[Vec3; 3]) -> Option<Hit> {
    let plane = Plane::from_triangle(tri);
    let denom = plane.normal.dot(&ray.direction);
    if denom == 0.0 {
        return None;
    }
    let t = -plane.signed_distance(&ray.origin) / denom;
    // Also rejects NaN.
    if !(t >= 0.0) {
        return None;
    }
    let point = ray.at(t);
    triangle_contains(&point, tri, &plane.normal).then_some(Hit { point, distance: t })
}

/// Vertical probe at `(x, z)` starting from height `from_y`.
///
/// Same algorithm as [`intersect_ray_triangle`] for a direction of `∓Y`, but
/// the plane height is solved directly instead of through the ray parameter.
/// That keeps the result exact for an infinite `from_y`, which callers use as
/// a "highest surface" sentinel. Returns the hit height.
#[must_use]
pub fn intersect_vertical(x: f32, z: f32, from_y: f32, dir: Vertical, tri: &[Vec3; 3]) -> Option<f32> {
    let plane = Plane::from_triangle(tri);
    let ny = plane.normal.y();
    if ny == 0.0 {
        return None;
    }
    let y = -(plane.normal.x() * x + plane.normal.z() * z + plane.constant) / ny;
    let ahead = match dir {
        Vertical::Down => y <= from_y,
        Vertical::Up => y >= from_y,
    };
    if !ahead {
        return None;
    }
    triangle_contains(&Vec3::new(x, y, z), tri, &plane.normal).then_some(y)
}
