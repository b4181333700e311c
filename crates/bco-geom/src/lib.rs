// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for track collision.

This crate provides:
- A float32 vector (`Vec3`) and axis-aligned boxes (`Aabb`).
- X/Z rectangles (`Rect`) used to partition a track into grid cells.
- Triangle planes (`Plane`) and the ray/triangle intersection primitive
  shared by every collision query.

Design notes:
- Float32 throughout; the collision file stores `f32` and queries must agree
  with what a reader of that file computes.
- Degenerate triangles are never rejected here. Their normal is the zero
  vector, which makes every ray parallel to them, so they are always missed.
- Rustdoc is treated as part of the contract; public items are documented.
"]

/// Ray/plane/triangle intersection.
pub mod intersect;
/// Foundational geometric types.
pub mod types;

pub use intersect::plane::Plane;
pub use intersect::triangle::{intersect_ray_triangle, intersect_vertical, triangle_contains, Vertical};
pub use types::aabb::Aabb;
pub use types::ray::{Hit, Ray};
pub use types::rect::Rect;
pub use types::vec3::Vec3;
