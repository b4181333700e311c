// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types (vector, boxes, rectangles, rays).
//!
//! Overlap semantics are inclusive on faces: a triangle touching a cell
//! boundary belongs to both cells, so a point on the boundary finds it from
//! either side.

#[doc = "Axis-aligned bounding boxes."]
pub mod aabb;
#[doc = "Rays and ray hits."]
pub mod ray;
#[doc = "Rectangles on the X/Z ground plane."]
pub mod rect;
#[doc = "Float32 3D vector."]
pub mod vec3;
