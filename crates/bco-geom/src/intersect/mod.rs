// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Ray/triangle intersection shared by every collision query.
//!
//! Contract (applies to all entry points here):
//! - A ray whose direction is exactly perpendicular to the triangle normal
//!   never hits. Degenerate triangles have a zero normal and therefore fall
//!   into this branch for every ray.
//! - Hits behind the ray origin (`t < 0`) are rejected.
//! - Containment uses three non-strict same-side tests, so a point exactly on
//!   an edge belongs to every triangle sharing that edge. Which of two
//!   neighbours wins is decided by the caller's tie-break, not here.

#[doc = "Triangle planes (normal and constant)."]
pub mod plane;
#[doc = "Ray/triangle tests, general and vertical."]
pub mod triangle;
