// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::types::vec3::Vec3;

/// Half-line starting at `origin` and extending along `direction`.
///
/// `direction` does not need to be normalised; hit distances are expressed in
/// multiples of its length.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Direction of travel.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray.
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin.add(&self.direction.scale(t))
    }
}

/// Intersection of a ray with a surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hit {
    /// Intersection point.
    pub point: Vec3,
    /// Ray parameter of the intersection (`>= 0`).
    pub distance: f32,
}
