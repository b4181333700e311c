// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::types::vec3::Vec3;

/// Implicit plane `normal · p + constant = 0` through a triangle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    /// Unit normal, or zero for a degenerate (zero-area) triangle.
    pub normal: Vec3,
    /// Plane constant `D`.
    pub constant: f32,
}

impl Plane {
    /// Plane through triangle `[a, b, c]`.
    ///
    /// The normal is `normalize((b - a) × (c - a))` and `D` is taken at the
    /// centroid. Colinear vertices give a zero normal and `D = 0`.
    #[must_use]
    pub fn from_triangle(tri: &[Vec3; 3]) -> Self {
        let [a, b, c] = tri;
        let normal = b.sub(a).cross(&c.sub(a)).normalize();
        let sum = a.add(b).add(c);
        let centroid = Vec3::new(sum.x() / 3.0, sum.y() / 3.0, sum.z() / 3.0);
        Self {
            normal,
            constant: -normal.dot(&centroid),
        }
    }

    /// Returns `true` for the zero-normal plane of a degenerate triangle.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.normal.is_zero()
    }

    /// Signed distance of `p` from the plane (scaled by the normal length).
    #[must_use]
    pub fn signed_distance(&self, p: &Vec3) -> f32 {
        self.normal.dot(p) + self.constant
    }
}
