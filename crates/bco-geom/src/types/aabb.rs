// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::types::rect::Rect;
use crate::types::vec3::Vec3;

/// Axis-aligned bounding box in track space.
///
/// `min <= max` per component; every constructor sorts its inputs, so no
/// corner pair is invalid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Box spanned by two opposite corners, given in either order.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min_each(&b),
            max: a.max_each(&b),
        }
    }

    /// Bounds of one triangle.
    #[must_use]
    pub fn of_triangle(tri: &[Vec3; 3]) -> Self {
        Self::new(tri[0], tri[1]).including(&tri[2])
    }

    /// Smallest box containing all `points`; `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(
            rest.iter()
                .fold(Self::new(*first, *first), |acc, p| acc.including(p)),
        )
    }

    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// This box grown to contain `p`.
    #[must_use]
    pub fn including(&self, p: &Vec3) -> Self {
        Self {
            min: self.min.min_each(p),
            max: self.max.max_each(p),
        }
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min_each(&other.min),
            max: self.max.max_each(&other.max),
        }
    }

    /// Inclusive overlap: boxes sharing a face overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x() <= other.max.x()
            && other.min.x() <= self.max.x()
            && self.min.y() <= other.max.y()
            && other.min.y() <= self.max.y()
            && self.min.z() <= other.max.z()
            && other.min.z() <= self.max.z()
    }

    /// Footprint on the X/Z ground plane.
    #[must_use]
    pub fn xz(&self) -> Rect {
        Rect::new(self.min.x(), self.min.z(), self.max.x(), self.max.z())
    }
}
