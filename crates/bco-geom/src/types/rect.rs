// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

/// Axis-aligned rectangle on the X/Z ground plane.
///
/// Grid cells, quadtree quadrants and triangle footprints are all `Rect`s.
/// Height (Y) plays no part in cell assignment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    min_x: f32,
    min_z: f32,
    max_x: f32,
    max_z: f32,
}

impl Rect {
    /// Creates a rectangle from its corners. Callers keep `min <= max`.
    #[must_use]
    pub const fn new(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Self {
        Self {
            min_x,
            min_z,
            max_x,
            max_z,
        }
    }

    /// Minimum X.
    #[must_use]
    pub fn min_x(&self) -> f32 {
        self.min_x
    }

    /// Minimum Z.
    #[must_use]
    pub fn min_z(&self) -> f32 {
        self.min_z
    }

    /// Maximum X.
    #[must_use]
    pub fn max_x(&self) -> f32 {
        self.max_x
    }

    /// Maximum Z.
    #[must_use]
    pub fn max_z(&self) -> f32 {
        self.max_z
    }

    /// Extent along X.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Extent along Z.
    #[must_use]
    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }

    /// Centre point `(x, z)`.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) * 0.5,
            (self.min_z + self.max_z) * 0.5,
        )
    }

    /// Returns `true` if the rectangles overlap (inclusive on edges).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_z < other.min_z
            || self.min_z > other.max_z)
    }

    /// Returns `true` if `(x, z)` lies inside or on the edge.
    #[must_use]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// Union of two rectangles.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_z.min(other.min_z),
            self.max_x.max(other.max_x),
            self.max_z.max(other.max_z),
        )
    }

    /// One of the four equal quadrants, `q = qx + 2 * qz`.
    ///
    /// `qx = 0` is the low-X half and `qz = 0` the low-Z half, so quadrants
    /// are numbered in the same row-major order as top-level grid cells.
    /// Values of `q` above 3 are taken modulo 4.
    #[must_use]
    pub fn quadrant(&self, q: usize) -> Self {
        let (cx, cz) = self.center();
        let (min_x, max_x) = if q & 1 == 0 {
            (self.min_x, cx)
        } else {
            (cx, self.max_x)
        };
        let (min_z, max_z) = if q & 2 == 0 {
            (self.min_z, cz)
        } else {
            (cz, self.max_z)
        };
        Self::new(min_x, min_z, max_x, max_z)
    }

    /// Quadrant index (`qx + 2 * qz`) a point falls into.
    ///
    /// Points on the centre lines go to the high side, matching the
    /// `floor`-based cell lookup used for top-level cells.
    #[must_use]
    pub fn quadrant_of(&self, x: f32, z: f32) -> usize {
        let (cx, cz) = self.center();
        usize::from(x >= cx) + 2 * usize::from(z >= cz)
    }
}
