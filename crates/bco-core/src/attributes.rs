// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-triangle attributes derived once at build time.

use bco_geom::{Plane, Vec3};
use thiserror::Error;

/// Fixed-point scale of stored normal components (four decimal places).
pub const NORMAL_SCALE: f32 = 10_000.0;

/// A normal component whose fixed-point value does not fit in `i16`.
///
/// Unit normals stay within `±10000`; only non-finite vertex data gets here.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("normal component {value} does not fit a 16-bit fixed-point field")]
pub struct QuantizeError {
    /// Offending component.
    pub value: f32,
}

/// Quantizes a normal to `round(component * 10000)` per axis.
pub fn quantize_normal(normal: &Vec3) -> Result<[i16; 3], QuantizeError> {
    let mut out = [0i16; 3];
    for (slot, value) in out.iter_mut().zip(normal.to_array()) {
        let scaled = (value * NORMAL_SCALE).round();
        if !(scaled >= f32::from(i16::MIN) && scaled <= f32::from(i16::MAX)) {
            return Err(QuantizeError { value });
        }
        *slot = scaled as i16;
    }
    Ok(out)
}

/// Packed byte naming which corner holds each footprint extreme.
///
/// Bits 7-6: corner with minimum X. Bits 5-4: minimum Z. Bits 3-2: maximum X.
/// Bits 1-0: maximum Z. Ties resolve to the lowest corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct MinMaxLookup(pub u8);

impl MinMaxLookup {
    /// Computes the lookup byte for three corners.
    pub fn from_corners(corners: &[Vec3; 3]) -> Self {
        let xs = corners.map(|c| c.x());
        let zs = corners.map(|c| c.z());
        let packed = (extreme(&xs, |a, b| a < b) << 6)
            | (extreme(&zs, |a, b| a < b) << 4)
            | (extreme(&xs, |a, b| a > b) << 2)
            | extreme(&zs, |a, b| a > b);
        Self(packed)
    }

    /// Corner index holding the minimum X.
    pub fn min_x(self) -> usize {
        usize::from((self.0 >> 6) & 0b11)
    }

    /// Corner index holding the minimum Z.
    pub fn min_z(self) -> usize {
        usize::from((self.0 >> 4) & 0b11)
    }

    /// Corner index holding the maximum X.
    pub fn max_x(self) -> usize {
        usize::from((self.0 >> 2) & 0b11)
    }

    /// Corner index holding the maximum Z.
    pub fn max_z(self) -> usize {
        usize::from(self.0 & 0b11)
    }
}

fn extreme(values: &[f32; 3], better: impl Fn(f32, f32) -> bool) -> u8 {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if better(v, values[best]) {
            best = i;
        }
    }
    best as u8
}

/// Geometric attributes of one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleAttributes {
    /// Unit normal, or zero for a degenerate triangle.
    pub normal: Vec3,
    /// `D` in `normal . p + D = 0`, taken at the centroid.
    pub plane_constant: f32,
    /// Fixed-point normal as stored on disk.
    pub quantized_normal: [i16; 3],
    /// Footprint extreme lookup.
    pub min_max: MinMaxLookup,
}

impl TriangleAttributes {
    /// Derives the attributes of a triangle from its corner positions.
    pub fn derive(corners: &[Vec3; 3]) -> Result<Self, QuantizeError> {
        let plane = Plane::from_triangle(corners);
        Ok(Self {
            normal: plane.normal,
            plane_constant: plane.constant,
            quantized_normal: quantize_normal(&plane.normal)?,
            min_max: MinMaxLookup::from_corners(corners),
        })
    }

    /// Returns `true` when the triangle has no area.
    pub fn is_degenerate(&self) -> bool {
        self.normal.is_zero()
    }
}
