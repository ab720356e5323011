use crate::math::Vec3;

use super::fold_to_cell;

/// Distance from `p` to the capsule around segment `a`–`b` with radius `r`.
///
/// The projection factor onto the segment is clamped to `[0, 1]`; a zero
/// length segment degenerates to a sphere around `a`.
pub fn sd_capsule(p: Vec3, a: Vec3, b: Vec3, r: f32) -> f32 {
    let pa = p - a;
    let ba = b - a;
    let len_sq = ba.dot(ba);
    let h = if len_sq > f32::EPSILON {
        (pa.dot(ba) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (pa - ba * h).length() - r
}

/// Capsule primitive parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Capsule {
    pub a: Vec3,
    pub b: Vec3,
    pub radius: f32,
}

impl Capsule {
    pub const fn new(a: Vec3, b: Vec3, radius: f32) -> Self {
        Self { a, b, radius }
    }

    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        sd_capsule(p, self.a, self.b, self.radius)
    }
}

/// A capsule repeated on an infinite cubic lattice.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CapsuleField {
    pub capsule: Capsule,
    pub cell_size: f32,
}

impl CapsuleField {
    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        self.capsule.distance(fold_to_cell(p, self.cell_size))
    }
}

impl Default for CapsuleField {
    fn default() -> Self {
        Self {
            capsule: Capsule::new(Vec3::new(0.0, -0.6, 0.0), Vec3::new(0.0, 0.6, 0.0), 0.35),
            cell_size: 3.0,
        }
    }
}
