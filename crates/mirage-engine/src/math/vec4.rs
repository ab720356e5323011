use core::ops::{Add, Mul, Sub};

use super::Vec3;

/// 4D vector; homogeneous points and clip-space coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Vec4 = Vec4::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Homogeneous point (`w = 1`).
    #[inline]
    pub const fn point(p: Vec3) -> Self {
        Self::new(p.x, p.y, p.z, 1.0)
    }

    #[inline]
    pub fn dot(self, rhs: Vec4) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn normalize(self) -> Vec4 {
        let len = self.length();
        if len > f32::EPSILON && len.is_finite() {
            self * (1.0 / len)
        } else {
            Vec4::ZERO
        }
    }

    #[inline]
    pub fn truncate(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Perspective divide. Returns `None` when `w` is zero.
    #[inline]
    pub fn project(self) -> Option<Vec3> {
        if self.w.abs() <= f32::EPSILON {
            None
        } else {
            Some(self.truncate() / self.w)
        }
    }

    /// Component-wise floored modulo; see [`super::modulo`].
    #[inline]
    pub fn modulo(self, m: f32) -> Vec4 {
        Vec4::new(
            super::modulo(self.x, m),
            super::modulo(self.y, m),
            super::modulo(self.z, m),
            super::modulo(self.w, m),
        )
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    #[inline]
    fn add(self, rhs: Vec4) -> Vec4 {
        Vec4::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl Sub for Vec4 {
    type Output = Vec4;
    #[inline]
    fn sub(self, rhs: Vec4) -> Vec4 {
        Vec4::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

impl Mul<f32> for Vec4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, rhs: f32) -> Vec4 {
        Vec4::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}
