//! Fixed-size linear algebra shared by cameras, gestures and SDF evaluation.
//!
//! Convention (used uniformly across the crate and the shaders):
//! - matrices are row-major
//! - `m * v` transforms a column vector
//! - render space is left-handed, +X right, +Y up, +Z into the screen

mod mat;
mod vec2;
mod vec3;
mod vec4;

pub use mat::{Mat2, Mat3, Mat4};
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;

/// Floored modulo: the result has the sign of `m`, so it is never negative for
/// a positive divisor (`modulo(-0.5, 2.0) == 1.5`).
///
/// A zero or non-finite divisor returns `x` unchanged.
#[inline]
pub fn modulo(x: f32, m: f32) -> f32 {
    if m == 0.0 || !m.is_finite() {
        return x;
    }
    x - m * (x / m).floor()
}

/// Wraps an angle into `(-π, π]`.
#[inline]
pub fn wrap_angle(radians: f32) -> f32 {
    use core::f32::consts::{PI, TAU};
    let wrapped = modulo(radians + PI, TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
