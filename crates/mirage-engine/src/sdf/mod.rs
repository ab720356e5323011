//! Analytic signed distance estimators.
//!
//! All functions are pure: negative inside geometry, zero on the surface,
//! positive outside. The same formulas run in the raymarching shaders; the
//! host copies are evaluated once per frame at the camera for collision.

mod capsule;
mod menger;

pub use capsule::{sd_capsule, Capsule, CapsuleField};
pub use menger::{sd_cross, sd_menger_prison, sd_rect, MengerPrison};

/// Folds `p` into the repeating cell of edge `cell` centered on the origin,
/// so lattice points `k * cell` all map to zero.
///
/// The modulo runs on `p + cell / 2`. Where it yields exactly zero, the cell
/// origin, the folded point is the corner `-cell / 2`: the middle of the open
/// space between lattice bars.
#[inline]
pub fn fold_to_cell(p: crate::math::Vec3, cell: f32) -> crate::math::Vec3 {
    let half = cell * 0.5;
    (p + crate::math::Vec3::splat(half)).modulo(cell) - crate::math::Vec3::splat(half)
}
