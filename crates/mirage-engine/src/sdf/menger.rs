use crate::math::{Vec2, Vec3};

use super::fold_to_cell;

/// Distance to an axis-aligned rectangle of half-extents `half` centered at
/// the origin.
#[inline]
pub fn sd_rect(p: Vec2, half: Vec2) -> f32 {
    let dx = p.x.abs() - half.x;
    let dy = p.y.abs() - half.y;
    let outside = Vec2::new(dx.max(0.0), dy.max(0.0)).length();
    let inside = dx.max(dy).min(0.0);
    outside + inside
}

/// Union of three infinite square bars of half-width `half_width` running
/// along the X, Y and Z axes through the origin.
///
/// Each bar is a rectangle distance evaluated in the plane perpendicular to it.
#[inline]
pub fn sd_cross(p: Vec3, half_width: f32) -> f32 {
    let half = Vec2::new(half_width, half_width);
    let along_z = sd_rect(Vec2::new(p.x, p.y), half);
    let along_x = sd_rect(Vec2::new(p.y, p.z), half);
    let along_y = sd_rect(Vec2::new(p.z, p.x), half);
    along_z.min(along_x).min(along_y)
}

/// Parameters of the repeating "menger prison" lattice.
///
/// Bars of the coarse cross run through every lattice point `k * cell_size`;
/// the centers of the cells are open space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MengerPrison {
    pub cell_size: f32,
    /// Half-width of the coarse bars.
    pub cross_half_width: f32,
    /// Number of 3x finer subtraction passes. Fixed per evaluation.
    pub iterations: u32,
    /// The bounding cross distance above which refinement is skipped.
    pub hit_threshold: f32,
}

impl MengerPrison {
    /// Center of the cell containing the origin; the safest spawn point.
    pub fn cell_center(&self) -> Vec3 {
        Vec3::splat(self.cell_size * 0.5)
    }

    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        sd_menger_prison(p, self)
    }
}

impl Default for MengerPrison {
    fn default() -> Self {
        Self {
            cell_size: 2.0,
            cross_half_width: 1.0 / 3.0,
            iterations: 5,
            hit_threshold: 0.01,
        }
    }
}

/// Distance estimate for the menger prison lattice.
///
/// The coarse cross is a cheap bound; points further than `hit_threshold`
/// from it return the bound directly. Otherwise `iterations` copies of the
/// cross, each at 3x the previous frequency, are subtracted from it.
pub fn sd_menger_prison(p: Vec3, prison: &MengerPrison) -> f32 {
    let cell = prison.cell_size;
    let half = Vec3::splat(cell * 0.5);
    let q = fold_to_cell(p, cell);

    let bound = sd_cross(q, prison.cross_half_width);
    if bound > prison.hit_threshold {
        return bound;
    }

    let mut d = bound;
    let mut scale = 1.0_f32;
    for _ in 0..prison.iterations {
        scale *= 3.0;
        let r = (q * scale + half).modulo(cell) - half;
        let hole = sd_cross(r, prison.cross_half_width);
        d = d.max(-hole / scale);
    }
    d
}
