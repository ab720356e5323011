use core::ops::Mul;

use super::{Vec2, Vec3, Vec4};

// Every matrix in the crate is stored row-major and transforms column vectors:
// `m * v` where `v` is a column. Composition `a * b` applies `b` first.

/// 2x2 row-major matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat2 {
    pub rows: [[f32; 2]; 2],
}

impl Mat2 {
    pub const IDENTITY: Mat2 = Mat2 { rows: [[1.0, 0.0], [0.0, 1.0]] };

    #[inline]
    pub const fn from_rows(rows: [[f32; 2]; 2]) -> Self {
        Self { rows }
    }

    /// Counter-clockwise rotation by `radians`.
    pub fn rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_rows([[c, -s], [s, c]])
    }

    pub fn transpose(&self) -> Self {
        let r = self.rows;
        Self::from_rows([[r[0][0], r[1][0]], [r[0][1], r[1][1]]])
    }
}

impl Default for Mat2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat2 {
    type Output = Mat2;
    fn mul(self, rhs: Mat2) -> Mat2 {
        let mut out = [[0.0; 2]; 2];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.rows[i][0] * rhs.rows[0][j] + self.rows[i][1] * rhs.rows[1][j];
            }
        }
        Mat2::from_rows(out)
    }
}

impl Mul<Vec2> for Mat2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, v: Vec2) -> Vec2 {
        let r = self.rows;
        Vec2::new(r[0][0] * v.x + r[0][1] * v.y, r[1][0] * v.x + r[1][1] * v.y)
    }
}

/// 3x3 row-major matrix. Rotations and camera bases.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3 {
    pub rows: [[f32; 3]; 3],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    #[inline]
    pub const fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Builds a matrix whose columns are `x`, `y`, `z`.
    pub fn from_cols(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self::from_rows([[x.x, y.x, z.x], [x.y, y.y, z.y], [x.z, y.z, z.z]])
    }

    #[inline]
    pub fn row(&self, i: usize) -> Vec3 {
        let r = self.rows[i];
        Vec3::new(r[0], r[1], r[2])
    }

    #[inline]
    pub fn col(&self, j: usize) -> Vec3 {
        Vec3::new(self.rows[0][j], self.rows[1][j], self.rows[2][j])
    }

    pub fn transpose(&self) -> Self {
        Self::from_cols(self.row(0), self.row(1), self.row(2))
    }

    /// Rotation of `radians` about `axis` (right-hand rule).
    ///
    /// A zero-length axis yields the identity.
    pub fn rotation(axis: Vec3, radians: f32) -> Self {
        let Some(k) = axis.try_normalize() else {
            return Self::IDENTITY;
        };
        let (s, c) = radians.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (k.x, k.y, k.z);

        Self::from_rows([
            [c + x * x * t, x * y * t - z * s, x * z * t + y * s],
            [y * x * t + z * s, c + y * y * t, y * z * t - x * s],
            [z * x * t - y * s, z * y * t + x * s, c + z * z * t],
        ])
    }

    /// Copy with row `i` negated.
    pub fn negate_row(&self, i: usize) -> Self {
        let mut out = *self;
        for v in out.rows[i].iter_mut() {
            *v = -*v;
        }
        out
    }

    /// Copy with column `j` negated.
    pub fn negate_col(&self, j: usize) -> Self {
        let mut out = *self;
        for row in out.rows.iter_mut() {
            row[j] = -row[j];
        }
        out
    }

    pub fn approx_eq(&self, other: &Mat3, eps: f32) -> bool {
        self.rows
            .iter()
            .flatten()
            .zip(other.rows.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }

    /// Rows padded to `vec4` for WGSL uniform layout.
    pub fn to_padded_rows(&self) -> [[f32; 4]; 3] {
        [
            self.row(0).extend(0.0),
            self.row(1).extend(0.0),
            self.row(2).extend(0.0),
        ]
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat3 {
    type Output = Mat3;
    fn mul(self, rhs: Mat3) -> Mat3 {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            let lhs_row = self.row(i);
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = lhs_row.dot(rhs.col(j));
            }
        }
        Mat3::from_rows(out)
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        Vec3::new(self.row(0).dot(v), self.row(1).dot(v), self.row(2).dot(v))
    }
}

/// 4x4 row-major matrix. Projections and model-view transforms.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub rows: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Remaps NDC depth from `[-1, 1]` to wgpu's `[0, 1]`.
    ///
    /// Applied last, immediately before a clip-space matrix is uploaded.
    #[rustfmt::skip]
    pub const DEPTH_ZERO_TO_ONE: Mat4 = Mat4 {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.5, 0.5],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    #[inline]
    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self { rows }
    }

    /// Embeds a rotation/scale block; translation stays zero.
    pub fn from_mat3(m: Mat3) -> Self {
        let r = m.rows;
        Self::from_rows([
            [r[0][0], r[0][1], r[0][2], 0.0],
            [r[1][0], r[1][1], r[1][2], 0.0],
            [r[2][0], r[2][1], r[2][2], 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn translation(t: Vec3) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, t.x],
            [0.0, 1.0, 0.0, t.y],
            [0.0, 0.0, 1.0, t.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn scale(s: f32) -> Self {
        Self::from_rows([
            [s, 0.0, 0.0, 0.0],
            [0.0, s, 0.0, 0.0],
            [0.0, 0.0, s, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Left-handed perspective projection (+Z into the screen).
    ///
    /// Points on the near plane map to NDC `z = -1`, the far plane to `z = +1`.
    /// Degenerate inputs are clamped: a non-positive or non-finite aspect ratio
    /// becomes `1.0`, and `far` is pushed past `near` when they coincide.
    pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Self {
        let aspect = if aspect.is_finite() && aspect > f32::EPSILON { aspect } else { 1.0 };
        let near = if near > f32::EPSILON { near } else { f32::EPSILON };
        let far = if far - near > f32::EPSILON { far } else { near + 1.0 };

        let half = (fov_y_radians * 0.5).clamp(1.0e-4, core::f32::consts::FRAC_PI_2 - 1.0e-4);
        let f = 1.0 / half.tan();
        let depth = far - near;

        Self::from_rows([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (far + near) / depth, -2.0 * far * near / depth],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    #[inline]
    pub fn row(&self, i: usize) -> Vec4 {
        let r = self.rows[i];
        Vec4::new(r[0], r[1], r[2], r[3])
    }

    #[inline]
    pub fn col(&self, j: usize) -> Vec4 {
        Vec4::new(self.rows[0][j], self.rows[1][j], self.rows[2][j], self.rows[3][j])
    }

    pub fn transpose(&self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.rows[j][i];
            }
        }
        Self::from_rows(out)
    }

    pub fn approx_eq(&self, other: &Mat4, eps: f32) -> bool {
        self.rows
            .iter()
            .flatten()
            .zip(other.rows.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    /// Rows as uploaded to WGSL (`array<vec4<f32>, 4>`, applied with `dot`).
    #[inline]
    pub fn to_rows(&self) -> [[f32; 4]; 4] {
        self.rows
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            let lhs_row = self.row(i);
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = lhs_row.dot(rhs.col(j));
            }
        }
        Mat4::from_rows(out)
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, v: Vec4) -> Vec4 {
        Vec4::new(
            self.row(0).dot(v),
            self.row(1).dot(v),
            self.row(2).dot(v),
            self.row(3).dot(v),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::{FRAC_PI_2, FRAC_PI_3, PI};

    const EPS: f32 = 1.0e-5;

    fn assert_vec3_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < EPS, "{a:?} != {b:?}");
    }

    // ── Mat3 ──────────────────────────────────────────────────────────────

    #[test]
    fn mat3_multiply_literal() {
        let a = Mat3::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let b = Mat3::from_rows([[9.0, 8.0, 7.0], [6.0, 5.0, 4.0], [3.0, 2.0, 1.0]]);
        let expected =
            Mat3::from_rows([[30.0, 24.0, 18.0], [84.0, 69.0, 54.0], [138.0, 114.0, 90.0]]);
        assert_eq!(a * b, expected);
    }

    #[test]
    fn mat3_times_column_vector_uses_rows() {
        let m = Mat3::from_rows([[1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.0, 0.0, 2.0]]);
        assert_eq!(m * Vec3::new(1.0, 1.0, 1.0), Vec3::new(6.0, 1.0, 2.0));
    }

    #[test]
    fn rotation_then_inverse_rotation_is_identity() {
        let axes = [Vec3::X, Vec3::Y, Vec3::new(1.0, -2.0, 0.5)];
        for axis in axes {
            for theta in [0.3, FRAC_PI_3, 2.5, -1.1] {
                let r = Mat3::rotation(axis, theta) * Mat3::rotation(axis, -theta);
                assert!(r.approx_eq(&Mat3::IDENTITY, EPS), "axis {axis:?} θ {theta}");
            }
        }
    }

    #[test]
    fn rotation_about_z_turns_x_into_y() {
        let r = Mat3::rotation(Vec3::Z, FRAC_PI_2);
        assert_vec3_close(r * Vec3::X, Vec3::Y);
    }

    #[test]
    fn rotation_transpose_is_inverse() {
        let r = Mat3::rotation(Vec3::new(0.2, 0.9, -0.4), 1.7);
        assert!((r * r.transpose()).approx_eq(&Mat3::IDENTITY, EPS));
    }

    #[test]
    fn rotation_with_zero_axis_is_identity() {
        assert_eq!(Mat3::rotation(Vec3::ZERO, PI), Mat3::IDENTITY);
    }

    #[test]
    fn negate_row_and_col() {
        let m = Mat3::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        assert_eq!(m.negate_row(2).rows[2], [-7.0, -8.0, -9.0]);
        assert_eq!(m.negate_col(2).col(2), Vec3::new(-3.0, -6.0, -9.0));
        assert_eq!(m.negate_row(2).rows[0], m.rows[0]);
    }

    // ── Mat4 ──────────────────────────────────────────────────────────────

    #[test]
    fn perspective_maps_near_plane_center_to_minus_one() {
        let p = Mat4::perspective(FRAC_PI_3, 16.0 / 9.0, 0.1, 100.0);
        let ndc = (p * Vec4::new(0.0, 0.0, 0.1, 1.0)).project().unwrap();
        assert_vec3_close(ndc, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn perspective_maps_far_plane_center_to_plus_one() {
        let p = Mat4::perspective(FRAC_PI_3, 1.0, 0.5, 50.0);
        let ndc = (p * Vec4::new(0.0, 0.0, 50.0, 1.0)).project().unwrap();
        assert!((ndc.z - 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn perspective_keeps_x_sign_and_w_is_depth() {
        let p = Mat4::perspective(FRAC_PI_2, 1.0, 0.1, 10.0);
        let clip = p * Vec4::new(1.0, -1.0, 2.0, 1.0);
        assert!(clip.x > 0.0);
        assert!(clip.y < 0.0);
        assert!((clip.w - 2.0).abs() < EPS);
    }

    #[test]
    fn perspective_guards_zero_aspect() {
        let p = Mat4::perspective(FRAC_PI_2, 0.0, 0.1, 10.0);
        assert!(p.rows.iter().flatten().all(|v| v.is_finite()));
        assert_eq!(p, Mat4::perspective(FRAC_PI_2, 1.0, 0.1, 10.0));
    }

    #[test]
    fn depth_remap_moves_near_plane_to_zero() {
        let p = Mat4::DEPTH_ZERO_TO_ONE * Mat4::perspective(FRAC_PI_3, 1.0, 0.1, 100.0);
        let ndc = (p * Vec4::new(0.0, 0.0, 0.1, 1.0)).project().unwrap();
        assert!(ndc.z.abs() < 1.0e-4);
    }

    #[test]
    fn translation_applies_after_rotation_in_composition() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0))
            * Mat4::from_mat3(Mat3::rotation(Vec3::Z, FRAC_PI_2));
        let p = (m * Vec4::point(Vec3::X)).truncate();
        assert_vec3_close(p, Vec3::new(1.0, 3.0, 3.0));
    }

    #[test]
    fn mat4_transpose_roundtrip() {
        let m = Mat4::perspective(1.0, 1.3, 0.2, 9.0) * Mat4::translation(Vec3::splat(2.0));
        assert_eq!(m.transpose().transpose(), m);
    }

    // ── Mat2 ──────────────────────────────────────────────────────────────

    #[test]
    fn mat2_rotation_quarter_turn() {
        let v = Mat2::rotation(FRAC_PI_2) * Vec2::new(1.0, 0.0);
        assert!((v - Vec2::new(0.0, 1.0)).length() < EPS);
        let r = Mat2::rotation(0.7) * Mat2::rotation(0.7).transpose();
        assert!((r.rows[0][0] - 1.0).abs() < EPS && r.rows[0][1].abs() < EPS);
    }
}
