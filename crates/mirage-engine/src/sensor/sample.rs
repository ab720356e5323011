use crate::math::Mat3;

/// Quaternion-like rotation-vector sample `(x, y, z, w)` as reported by the
/// device rotation sensor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl RotationSample {
    pub const IDENTITY: RotationSample = RotationSample::new(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Builds a sample from the vector part only, deriving the scalar part
    /// from the unit-norm constraint. Slightly denormalized inputs clamp the
    /// scalar to zero.
    pub fn from_vector(x: f32, y: f32, z: f32) -> Self {
        let w_sq = 1.0 - x * x - y * y - z * z;
        let w = if w_sq > 0.0 { w_sq.sqrt() } else { 0.0 };
        Self { x, y, z, w }
    }

    /// Sample for a rotation of `radians` about a unit `axis`.
    pub fn from_axis_angle(axis: [f32; 3], radians: f32) -> Self {
        let (s, c) = (radians * 0.5).sin_cos();
        Self::new(axis[0] * s, axis[1] * s, axis[2] * s, c)
    }

    /// Whether the scalar part is exactly one. Some sensors report this
    /// before they have produced a real reading.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.w == 1.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// Row-major rotation matrix in the sensor frame (right-handed, Z out of
    /// the screen). Non-finite samples map to the identity.
    pub fn to_matrix(&self) -> Mat3 {
        if !self.is_finite() {
            return Mat3::IDENTITY;
        }
        let (q0, q1, q2, q3) = (self.w, self.x, self.y, self.z);

        let sq_q1 = 2.0 * q1 * q1;
        let sq_q2 = 2.0 * q2 * q2;
        let sq_q3 = 2.0 * q3 * q3;
        let q1_q2 = 2.0 * q1 * q2;
        let q3_q0 = 2.0 * q3 * q0;
        let q1_q3 = 2.0 * q1 * q3;
        let q2_q0 = 2.0 * q2 * q0;
        let q2_q3 = 2.0 * q2 * q3;
        let q1_q0 = 2.0 * q1 * q0;

        Mat3::from_rows([
            [1.0 - sq_q2 - sq_q3, q1_q2 - q3_q0, q1_q3 + q2_q0],
            [q1_q2 + q3_q0, 1.0 - sq_q1 - sq_q3, q2_q3 - q1_q0],
            [q1_q3 - q2_q0, q2_q3 + q1_q0, 1.0 - sq_q1 - sq_q2],
        ])
    }
}

impl Default for RotationSample {
    fn default() -> Self {
        Self::IDENTITY
    }
}
