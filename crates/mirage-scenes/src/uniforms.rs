//! Uniform blocks, laid out to match the WGSL structs field for field.
//!
//! Matrices go up as rows and are applied in the shaders with dot products.

use bytemuck::{Pod, Zeroable};
use mirage_engine::math::{Mat3, Mat4, Vec3};

/// Shared by the raymarched scenes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
pub(crate) struct RaymarchUniforms {
    /// Camera-to-world rotation rows.
    pub rotation: [[f32; 4]; 3],
    /// xyz camera position, w elapsed seconds.
    pub position_time: [f32; 4],
    /// width, height, tan(fov_y / 2), max distance.
    pub view: [f32; 4],
    /// max steps, surface epsilon.
    pub march: [f32; 4],
    /// Scene-specific shape parameters.
    pub shape_a: [f32; 4],
    pub shape_b: [f32; 4],
    pub shape_c: [f32; 4],
}

impl RaymarchUniforms {
    pub fn camera(
        rotation: &Mat3,
        position: Vec3,
        elapsed: f32,
        size: (u32, u32),
        fov_y: f32,
        max_distance: f32,
        max_steps: u32,
    ) -> Self {
        Self {
            rotation: rotation.to_padded_rows(),
            position_time: position.extend(elapsed),
            view: [
                size.0 as f32,
                size.1 as f32,
                (fov_y * 0.5).tan(),
                max_distance,
            ],
            march: [max_steps as f32, 1.0e-3, 0.0, 0.0],
            ..Self::default()
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
pub(crate) struct CubeUniforms {
    pub mvp: [[f32; 4]; 4],
    /// x elapsed seconds, y 1.0 on the first frame (nothing to reflect yet).
    pub params: [f32; 4],
}

impl CubeUniforms {
    pub fn new(mvp: &Mat4, elapsed: f32, first_frame: bool) -> Self {
        Self {
            mvp: mvp.to_rows(),
            params: [elapsed, if first_frame { 1.0 } else { 0.0 }, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
pub(crate) struct MandelbrotUniforms {
    /// center x, center y, zoom, rotation radians.
    pub view: [f32; 4],
    /// width, height, iterations, palette index.
    pub screen: [f32; 4],
    /// x elapsed seconds.
    pub time: [f32; 4],
}
