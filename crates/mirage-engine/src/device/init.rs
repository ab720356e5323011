/// What the scenes require from an adapter, and how frames are presented.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// FIFO paces frames to vsync, like a GL surface view's render callback.
    pub present_mode: wgpu::PresentMode,

    /// Scene shaders write linear color; an sRGB surface applies the encode
    /// when the final blit lands on screen.
    pub prefer_srgb: bool,

    pub power_preference: wgpu::PowerPreference,

    /// Adapters whose `max_texture_dimension_2d` is below this are rejected.
    ///
    /// Off-screen targets are allocated at surface size, so this is also the
    /// smallest window edge the host can render without clamping.
    pub min_texture_dimension: u32,

    /// Hint passed to the surface configuration.
    pub frame_latency: u32,
}

impl GpuInit {
    /// Limits requested from the device.
    ///
    /// Everything the scenes use fits the GLES3-class downlevel set; texture
    /// extents are lifted to whatever the adapter offers so full-resolution
    /// targets on large displays stay complete.
    pub fn required_limits(&self, adapter: &wgpu::Limits) -> wgpu::Limits {
        wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.clone())
    }

    /// Checks an adapter's limits against [`GpuInit::min_texture_dimension`].
    pub fn accepts(&self, adapter: &wgpu::Limits) -> bool {
        adapter.max_texture_dimension_2d >= self.min_texture_dimension
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            present_mode: wgpu::PresentMode::Fifo,
            prefer_srgb: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            min_texture_dimension: 2048,
            frame_latency: 2,
        }
    }
}
