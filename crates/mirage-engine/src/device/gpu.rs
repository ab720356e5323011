use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::GpuInit;

/// Color format of every off-screen target. Sampled by the next frame and by
/// the blit, so it must be both renderable and filterable.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Format of every depth/stencil attachment; the GL `DEPTH24_STENCIL8`
/// renderbuffer equivalent.
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Device, queue and the window surface the scenes present to.
///
/// The surface is never configured larger than the device's
/// `max_texture_dimension_2d`: framebuffers are allocated at surface size and
/// an oversized one would fail its completeness check.
pub struct Gpu<'w> {
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    max_dimension: u32,
}

/// The acquired surface texture for one frame.
pub struct SurfaceFrame {
    texture: wgpu::SurfaceTexture,
    pub(crate) view: wgpu::TextureView,
}

/// What the host should do when the surface cannot hand out a texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was reconfigured; try again next frame.
    Reconfigured,
    /// Transient; skip this frame.
    SkipFrame,
    /// Out of memory. Rendering cannot continue.
    Fatal,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;

        let info = adapter.get_info();
        let adapter_limits = adapter.limits();
        log::info!(
            "adapter `{}` ({:?}), max texture {}",
            info.name,
            info.backend,
            adapter_limits.max_texture_dimension_2d
        );

        anyhow::ensure!(
            init.accepts(&adapter_limits),
            "adapter max texture dimension {} is below the required {}",
            adapter_limits.max_texture_dimension_2d,
            init.min_texture_dimension
        );
        check_target_formats(&adapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("mirage device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.required_limits(&adapter_limits),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_surface_format(&caps.formats, init.prefer_srgb)
            .context("surface reports no formats")?;
        let max_dimension = device.limits().max_texture_dimension_2d;
        let (width, height) = clamp_extent(size.width, size.height, max_dimension);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: init.present_mode,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: init.frame_latency,
        };
        surface.configure(&device, &config);
        log::debug!("surface {width}x{height} {format:?}");

        Ok(Gpu {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            max_dimension,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Configured surface extent; never above [`Gpu::max_texture_dimension`].
    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn max_texture_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Reconfigures the surface for a new window size. Zero-sized (minimized)
    /// windows keep the previous configuration.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        let (width, height) = clamp_extent(size.width, size.height, self.max_dimension);
        if (width, height) != (size.width, size.height) {
            log::warn!(
                "window {}x{} exceeds the {} texture limit; rendering at {width}x{height}",
                size.width,
                size.height,
                self.max_dimension
            );
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquires this frame's surface texture, reconfiguring a lost or outdated
    /// surface on the way.
    pub fn acquire(&mut self) -> std::result::Result<SurfaceFrame, SurfaceErrorAction> {
        match self.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(SurfaceFrame { texture, view })
            }
            Err(err) => {
                let action = surface_error_action(&err);
                match action {
                    SurfaceErrorAction::Reconfigured => {
                        log::debug!("surface {err}; reconfiguring");
                        self.surface.configure(&self.device, &self.config);
                    }
                    SurfaceErrorAction::SkipFrame => log::debug!("surface {err}; skipping frame"),
                    SurfaceErrorAction::Fatal => log::error!("surface {err}"),
                }
                Err(action)
            }
        }
    }

    /// Presents a frame whose commands were already submitted.
    pub fn present(&self, frame: SurfaceFrame) {
        let SurfaceFrame { texture, view } = frame;
        drop(view);
        texture.present();
    }
}

fn check_target_formats(adapter: &wgpu::Adapter) -> Result<()> {
    let color = adapter.get_texture_format_features(OFFSCREEN_FORMAT);
    anyhow::ensure!(
        usable_as_mirror_target(&color),
        "{OFFSCREEN_FORMAT:?} cannot be both rendered to and sampled on this adapter"
    );
    let depth = adapter.get_texture_format_features(DEPTH_STENCIL_FORMAT);
    anyhow::ensure!(
        depth
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT),
        "{DEPTH_STENCIL_FORMAT:?} is not a render attachment on this adapter"
    );
    Ok(())
}

/// A ping-pong target is written one frame and sampled the next.
fn usable_as_mirror_target(features: &wgpu::TextureFormatFeatures) -> bool {
    features.allowed_usages.contains(
        wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
    ) && features
        .flags
        .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE)
}

fn pick_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = *formats.first()?;
    if !prefer_srgb {
        return Some(formats.iter().copied().find(|f| !f.is_srgb()).unwrap_or(first));
    }
    Some(formats.iter().copied().find(|f| f.is_srgb()).unwrap_or(first))
}

/// Clamps each edge to `max`; a zero edge becomes one.
fn clamp_extent(width: u32, height: u32, max: u32) -> (u32, u32) {
    (width.clamp(1, max.max(1)), height.clamp(1, max.max(1)))
}

fn surface_error_action(err: &SurfaceError) -> SurfaceErrorAction {
    match err {
        SurfaceError::Lost | SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        SurfaceError::Timeout | SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{TextureFormat, TextureFormatFeatureFlags, TextureFormatFeatures, TextureUsages};

    // ── surface ───────────────────────────────────────────────────────────

    #[test]
    fn srgb_surface_preferred_when_offered() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(pick_surface_format(&formats, true), Some(TextureFormat::Bgra8UnormSrgb));
        assert_eq!(pick_surface_format(&formats, false), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [TextureFormat::Rgba16Float];
        assert_eq!(pick_surface_format(&formats, true), Some(TextureFormat::Rgba16Float));
        assert_eq!(pick_surface_format(&[], true), None);
    }

    #[test]
    fn oversized_window_is_clamped_per_edge() {
        assert_eq!(clamp_extent(10000, 1080, 8192), (8192, 1080));
        assert_eq!(clamp_extent(1920, 1080, 8192), (1920, 1080));
        assert_eq!(clamp_extent(0, 5, 8192), (1, 5));
    }

    #[test]
    fn only_out_of_memory_is_fatal() {
        assert_eq!(surface_error_action(&SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(surface_error_action(&SurfaceError::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(surface_error_action(&SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(surface_error_action(&SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
    }

    // ── target formats ────────────────────────────────────────────────────

    #[test]
    fn mirror_target_must_render_and_filter() {
        let full = TextureFormatFeatures {
            allowed_usages: TextureUsages::RENDER_ATTACHMENT | TextureUsages::TEXTURE_BINDING,
            flags: TextureFormatFeatureFlags::FILTERABLE,
        };
        assert!(usable_as_mirror_target(&full));

        let unfiltered = TextureFormatFeatures {
            flags: TextureFormatFeatureFlags::empty(),
            ..full
        };
        assert!(!usable_as_mirror_target(&unfiltered));

        let render_only = TextureFormatFeatures {
            allowed_usages: TextureUsages::RENDER_ATTACHMENT,
            ..full
        };
        assert!(!usable_as_mirror_target(&render_only));
    }
}
