use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use mirage_engine::core::{Scene, SceneError};
use mirage_engine::device::GpuInit;
use mirage_engine::input::{Key, TouchEvent};
use mirage_engine::logging::{LoggingConfig, init_logging};
use mirage_engine::render::GpuBackend;
use mirage_engine::sensor::{RotationFeed, RotationSample, ScreenOrientation};
use mirage_engine::window::{Runtime, RuntimeConfig};
use mirage_scenes::{
    CubeConfig, InfiniteCubeScene, MemoryOptionStore, OptionStore, PALETTE_KEY,
    RESOLUTION_SCALE_KEY, SceneId, SceneKind,
};

/// Desktop host for the mirage demo scenes.
#[derive(Parser, Debug, Clone)]
#[command(name = "mirage-studio", version)]
struct Args {
    /// Scene to open: infinite-cube, menger-prison, capsules or mandelbrot.
    #[arg(long, default_value_t = SceneId::MengerPrison)]
    scene: SceneId,

    /// Off-screen resolution for the menger prison (0 = full .. 3 = eighth).
    #[arg(long)]
    scale_index: Option<i32>,

    /// Initial Mandelbrot palette.
    #[arg(long)]
    palette: Option<i32>,

    /// Swap the infinite cube's mirror targets every N seconds instead of every frame.
    #[arg(long)]
    staggered: Option<f32>,

    /// Log filter, in `RUST_LOG` syntax.
    #[arg(long)]
    log: Option<String>,

    /// Present without waiting for vsync.
    #[arg(long, default_value_t = false)]
    no_vsync: bool,
}

impl Args {
    fn option_store(&self) -> MemoryOptionStore {
        let mut store = MemoryOptionStore::new();
        if let Some(index) = self.scale_index {
            store.set_int(RESOLUTION_SCALE_KEY, index);
        }
        if let Some(palette) = self.palette {
            store.set_int(PALETTE_KEY, palette);
        }
        store
    }

    fn build_scene(&self, store: &dyn OptionStore, feed: RotationFeed) -> SceneKind {
        match (self.scene, self.staggered) {
            (SceneId::InfiniteCube, Some(interval)) => {
                SceneKind::InfiniteCube(InfiniteCubeScene::new(CubeConfig {
                    stagger_interval: Some(interval),
                    ..CubeConfig::default()
                }))
            }
            (id, _) => SceneKind::from_options(id, store, feed),
        }
    }
}

/// Radians of simulated tilt per arrow key press.
const TILT_STEP: f32 = 5.0_f32.to_radians();

/// The phone's resting pose: held up at a slight angle.
const REST_PITCH: f32 = 0.3;

/// Stands in for the device rotation sensor: arrow keys tilt a virtual phone
/// and publish the resulting attitude to the scene's feed.
struct StudioScene {
    inner: SceneKind,
    feed: RotationFeed,
    store: MemoryOptionStore,
    pitch: f32,
    yaw: f32,
}

impl StudioScene {
    fn new(args: &Args) -> Self {
        let store = args.option_store();
        let feed = RotationFeed::new();
        let inner = args.build_scene(&store, feed.clone());
        Self {
            inner,
            feed,
            store,
            pitch: 0.0,
            yaw: 0.0,
        }
    }

    fn attitude(&self) -> RotationSample {
        let (x, y) = (REST_PITCH + self.pitch, self.yaw);
        let angle = x.hypot(y);
        if angle <= f32::EPSILON {
            return RotationSample::IDENTITY;
        }
        RotationSample::from_axis_angle([x / angle, y / angle, 0.0], angle)
    }

    fn publish(&self) {
        if self.feed.publish(self.attitude()) {
            log::trace!("simulated tilt pitch={:.3} yaw={:.3}", self.pitch, self.yaw);
        }
    }

    fn tilt(&mut self, pitch: f32, yaw: f32) {
        self.pitch += pitch;
        self.yaw += yaw;
        self.publish();
    }
}

impl Scene for StudioScene {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn on_attach(&mut self) {
        self.inner.on_attach();
        self.publish();
    }

    fn on_detach(&mut self, gpu: &mut dyn GpuBackend) {
        self.inner.save_options(&mut self.store);
        log::info!(
            "{}: options on exit: scale={:?} palette={:?}",
            self.inner.name(),
            self.store.get_int(RESOLUTION_SCALE_KEY),
            self.store.get_int(PALETTE_KEY)
        );
        self.inner.on_detach(gpu);
    }

    fn on_surface_created(&mut self, gpu: &mut dyn GpuBackend) -> Result<(), SceneError> {
        self.inner.on_surface_created(gpu)
    }

    fn on_surface_changed(
        &mut self,
        gpu: &mut dyn GpuBackend,
        width: u32,
        height: u32,
    ) -> Result<(), SceneError> {
        self.inner.on_surface_changed(gpu, width, height)
    }

    fn on_draw_frame(&mut self, gpu: &mut dyn GpuBackend, now: Instant) -> Result<(), SceneError> {
        self.inner.on_draw_frame(gpu, now)
    }

    fn on_touch_event(&mut self, event: &TouchEvent) {
        self.inner.on_touch_event(event);
    }

    fn on_orientation_change(&mut self, orientation: ScreenOrientation) {
        self.inner.on_orientation_change(orientation);
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.pitch = 0.0;
        self.yaw = 0.0;
        self.publish();
    }

    fn on_key(&mut self, key: Key) {
        match key {
            Key::ArrowUp => self.tilt(-TILT_STEP, 0.0),
            Key::ArrowDown => self.tilt(TILT_STEP, 0.0),
            Key::ArrowLeft => self.tilt(0.0, -TILT_STEP),
            Key::ArrowRight => self.tilt(0.0, TILT_STEP),
            other => self.inner.on_key(other),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    let scene = StudioScene::new(&args);
    log::info!("opening {}", scene.name());

    let gpu_init = GpuInit {
        present_mode: if args.no_vsync {
            wgpu::PresentMode::AutoNoVsync
        } else {
            wgpu::PresentMode::Fifo
        },
        ..GpuInit::default()
    };
    let config = RuntimeConfig {
        title: format!("mirage · {}", scene.name()),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, gpu_init, scene)
}
