use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use mirage_engine::core::{Scene, SceneError};
use mirage_engine::input::{Key, TouchEvent};
use mirage_engine::render::GpuBackend;
use mirage_engine::sensor::{RotationFeed, ScreenOrientation};

use crate::config::{CapsuleConfig, CubeConfig, MandelbrotConfig, PrisonConfig};
use crate::options::{OptionStore, PaletteIndex, ResolutionScale};
use crate::{CapsuleScene, InfiniteCubeScene, MandelbrotScene, MengerPrisonScene};

/// Names of the available scenes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SceneId {
    InfiniteCube,
    MengerPrison,
    Capsules,
    Mandelbrot,
}

impl SceneId {
    pub const ALL: [SceneId; 4] = [
        SceneId::InfiniteCube,
        SceneId::MengerPrison,
        SceneId::Capsules,
        SceneId::Mandelbrot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SceneId::InfiniteCube => "infinite-cube",
            SceneId::MengerPrison => "menger-prison",
            SceneId::Capsules => "capsules",
            SceneId::Mandelbrot => "mandelbrot",
        }
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown scene `{0}`")]
pub struct UnknownScene(pub String);

impl FromStr for SceneId {
    type Err = UnknownScene;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SceneId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownScene(s.to_string()))
    }
}

/// Closed set of scenes the host can run.
pub enum SceneKind {
    InfiniteCube(InfiniteCubeScene),
    MengerPrison(MengerPrisonScene),
    Capsules(CapsuleScene),
    Mandelbrot(MandelbrotScene),
}

impl SceneKind {
    /// Builds a scene with default tuning and the user's stored options.
    pub fn from_options(id: SceneId, store: &dyn OptionStore, feed: RotationFeed) -> Self {
        match id {
            SceneId::InfiniteCube => SceneKind::InfiniteCube(InfiniteCubeScene::new(CubeConfig::default())),
            SceneId::MengerPrison => SceneKind::MengerPrison(MengerPrisonScene::new(
                PrisonConfig::default(),
                ResolutionScale::load(store),
                feed,
            )),
            SceneId::Capsules => {
                SceneKind::Capsules(CapsuleScene::new(CapsuleConfig::default(), feed))
            }
            SceneId::Mandelbrot => {
                let config = MandelbrotConfig::default();
                let palette = PaletteIndex::load(store, config.palette_count);
                SceneKind::Mandelbrot(MandelbrotScene::new(config, palette))
            }
        }
    }

    pub fn id(&self) -> SceneId {
        match self {
            SceneKind::InfiniteCube(_) => SceneId::InfiniteCube,
            SceneKind::MengerPrison(_) => SceneId::MengerPrison,
            SceneKind::Capsules(_) => SceneId::Capsules,
            SceneKind::Mandelbrot(_) => SceneId::Mandelbrot,
        }
    }

    /// Writes the scene's user options back to `store`.
    pub fn save_options(&self, store: &mut dyn OptionStore) {
        match self {
            SceneKind::MengerPrison(s) => s.resolution_scale().save(store),
            SceneKind::Mandelbrot(s) => s.palette().save(store),
            SceneKind::InfiniteCube(_) | SceneKind::Capsules(_) => {}
        }
    }

    fn inner(&mut self) -> &mut dyn Scene {
        match self {
            SceneKind::InfiniteCube(s) => s,
            SceneKind::MengerPrison(s) => s,
            SceneKind::Capsules(s) => s,
            SceneKind::Mandelbrot(s) => s,
        }
    }
}

impl Scene for SceneKind {
    fn name(&self) -> &'static str {
        self.id().as_str()
    }

    fn on_attach(&mut self) {
        self.inner().on_attach();
    }

    fn on_detach(&mut self, gpu: &mut dyn GpuBackend) {
        self.inner().on_detach(gpu);
    }

    fn on_surface_created(&mut self, gpu: &mut dyn GpuBackend) -> Result<(), SceneError> {
        self.inner().on_surface_created(gpu)
    }

    fn on_surface_changed(
        &mut self,
        gpu: &mut dyn GpuBackend,
        width: u32,
        height: u32,
    ) -> Result<(), SceneError> {
        self.inner().on_surface_changed(gpu, width, height)
    }

    fn on_draw_frame(&mut self, gpu: &mut dyn GpuBackend, now: Instant) -> Result<(), SceneError> {
        self.inner().on_draw_frame(gpu, now)
    }

    fn on_touch_event(&mut self, event: &TouchEvent) {
        self.inner().on_touch_event(event);
    }

    fn on_orientation_change(&mut self, orientation: ScreenOrientation) {
        self.inner().on_orientation_change(orientation);
    }

    fn reset(&mut self) {
        self.inner().reset();
    }

    fn on_key(&mut self, key: Key) {
        self.inner().on_key(key);
    }
}

#[cfg(test)]
mod tests {
    use mirage_engine::render::HeadlessBackend;

    use super::*;
    use crate::options::{MemoryOptionStore, PALETTE_KEY, RESOLUTION_SCALE_KEY};

    #[test]
    fn ids_parse_from_names() {
        for id in SceneId::ALL {
            assert_eq!(id.as_str().parse::<SceneId>().unwrap(), id);
        }
        assert!("teapot".parse::<SceneId>().is_err());
    }

    #[test]
    fn options_flow_into_scenes_and_back() {
        let mut store = MemoryOptionStore::new();
        store.set_int(RESOLUTION_SCALE_KEY, 3);
        store.set_int(PALETTE_KEY, 2);

        let prison = SceneKind::from_options(SceneId::MengerPrison, &store, RotationFeed::new());
        let SceneKind::MengerPrison(p) = &prison else {
            panic!("wrong scene");
        };
        assert_eq!(p.resolution_scale(), ResolutionScale::Eighth);

        let mandel = SceneKind::from_options(SceneId::Mandelbrot, &store, RotationFeed::new());
        let mut fresh = MemoryOptionStore::new();
        mandel.save_options(&mut fresh);
        prison.save_options(&mut fresh);
        assert_eq!(fresh.get_int(PALETTE_KEY), Some(2));
        assert_eq!(fresh.get_int(RESOLUTION_SCALE_KEY), Some(3));
    }

    #[test]
    fn every_scene_runs_and_releases_everything() {
        let store = MemoryOptionStore::new();
        for id in SceneId::ALL {
            let mut gpu = HeadlessBackend::new(320, 240);
            let mut scene = SceneKind::from_options(id, &store, RotationFeed::new());
            scene.on_attach();
            scene.on_surface_created(&mut gpu).unwrap();
            scene.on_surface_changed(&mut gpu, 320, 240).unwrap();
            let t0 = Instant::now();
            for i in 0..3 {
                scene
                    .on_draw_frame(&mut gpu, t0 + std::time::Duration::from_millis(16 * i))
                    .unwrap();
            }
            scene.on_detach(&mut gpu);
            assert!(gpu.counts().is_balanced(), "{id}");
            assert_eq!(gpu.live_handles(), 0, "{id}");
            assert_eq!(scene.name(), id.as_str());
        }
    }
}
