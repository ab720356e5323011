//! The demo scenes.
//!
//! Each scene implements [`mirage_engine::core::Scene`] and owns its GPU
//! resources exclusively. [`SceneKind`] is the closed set the host picks from.

pub mod camera;
pub mod capsules;
pub mod config;
pub mod cube;
pub mod kind;
pub mod mandelbrot;
pub mod options;
pub mod prison;

mod flight;
mod uniforms;

pub use camera::FlyCamera;
pub use capsules::{CapsuleScene, Projectile, ProjectileState};
pub use config::{CapsuleConfig, CubeConfig, FlightConfig, MandelbrotConfig, PrisonConfig};
pub use cube::InfiniteCubeScene;
pub use kind::{SceneId, SceneKind, UnknownScene};
pub use mandelbrot::MandelbrotScene;
pub use options::{
    MemoryOptionStore, OptionStore, PaletteIndex, ResolutionScale, PALETTE_KEY,
    RESOLUTION_SCALE_KEY,
};
pub use prison::MengerPrisonScene;
