//! Per-scene tuning values.
//!
//! Passed to constructors; nothing here is global.

use mirage_engine::gesture::GestureConfig;
use mirage_engine::math::Vec3;
use mirage_engine::sdf::{Capsule, CapsuleField, MengerPrison};

/// Camera model shared by the raymarched scenes.
#[derive(Debug, Clone)]
pub struct FlightConfig {
    /// Forward speed in world units per second.
    pub speed: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub gestures: GestureConfig,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            speed: 0.5,
            fov_y: 60f32.to_radians(),
            gestures: GestureConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CubeConfig {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Camera distance to the cube center.
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Swap the mirror targets every this many seconds instead of every
    /// frame.
    pub stagger_interval: Option<f32>,
    pub clear_color: [f32; 4],
    pub gestures: GestureConfig,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            fov_y: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
            distance: 3.0,
            min_distance: 1.5,
            max_distance: 12.0,
            stagger_interval: None,
            clear_color: [0.05, 0.05, 0.08, 1.0],
            gestures: GestureConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrisonConfig {
    pub flight: FlightConfig,
    pub prison: MengerPrison,
    /// Raymarch step budget per pixel.
    pub max_steps: u32,
    pub max_distance: f32,
}

impl PrisonConfig {
    /// Safe spawn point: the open center of the cell at the origin.
    pub fn home(&self) -> Vec3 {
        self.prison.cell_center()
    }
}

impl Default for PrisonConfig {
    fn default() -> Self {
        Self {
            flight: FlightConfig::default(),
            prison: MengerPrison::default(),
            max_steps: 128,
            max_distance: 40.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapsuleConfig {
    pub flight: FlightConfig,
    pub field: CapsuleField,
    pub projectile_speed: f32,
    /// Projectiles that travel this far without hitting anything expire.
    pub projectile_range: f32,
    pub max_steps: u32,
    pub max_distance: f32,
}

impl CapsuleConfig {
    /// Corner of the lattice cell, between four capsule columns.
    pub fn home(&self) -> Vec3 {
        let half = self.field.cell_size * 0.5;
        Vec3::new(half, half, 0.0)
    }
}

impl Default for CapsuleConfig {
    fn default() -> Self {
        Self {
            flight: FlightConfig::default(),
            field: CapsuleField {
                capsule: Capsule::new(Vec3::new(0.0, -0.6, 0.0), Vec3::new(0.0, 0.6, 0.0), 0.35),
                cell_size: 3.0,
            },
            projectile_speed: 4.0,
            projectile_range: 60.0,
            max_steps: 96,
            max_distance: 60.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MandelbrotConfig {
    pub center: [f32; 2],
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub base_iterations: u32,
    /// Extra iterations per doubling of zoom.
    pub iterations_per_octave: f32,
    pub max_iterations: u32,
    pub palette_count: u32,
    pub gestures: GestureConfig,
}

impl Default for MandelbrotConfig {
    fn default() -> Self {
        Self {
            center: [-0.5, 0.0],
            min_zoom: 0.5,
            max_zoom: 1.0e5,
            base_iterations: 64,
            iterations_per_octave: 24.0,
            max_iterations: 1024,
            palette_count: 4,
            gestures: GestureConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_points_are_open_space() {
        let prison = PrisonConfig::default();
        assert!(prison.prison.distance(prison.home()) > 0.0);

        let capsules = CapsuleConfig::default();
        assert!(capsules.field.distance(capsules.home()) > 0.0);
    }

    #[test]
    fn cube_zoom_range_contains_default() {
        let cfg = CubeConfig::default();
        assert!(cfg.min_distance <= cfg.distance && cfg.distance <= cfg.max_distance);
    }
}
