use std::time::Instant;

use mirage_engine::gesture::{PanFlingDetector, PanGesture, RotationGestureDetector};
use mirage_engine::input::TouchEvent;
use mirage_engine::math::{Mat3, Vec2, Vec3};
use mirage_engine::sensor::{RotationFeed, RotationSensor, ScreenOrientation};
use mirage_engine::time::{FrameTime, SceneClock};

use crate::FlyCamera;
use crate::config::FlightConfig;

/// Camera, clock and input plumbing shared by the raymarched scenes.
///
/// Orientation is the sensor rotation relative to its baseline, followed by
/// the accumulated two-finger roll about the view axis.
#[derive(Debug)]
pub(crate) struct FlightRig {
    pub camera: FlyCamera,
    pub clock: SceneClock,
    pub fov_y: f32,
    sensor: RotationSensor,
    orientation: ScreenOrientation,
    pan: PanFlingDetector,
    roll: RotationGestureDetector,
}

impl FlightRig {
    pub fn new(config: &FlightConfig, home: Vec3, feed: RotationFeed) -> Self {
        Self {
            camera: FlyCamera::new(home, config.speed),
            clock: SceneClock::new(),
            fov_y: config.fov_y,
            sensor: RotationSensor::new(feed),
            orientation: ScreenOrientation::default(),
            pan: PanFlingDetector::new(&config.gestures),
            roll: RotationGestureDetector::new(),
        }
    }

    pub fn attach(&mut self) {
        self.sensor.init();
    }

    pub fn detach(&mut self) {
        self.sensor.deinit();
    }

    pub fn set_orientation(&mut self, orientation: ScreenOrientation) {
        self.orientation = orientation;
    }

    pub fn sensor(&self) -> &RotationSensor {
        &self.sensor
    }

    /// Feeds the recognizers; returns the position of a completed tap.
    pub fn on_touch_event(&mut self, ev: &TouchEvent) -> Option<Vec2> {
        self.roll.on_touch_event(ev);
        match self.pan.on_touch_event(ev) {
            Some(PanGesture::Tap(pos)) => Some(pos),
            _ => None,
        }
    }

    /// Advances the clock, applies sensor and roll to the camera, then flies
    /// it forward by the frame delta.
    pub fn tick(&mut self, now: Instant) -> FrameTime {
        let ft = self.clock.tick(now);
        self.sensor.poll();
        let attitude = self.sensor.rotation_matrix(self.orientation);
        let roll = Mat3::rotation(Vec3::Z, self.roll.total_rotation());
        self.camera.set_rotation(attitude * roll);
        self.camera.advance(ft.dt);
        ft
    }

    pub fn reset(&mut self) {
        self.camera.reset();
        self.clock.reset();
        self.sensor.reset();
        self.roll.reset();
    }
}
