use mirage_engine::math::{Mat3, Vec3};

/// Free-flying camera for the raymarched scenes.
///
/// `rotation` maps camera axes to world axes: its columns are right, up and
/// forward. Forward is `+Z` in camera space.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    pub rotation: Mat3,
    pub speed: f32,
    pub paused: bool,
    home: Vec3,
}

impl FlyCamera {
    pub fn new(home: Vec3, speed: f32) -> Self {
        Self {
            position: home,
            rotation: Mat3::IDENTITY,
            speed,
            paused: false,
            home,
        }
    }

    #[inline]
    pub fn home(&self) -> Vec3 {
        self.home
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation.col(0)
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation.col(1)
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation.col(2)
    }

    /// Moves `speed * dt` along forward. Returns the displacement.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        if self.paused || !dt.is_finite() || dt <= 0.0 {
            return Vec3::ZERO;
        }
        let step = self.forward() * (self.speed * dt);
        self.position += step;
        step
    }

    /// Sets the orientation; a non-finite matrix is ignored.
    pub fn set_rotation(&mut self, rotation: Mat3) {
        if rotation.is_finite() {
            self.rotation = rotation;
        }
    }

    pub fn reset(&mut self) {
        self.position = self.home;
        self.rotation = Mat3::IDENTITY;
        self.paused = false;
    }
}
