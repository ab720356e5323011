use crate::math::Mat3;

/// Current screen rotation relative to the device's natural orientation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ScreenOrientation {
    #[default]
    Portrait,
    /// Rotated 90° counter-clockwise.
    Landscape,
    /// Rotated 180°.
    PortraitReverse,
    /// Rotated 270° counter-clockwise.
    LandscapeReverse,
}

impl ScreenOrientation {
    /// Maps a display rotation in degrees (0, 90, 180, 270) to an orientation.
    /// Other values snap to the nearest quarter turn.
    pub fn from_degrees(degrees: i32) -> Self {
        match ((degrees as f32 / 90.0).round() as i32).rem_euclid(4) {
            1 => ScreenOrientation::Landscape,
            2 => ScreenOrientation::PortraitReverse,
            3 => ScreenOrientation::LandscapeReverse,
            _ => ScreenOrientation::Portrait,
        }
    }

    /// Remaps the sensor axes so that the rotation is expressed relative to the
    /// screen as currently displayed.
    ///
    /// Each case permutes and/or negates the X and Y columns; Z is untouched.
    pub fn remap(self, m: &Mat3) -> Mat3 {
        let (x, y, z) = (m.col(0), m.col(1), m.col(2));
        match self {
            ScreenOrientation::Portrait => *m,
            ScreenOrientation::Landscape => Mat3::from_cols(-y, x, z),
            ScreenOrientation::PortraitReverse => Mat3::from_cols(-x, -y, z),
            ScreenOrientation::LandscapeReverse => Mat3::from_cols(y, -x, z),
        }
    }
}
