use crate::math::Mat3;

use super::{RotationFeed, RotationSample, ScreenOrientation};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TrackerState {
    /// No sample has arrived since construction or the last reset.
    Uninitialized,
    /// Samples are arriving but no baseline is captured yet.
    Sampling,
    /// A baseline is held; rotations are relative to it.
    Baselined,
}

/// Turns the latest rotation sample into a render-space rotation relative to
/// the first usable sample of the session.
#[derive(Debug, Default, Clone)]
pub struct RotationTracker {
    last: Option<RotationSample>,
    baseline: Option<RotationSample>,
}

impl RotationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TrackerState {
        match (self.last, self.baseline) {
            (_, Some(_)) => TrackerState::Baselined,
            (Some(_), None) => TrackerState::Sampling,
            (None, None) => TrackerState::Uninitialized,
        }
    }

    #[inline]
    pub fn last(&self) -> Option<RotationSample> {
        self.last
    }

    #[inline]
    pub fn baseline(&self) -> Option<RotationSample> {
        self.baseline
    }

    /// Records the most recent sample. Non-finite samples are ignored.
    pub fn push(&mut self, sample: RotationSample) {
        if sample.is_finite() {
            self.last = Some(sample);
        }
    }

    /// Forgets both the baseline and the latest sample. The next usable sample
    /// becomes the new baseline.
    pub fn reset(&mut self) {
        self.last = None;
        self.baseline = None;
    }

    /// Rotation of the device since the baseline, in render space, with the
    /// sensor axes remapped for `orientation`.
    ///
    /// Returns the identity until a sample has arrived. A latest sample whose
    /// scalar part is exactly one is treated as "no reading yet": it yields
    /// the identity and is never captured as a baseline.
    ///
    /// The Z *row* of the baseline is negated, the same as for the latest
    /// sample. Negating its Z column instead breaks `baseline == last`
    /// giving exactly the identity.
    pub fn rotation_matrix(&mut self, orientation: ScreenOrientation) -> Mat3 {
        let Some(last) = self.last else {
            return Mat3::IDENTITY;
        };
        let baseline = match self.baseline {
            Some(baseline) => baseline,
            None if last.is_identity() => return Mat3::IDENTITY,
            None => {
                log::debug!("captured rotation baseline {last:?}");
                self.baseline = Some(last);
                last
            }
        };

        // Sensor space is right-handed; negating the Z row of both operands
        // moves them into the left-handed render space.
        let base = orientation.remap(&baseline.to_matrix()).negate_row(2);
        let current = orientation.remap(&last.to_matrix()).negate_row(2);
        base * current.transpose()
    }
}

/// A [`RotationTracker`] fed from a [`RotationFeed`].
#[derive(Debug)]
pub struct RotationSensor {
    feed: RotationFeed,
    tracker: RotationTracker,
}

impl RotationSensor {
    pub fn new(feed: RotationFeed) -> Self {
        Self {
            feed,
            tracker: RotationTracker::new(),
        }
    }

    /// Registers with the feed so producer samples are accepted.
    pub fn init(&mut self) {
        self.feed.register();
    }

    /// Unregisters from the feed and forgets all samples.
    pub fn deinit(&mut self) {
        self.feed.unregister();
        self.tracker.reset();
    }

    /// Clears both samples without unregistering.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Moves the latest pending sample, if any, into the tracker.
    pub fn poll(&mut self) {
        if let Some(sample) = self.feed.take_latest() {
            self.tracker.push(sample);
        }
    }

    pub fn rotation_matrix(&mut self, orientation: ScreenOrientation) -> Mat3 {
        self.tracker.rotation_matrix(orientation)
    }

    pub fn state(&self) -> TrackerState {
        self.tracker.state()
    }

    pub fn feed(&self) -> &RotationFeed {
        &self.feed
    }

    pub fn tracker(&self) -> &RotationTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    const EPS: f32 = 1.0e-5;

    fn about(axis: [f32; 3], radians: f32) -> RotationSample {
        RotationSample::from_axis_angle(axis, radians)
    }

    // ── baseline ──────────────────────────────────────────────────────────

    #[test]
    fn no_samples_yields_identity() {
        let mut tracker = RotationTracker::new();
        assert_eq!(tracker.rotation_matrix(ScreenOrientation::Portrait), Mat3::IDENTITY);
        assert_eq!(tracker.state(), TrackerState::Uninitialized);
    }

    #[test]
    fn identity_sample_is_not_captured_as_baseline() {
        let mut tracker = RotationTracker::new();
        tracker.push(RotationSample::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(tracker.rotation_matrix(ScreenOrientation::Portrait), Mat3::IDENTITY);
        assert!(tracker.baseline().is_none());
        assert_eq!(tracker.state(), TrackerState::Sampling);
    }

    #[test]
    fn first_real_sample_becomes_baseline() {
        let mut tracker = RotationTracker::new();
        let a = about([0.0, 1.0, 0.0], 0.6);
        tracker.push(a);
        let m = tracker.rotation_matrix(ScreenOrientation::Portrait);
        assert!(m.approx_eq(&Mat3::IDENTITY, EPS));
        assert_eq!(tracker.baseline(), Some(a));
        assert_eq!(tracker.state(), TrackerState::Baselined);
    }

    #[test]
    fn baseline_equal_to_last_is_identity_in_every_orientation() {
        for orientation in [
            ScreenOrientation::Portrait,
            ScreenOrientation::Landscape,
            ScreenOrientation::PortraitReverse,
            ScreenOrientation::LandscapeReverse,
        ] {
            let mut tracker = RotationTracker::new();
            tracker.push(RotationSample::new(0.1, 0.7, -0.2, 0.67823));
            let m = tracker.rotation_matrix(orientation);
            assert!(m.approx_eq(&Mat3::IDENTITY, 1.0e-4), "{orientation:?}: {m:?}");
        }
    }

    #[test]
    fn identity_sample_after_baseline_is_composed() {
        let mut tracker = RotationTracker::new();
        tracker.push(about([0.0, 0.0, 1.0], 0.4));
        tracker.rotation_matrix(ScreenOrientation::Portrait);
        tracker.push(RotationSample::IDENTITY);
        let m = tracker.rotation_matrix(ScreenOrientation::Portrait);
        assert!(!m.approx_eq(&Mat3::IDENTITY, 1.0e-3));
    }

    // ── composition ───────────────────────────────────────────────────────

    #[test]
    fn pitch_relative_to_baseline_flips_into_render_space() {
        let mut tracker = RotationTracker::new();
        tracker.push(about([1.0, 0.0, 0.0], 0.3));
        tracker.rotation_matrix(ScreenOrientation::Portrait);
        tracker.push(about([1.0, 0.0, 0.0], 0.8));
        let m = tracker.rotation_matrix(ScreenOrientation::Portrait);
        assert!(m.approx_eq(&Mat3::rotation(Vec3::X, 0.5), EPS), "{m:?}");
    }

    #[test]
    fn roll_relative_to_baseline_is_inverted() {
        let mut tracker = RotationTracker::new();
        tracker.push(about([0.0, 0.0, 1.0], 0.3));
        tracker.rotation_matrix(ScreenOrientation::Portrait);
        tracker.push(about([0.0, 0.0, 1.0], 0.8));
        let m = tracker.rotation_matrix(ScreenOrientation::Portrait);
        assert!(m.approx_eq(&Mat3::rotation(Vec3::Z, -0.5), EPS), "{m:?}");
    }

    #[test]
    fn result_is_orthonormal() {
        let mut tracker = RotationTracker::new();
        tracker.push(about([0.6, 0.0, 0.8], 1.1));
        tracker.rotation_matrix(ScreenOrientation::Landscape);
        tracker.push(about([0.0, 0.6, 0.8], -0.7));
        let m = tracker.rotation_matrix(ScreenOrientation::Landscape);
        assert!((m * m.transpose()).approx_eq(&Mat3::IDENTITY, 1.0e-4));
    }

    // ── reset / sensor ────────────────────────────────────────────────────

    #[test]
    fn reset_clears_baseline_and_last() {
        let mut tracker = RotationTracker::new();
        tracker.push(about([0.0, 1.0, 0.0], 0.6));
        tracker.rotation_matrix(ScreenOrientation::Portrait);
        tracker.reset();
        assert_eq!(tracker.state(), TrackerState::Uninitialized);
        assert_eq!(tracker.rotation_matrix(ScreenOrientation::Portrait), Mat3::IDENTITY);
    }

    #[test]
    fn sensor_polls_feed_and_rebaselines_after_reset() {
        let feed = RotationFeed::new();
        let mut sensor = RotationSensor::new(feed.clone());
        sensor.init();

        feed.publish(about([0.0, 1.0, 0.0], 0.2));
        sensor.poll();
        sensor.rotation_matrix(ScreenOrientation::Portrait);
        assert_eq!(sensor.state(), TrackerState::Baselined);

        sensor.reset();
        assert!(feed.is_registered());
        let b = about([0.0, 1.0, 0.0], 0.9);
        feed.publish(b);
        sensor.poll();
        let m = sensor.rotation_matrix(ScreenOrientation::Portrait);
        assert!(m.approx_eq(&Mat3::IDENTITY, EPS));
        assert_eq!(sensor.tracker().baseline(), Some(b));
    }

    #[test]
    fn deinit_unregisters_feed() {
        let feed = RotationFeed::new();
        let mut sensor = RotationSensor::new(feed.clone());
        sensor.init();
        sensor.deinit();
        assert!(!feed.publish(about([1.0, 0.0, 0.0], 0.1)));
        assert_eq!(sensor.state(), TrackerState::Uninitialized);
    }
}
