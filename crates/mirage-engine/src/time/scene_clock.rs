use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds. Never negative.
    pub dt: f32,

    /// Scene time since the first tick (or the last reset), in seconds.
    pub elapsed: f32,

    /// Monotonic timestamp passed to the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Monotonic scene-time accumulator.
///
/// Time is accumulated as `Duration` and exposed to shaders and integrators as
/// `f32` seconds. The caller supplies `now`, which keeps the clock deterministic
/// under test.
///
/// Delta time is clamped above so that a stall (debugger, minimized window)
/// does not fling the camera through the scene in a single step.
#[derive(Debug, Clone)]
pub struct SceneClock {
    first: Option<Instant>,
    last: Option<Instant>,
    elapsed: Duration,
    delta: Duration,
    dt_max: Duration,
    frame_index: u64,
}

impl SceneClock {
    /// Creates a clock with the default delta clamp (0.25s).
    pub fn new() -> Self {
        Self::with_max_delta(Duration::from_millis(250))
    }

    /// Creates a clock with a custom delta clamp.
    pub fn with_max_delta(dt_max: Duration) -> Self {
        Self {
            first: None,
            last: None,
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
            dt_max,
            frame_index: 0,
        }
    }

    /// Advances the clock to `now` and returns a new `FrameTime`.
    ///
    /// The first tick establishes the baseline and has a zero delta. A `now`
    /// earlier than the previous tick yields a zero delta rather than going
    /// backwards.
    pub fn tick(&mut self, now: Instant) -> FrameTime {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last).min(self.dt_max),
            None => {
                self.first = Some(now);
                Duration::ZERO
            }
        };

        self.last = Some(now.max(self.last.unwrap_or(now)));
        self.delta = delta;
        self.elapsed += delta;

        let ft = FrameTime {
            dt: delta.as_secs_f32(),
            elapsed: self.elapsed.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }

    /// Zeroes scene time. The next tick measures its delta from the last
    /// observed timestamp, so the clock keeps running rather than pausing.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.delta = Duration::ZERO;
        self.first = self.last;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Timestamp of the first tick since creation or reset.
    pub fn started_at(&self) -> Option<Instant> {
        self.first
    }
}

impl Default for SceneClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_zero_delta() {
        let mut clock = SceneClock::new();
        let ft = clock.tick(Instant::now());
        assert_eq!(ft.dt, 0.0);
        assert_eq!(ft.elapsed, 0.0);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn ticks_accumulate_elapsed_time() {
        let t0 = Instant::now();
        let mut clock = SceneClock::new();
        clock.tick(t0);
        clock.tick(t0 + Duration::from_millis(100));
        let ft = clock.tick(t0 + Duration::from_millis(150));
        assert!((ft.dt - 0.05).abs() < 1.0e-6);
        assert!((ft.elapsed - 0.15).abs() < 1.0e-6);
        assert_eq!(ft.frame_index, 2);
    }

    #[test]
    fn delta_never_negative() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut clock = SceneClock::new();
        clock.tick(t0);
        let ft = clock.tick(t0 - Duration::from_millis(500));
        assert_eq!(ft.dt, 0.0);
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn delta_is_clamped_after_a_stall() {
        let t0 = Instant::now();
        let mut clock = SceneClock::with_max_delta(Duration::from_millis(100));
        clock.tick(t0);
        let ft = clock.tick(t0 + Duration::from_secs(5));
        assert!((ft.dt - 0.1).abs() < 1.0e-6);
    }

    #[test]
    fn reset_zeroes_but_keeps_running() {
        let t0 = Instant::now();
        let mut clock = SceneClock::new();
        clock.tick(t0);
        clock.tick(t0 + Duration::from_millis(200));
        clock.reset();
        assert_eq!(clock.elapsed(), Duration::ZERO);
        let ft = clock.tick(t0 + Duration::from_millis(230));
        assert!((ft.elapsed - 0.03).abs() < 1.0e-6);
    }
}
