use super::backend::GpuBackend;
use super::{FrameBuffer, GpuError};

/// Two framebuffers whose read/write roles alternate.
///
/// The write target is never the read target. After [`PingPong::advance`]
/// swaps, the read target holds the last completed image.
#[derive(Debug, Default)]
pub struct PingPong {
    targets: [FrameBuffer; 2],
    write: usize,
    stagger_interval: Option<f32>,
    since_swap: f32,
}

impl PingPong {
    /// Allocates both targets and clears them to `clear`.
    pub fn create(
        gpu: &mut dyn GpuBackend,
        width: u32,
        height: u32,
        clear: [f32; 4],
    ) -> Result<Self, GpuError> {
        let mut pp = Self::default();
        pp.allocate(gpu, width, height, clear)?;
        Ok(pp)
    }

    /// Swap roles every `interval` seconds instead of every frame.
    pub fn with_stagger(mut self, interval: Option<f32>) -> Self {
        self.set_stagger(interval);
        self
    }

    pub fn set_stagger(&mut self, interval: Option<f32>) {
        self.stagger_interval = interval.filter(|i| i.is_finite() && *i > 0.0);
        self.since_swap = 0.0;
    }

    #[inline]
    pub fn is_staggered(&self) -> bool {
        self.stagger_interval.is_some()
    }

    #[inline]
    pub fn read(&self) -> &FrameBuffer {
        &self.targets[1 - self.write]
    }

    #[inline]
    pub fn write(&self) -> &FrameBuffer {
        &self.targets[self.write]
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.targets.iter().all(FrameBuffer::is_allocated)
    }

    pub fn size(&self) -> (u32, u32) {
        self.targets[0].size()
    }

    pub fn swap(&mut self) {
        self.write = 1 - self.write;
    }

    /// Called once per rendered frame after the write target is complete.
    /// Returns whether the roles swapped.
    pub fn advance(&mut self, dt: f32) -> bool {
        match self.stagger_interval {
            None => {
                self.swap();
                true
            }
            Some(interval) => {
                self.since_swap += dt.max(0.0);
                if self.since_swap >= interval {
                    self.since_swap %= interval;
                    self.swap();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Destroys and recreates both targets at the new size.
    pub fn resize(
        &mut self,
        gpu: &mut dyn GpuBackend,
        width: u32,
        height: u32,
        clear: [f32; 4],
    ) -> Result<(), GpuError> {
        self.destroy(gpu);
        self.allocate(gpu, width, height, clear)
    }

    pub fn destroy(&mut self, gpu: &mut dyn GpuBackend) {
        for t in &mut self.targets {
            t.destroy(gpu);
        }
        self.write = 0;
        self.since_swap = 0.0;
    }

    fn allocate(
        &mut self,
        gpu: &mut dyn GpuBackend,
        width: u32,
        height: u32,
        clear: [f32; 4],
    ) -> Result<(), GpuError> {
        let result = (|| -> Result<(), GpuError> {
            for t in &mut self.targets {
                *t = FrameBuffer::create(gpu, width, height)?;
                if let Some(target) = t.target() {
                    gpu.clear(target, clear)?;
                }
            }
            Ok(())
        })();
        if result.is_err() {
            self.destroy(gpu);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    #[test]
    fn read_and_write_never_alias() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let mut pp = PingPong::create(&mut gpu, 32, 32, BLACK).unwrap();
        for _ in 0..5 {
            assert_ne!(pp.read().handle(), pp.write().handle());
            pp.advance(0.016);
        }
        pp.destroy(&mut gpu);
    }

    #[test]
    fn swap_exposes_last_written_target() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let mut pp = PingPong::create(&mut gpu, 32, 32, BLACK).unwrap();
        let written = pp.write().handle();
        assert!(pp.advance(0.016));
        assert_eq!(pp.read().handle(), written);
        pp.destroy(&mut gpu);
    }

    #[test]
    fn staggered_swaps_on_interval() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let mut pp = PingPong::create(&mut gpu, 8, 8, BLACK)
            .unwrap()
            .with_stagger(Some(0.5));
        let swaps: Vec<bool> = (0..6).map(|_| pp.advance(0.25)).collect();
        assert_eq!(swaps, vec![false, true, false, true, false, true]);
        pp.destroy(&mut gpu);
    }

    #[test]
    fn both_targets_are_cleared_on_allocation() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let mut pp = PingPong::create(&mut gpu, 8, 8, BLACK).unwrap();
        assert_eq!(gpu.ops().len(), 2);
        pp.destroy(&mut gpu);
    }

    #[test]
    fn failed_allocation_leaves_nothing_alive() {
        let mut gpu = HeadlessBackend::new(64, 64);
        gpu.set_max_dimension(4);
        assert!(PingPong::create(&mut gpu, 8, 8, BLACK).is_err());
        assert_eq!(gpu.live_handles(), 0);
    }

    #[test]
    fn resize_recreates_at_new_size() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let mut pp = PingPong::create(&mut gpu, 8, 8, BLACK).unwrap();
        pp.resize(&mut gpu, 16, 12, BLACK).unwrap();
        assert_eq!(pp.size(), (16, 12));
        assert_eq!(gpu.live_framebuffers(), 2);
        pp.destroy(&mut gpu);
        assert!(gpu.counts().is_balanced());
    }
}
