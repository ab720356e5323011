use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::RotationSample;

/// Single-slot mailbox between the sensor producer and the render thread.
///
/// The producer overwrites the slot; the consumer takes whatever is latest.
/// Intermediate samples are dropped. Clones share the same slot.
#[derive(Clone, Default)]
pub struct RotationFeed {
    inner: Arc<FeedInner>,
}

#[derive(Default)]
struct FeedInner {
    slot: Mutex<Option<RotationSample>>,
    registered: AtomicBool,
}

impl RotationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts accepting samples.
    pub fn register(&self) {
        if !self.inner.registered.swap(true, Ordering::AcqRel) {
            log::debug!("rotation feed registered");
        }
    }

    /// Stops accepting samples and drops any pending one.
    pub fn unregister(&self) {
        if self.inner.registered.swap(false, Ordering::AcqRel) {
            log::debug!("rotation feed unregistered");
        }
        self.inner.slot.lock().take();
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        self.inner.registered.load(Ordering::Acquire)
    }

    /// Stores `sample` as the latest reading.
    ///
    /// Returns `false` when the feed is not registered or the sample has
    /// non-finite components; such samples are dropped.
    pub fn publish(&self, sample: RotationSample) -> bool {
        if !self.is_registered() {
            return false;
        }
        if !sample.is_finite() {
            log::trace!("dropping malformed rotation sample {sample:?}");
            return false;
        }
        *self.inner.slot.lock() = Some(sample);
        true
    }

    /// Takes the latest pending sample, leaving the slot empty.
    pub fn take_latest(&self) -> Option<RotationSample> {
        self.inner.slot.lock().take()
    }
}

impl std::fmt::Debug for RotationFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationFeed")
            .field("registered", &self.is_registered())
            .field("pending", &self.inner.slot.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_feed_drops_samples() {
        let feed = RotationFeed::new();
        assert!(!feed.publish(RotationSample::IDENTITY));
        assert!(feed.take_latest().is_none());
    }

    #[test]
    fn latest_sample_wins() {
        let feed = RotationFeed::new();
        feed.register();
        let a = RotationSample::from_axis_angle([1.0, 0.0, 0.0], 0.1);
        let b = RotationSample::from_axis_angle([1.0, 0.0, 0.0], 0.2);
        assert!(feed.publish(a));
        assert!(feed.publish(b));
        assert_eq!(feed.take_latest(), Some(b));
        assert_eq!(feed.take_latest(), None);
    }

    #[test]
    fn clones_share_the_slot() {
        let consumer = RotationFeed::new();
        let producer = consumer.clone();
        consumer.register();
        assert!(producer.publish(RotationSample::IDENTITY));
        assert_eq!(consumer.take_latest(), Some(RotationSample::IDENTITY));
    }

    #[test]
    fn unregister_clears_pending_sample() {
        let feed = RotationFeed::new();
        feed.register();
        feed.publish(RotationSample::IDENTITY);
        feed.unregister();
        assert!(feed.take_latest().is_none());
        assert!(!feed.is_registered());
    }

    #[test]
    fn malformed_sample_is_dropped() {
        let feed = RotationFeed::new();
        feed.register();
        assert!(!feed.publish(RotationSample::new(f32::NAN, 0.0, 0.0, 1.0)));
        assert!(feed.take_latest().is_none());
    }

    #[test]
    fn producer_thread_delivers_samples() {
        let feed = RotationFeed::new();
        feed.register();
        let producer = feed.clone();
        std::thread::spawn(move || {
            for i in 0..100 {
                producer.publish(RotationSample::from_axis_angle([0.0, 0.0, 1.0], i as f32 * 0.01));
            }
        })
        .join()
        .unwrap();
        let last = feed.take_latest().unwrap();
        assert_eq!(last, RotationSample::from_axis_angle([0.0, 0.0, 1.0], 99.0 * 0.01));
    }
}
