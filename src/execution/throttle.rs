use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use super::observer::ExecutionMetrics;

/// Bounds the number of event chunks in flight and feeds the run metrics.
///
/// A chunk occupies a slot from [`ChunkThrottle::start_chunk`] to
/// [`ChunkThrottle::finish_chunk`]. When every slot is taken, `start_chunk`
/// blocks, and the time spent blocked is accounted as throttle wait.
pub(crate) struct ChunkThrottle<'a> {
    slots: Mutex<usize>,
    released: Condvar,
    metrics: &'a ExecutionMetrics,
}

impl<'a> ChunkThrottle<'a> {
    pub(crate) fn new(max_in_flight: usize, metrics: &'a ExecutionMetrics) -> Self {
        assert!(max_in_flight > 0, "max_in_flight must be > 0");
        Self {
            slots: Mutex::new(max_in_flight),
            released: Condvar::new(),
            metrics,
        }
    }

    /// Claim a slot for one chunk, blocking while the in-flight limit is hit.
    ///
    /// Records the chunk start and any throttle wait in the metrics, and
    /// returns the wait so the caller can surface it to observers.
    pub(crate) fn start_chunk(&self) -> Duration {
        let start = Instant::now();
        let mut waited = false;
        let mut slots = self.slots.lock().expect("throttle mutex poisoned");
        while *slots == 0 {
            waited = true;
            slots = self.released.wait(slots).expect("throttle mutex poisoned");
        }
        *slots -= 1;
        drop(slots);

        let wait = if waited { start.elapsed() } else { Duration::ZERO };
        if wait > Duration::ZERO {
            self.metrics.on_throttle_wait(wait);
        }
        self.metrics.on_chunk_start();
        wait
    }

    /// Return the slot once the chunk is done and record its completion.
    pub(crate) fn finish_chunk(&self) {
        self.metrics.on_chunk_end();
        let mut slots = self.slots.lock().expect("throttle mutex poisoned");
        *slots += 1;
        self.released.notify_one();
    }
}
