//! Run metrics and progress hooks for the execution engine.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Progress events emitted while the engine transforms a store.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted,
    /// A derived-column definition began for the named output column.
    DefineStarted { column: String },
    /// An event-selection pass began.
    FilterStarted,
    /// A chunk waited for an in-flight slot before starting.
    ThrottleWaited { duration: Duration },
    ChunkStarted { start_event: usize, event_count: usize },
    ChunkFinished { output_events: usize },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for engine progress events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Counters updated by the engine while a run executes.
///
/// All counters are atomics, so a handle obtained via
/// [`crate::execution::ExecutionEngine::metrics`] can be snapshot from another
/// thread at any time. `begin_run` resets everything except the run counter.
pub struct ExecutionMetrics {
    runs: AtomicU64,
    elapsed_ns: AtomicU64,

    events_processed: AtomicU64,
    chunks_started: AtomicU64,
    chunks_finished: AtomicU64,
    producer_errors: AtomicU64,
    throttle_wait_ns: AtomicU64,

    active_chunks: AtomicUsize,
    max_active_chunks: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            runs: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            events_processed: AtomicU64::new(0),
            chunks_started: AtomicU64::new(0),
            chunks_finished: AtomicU64::new(0),
            producer_errors: AtomicU64::new(0),
            throttle_wait_ns: AtomicU64::new(0),
            active_chunks: AtomicUsize::new(0),
            max_active_chunks: AtomicUsize::new(0),
        }
    }

    /// Start a new run: bump the run counter and zero everything else.
    pub fn begin_run(&self) {
        let _ = self.runs.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.events_processed.store(0, Ordering::SeqCst);
        self.chunks_started.store(0, Ordering::SeqCst);
        self.chunks_finished.store(0, Ordering::SeqCst);
        self.producer_errors.store(0, Ordering::SeqCst);
        self.throttle_wait_ns.store(0, Ordering::SeqCst);
        self.active_chunks.store(0, Ordering::SeqCst);
        self.max_active_chunks.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns.store(saturating_ns(elapsed), Ordering::SeqCst);
    }

    /// Record `n` events that produced output in one chunk.
    pub fn on_events_processed(&self, n: u64) {
        let _ = self.events_processed.fetch_add(n, Ordering::SeqCst);
    }

    /// Record a chunk aborted by a producer error.
    pub fn on_producer_error(&self) {
        let _ = self.producer_errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_chunk_start(&self) {
        let _ = self.chunks_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_chunks.fetch_add(1, Ordering::SeqCst) + 1;
        self.bump_max_active(now);
    }

    pub fn on_chunk_end(&self) {
        let _ = self.chunks_finished.fetch_add(1, Ordering::SeqCst);
        let _ = self.active_chunks.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn on_throttle_wait(&self, d: Duration) {
        let _ = self
            .throttle_wait_ns
            .fetch_add(saturating_ns(d), Ordering::SeqCst);
    }

    fn bump_max_active(&self, now: usize) {
        loop {
            let cur = self.max_active_chunks.load(Ordering::SeqCst);
            if now <= cur {
                break;
            }
            if self
                .max_active_chunks
                .compare_exchange(cur, now, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                break;
            }
        }
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            runs: self.runs.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            events_processed: self.events_processed.load(Ordering::SeqCst),
            chunks_started: self.chunks_started.load(Ordering::SeqCst),
            chunks_finished: self.chunks_finished.load(Ordering::SeqCst),
            producer_errors: self.producer_errors.load(Ordering::SeqCst),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::SeqCst)),
            max_active_chunks: self.max_active_chunks.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn saturating_ns(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Immutable point-in-time copy of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    /// Number of runs started on this engine so far.
    pub runs: u64,
    /// Wall time of the last finished run; `None` while a run is in progress.
    pub elapsed: Option<Duration>,
    /// Events that produced output (errored chunks contribute nothing).
    pub events_processed: u64,
    pub chunks_started: u64,
    pub chunks_finished: u64,
    /// Chunks aborted by a producer error.
    pub producer_errors: u64,
    /// Total time chunks spent waiting for an in-flight slot.
    pub throttle_wait: Duration,
    /// Peak number of concurrently executing chunks.
    pub max_active_chunks: usize,
}

impl ExecutionMetricsSnapshot {
    /// Throughput of the last finished run, if its wall time is known.
    pub fn events_per_second(&self) -> Option<f64> {
        let elapsed = self.elapsed?.as_secs_f64();
        (elapsed > 0.0).then(|| self.events_processed as f64 / elapsed)
    }
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {}: {} events in {}/{} chunks ({} errors), max {} in flight, throttled {:?}, elapsed {:?}",
            self.runs,
            self.events_processed,
            self.chunks_finished,
            self.chunks_started,
            self.producer_errors,
            self.max_active_chunks,
            self.throttle_wait,
            self.elapsed
        )
    }
}
