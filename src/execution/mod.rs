//! Execution engine for running producers with configurable parallelism.
//!
//! This module sits "above" [`crate::producers`] and provides:
//!
//! - Parallel (chunked) derived-column definition and event filtering
//! - Resource limits / throttling (e.g., in-flight chunks)
//! - Real-time metrics + observer hooks for monitoring
//!
//! Producers are pure per-event functions with no shared mutable state, so
//! evaluating them across event chunks on a thread pool needs no locking
//! beyond the read-only sharing of inputs (e.g. calibration evaluators).

mod observer;
mod throttle;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{EventStore, Field, Schema, Value};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
};

use throttle::ChunkThrottle;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of events per chunk.
    ///
    /// Chunking lets the engine bound working-set size and implement throttling.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n.max(1),
        }
    }
}

/// A configurable execution engine for in-memory [`EventStore`] pipelines.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size == 0`, `max_in_flight_chunks == 0`, or `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> Self {
        assert!(opts.chunk_size > 0, "chunk_size must be > 0");
        assert!(
            opts.max_in_flight_chunks > 0,
            "max_in_flight_chunks must be > 0"
        );
        if let Some(n) = opts.num_threads {
            assert!(n > 0, "num_threads must be > 0 when set");
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .expect("failed to build rayon thread pool");

        Self {
            pool,
            opts: opts.clone(),
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Define a derived column in parallel over event chunks.
    ///
    /// Semantics match [`EventStore::define`]: the producer runs once per
    /// event, chunk order is preserved, and the first producer error aborts
    /// the run.
    pub fn define_parallel<F>(
        &self,
        store: &EventStore,
        field: Field,
        producer: F,
    ) -> AnalysisResult<EventStore>
    where
        F: Fn(&[Value]) -> AnalysisResult<Value> + Send + Sync,
    {
        self.pool
            .install(|| self.define_parallel_impl(store, field, &producer))
    }

    fn define_parallel_impl(
        &self,
        store: &EventStore,
        field: Field,
        producer: &(dyn Fn(&[Value]) -> AnalysisResult<Value> + Send + Sync),
    ) -> AnalysisResult<EventStore> {
        if store.schema.index_of(&field.name).is_some() {
            return Err(AnalysisError::SchemaMismatch {
                message: format!("column '{}' already defined", field.name),
            });
        }

        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);
        self.emit(ExecutionEvent::DefineStarted {
            column: field.name.clone(),
        });

        let throttle = ChunkThrottle::new(self.opts.max_in_flight_chunks, &self.metrics);
        let chunk_ranges = chunk_ranges(store.event_count(), self.opts.chunk_size);

        let per_chunk: Vec<AnalysisResult<Vec<Value>>> = chunk_ranges
            .into_par_iter()
            .map(|range| {
                let waited = throttle.start_chunk();
                if waited > Duration::ZERO {
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }
                self.emit(ExecutionEvent::ChunkStarted {
                    start_event: range.start,
                    event_count: range.end - range.start,
                });

                let result = (|| {
                    let mut out = Vec::with_capacity(range.end - range.start);
                    for row in &store.events[range.clone()] {
                        out.push(producer(row.as_slice())?);
                    }
                    Ok(out)
                })();
                match &result {
                    Ok(values) => self.metrics.on_events_processed(values.len() as u64),
                    Err(_) => self.metrics.on_producer_error(),
                }

                self.emit(ExecutionEvent::ChunkFinished {
                    output_events: result.as_ref().map_or(0, Vec::len),
                });
                throttle.finish_chunk();
                result
            })
            .collect();

        let mut column = Vec::with_capacity(store.event_count());
        for chunk in per_chunk {
            match chunk {
                Ok(values) => column.extend(values),
                Err(e) => {
                    self.metrics.end_run(start.elapsed());
                    return Err(e);
                }
            }
        }

        let events = store
            .events
            .iter()
            .zip(column)
            .map(|(row, value)| {
                let mut out = row.clone();
                out.push(value);
                out
            })
            .collect();

        let mut fields = store.schema.fields.clone();
        fields.push(field);
        let out = EventStore::new(Schema::new(fields), events);

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        Ok(out)
    }

    /// Execute a parallel event filter over the store.
    pub fn filter_parallel<F>(&self, store: &EventStore, predicate: F) -> EventStore
    where
        F: Fn(&[Value]) -> bool + Send + Sync,
    {
        self.pool
            .install(|| self.filter_parallel_impl(store, &predicate))
    }

    fn filter_parallel_impl(
        &self,
        store: &EventStore,
        predicate: &(dyn Fn(&[Value]) -> bool + Send + Sync),
    ) -> EventStore {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);
        self.emit(ExecutionEvent::FilterStarted);

        let throttle = ChunkThrottle::new(self.opts.max_in_flight_chunks, &self.metrics);
        let chunk_ranges = chunk_ranges(store.event_count(), self.opts.chunk_size);

        let per_chunk: Vec<Vec<Vec<Value>>> = chunk_ranges
            .into_par_iter()
            .map(|range| {
                let waited = throttle.start_chunk();
                if waited > Duration::ZERO {
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }
                let chunk_events = range.end - range.start;
                self.emit(ExecutionEvent::ChunkStarted {
                    start_event: range.start,
                    event_count: chunk_events,
                });

                let mut out = Vec::new();
                for row in &store.events[range] {
                    if predicate(row.as_slice()) {
                        out.push(row.clone());
                    }
                }
                self.metrics.on_events_processed(chunk_events as u64);

                self.emit(ExecutionEvent::ChunkFinished {
                    output_events: out.len(),
                });
                throttle.finish_chunk();
                out
            })
            .collect();

        let events = per_chunk.into_iter().flatten().collect::<Vec<_>>();
        let out = EventStore::new(store.schema.clone(), events);

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        out
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn chunk_ranges(event_count: usize, chunk_size: usize) -> Vec<std::ops::Range<usize>> {
    if event_count == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(event_count.div_ceil(chunk_size));
    let mut start = 0usize;
    while start < event_count {
        let end = (start + chunk_size).min(event_count);
        out.push(start..end);
        start = end;
    }
    out
}
