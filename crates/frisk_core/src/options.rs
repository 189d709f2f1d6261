//! Tuning knobs for a scan call.

use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

/// Default matching budget for each individual payload.
pub const DEFAULT_PAYLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Hard upper bound on concurrent scan workers, regardless of payload
/// count. A small fixed pool keeps resource usage predictable against
/// adversarial inputs.
pub const MAX_WORKERS: usize = 5;

/// Options for a single scan call.
///
/// The defaults are safe for CI-style batches: unbounded overall budget, a
/// generous per-payload budget, and a worker count derived from the
/// machine's available parallelism.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Wall-clock budget for the whole call. `None` means unbounded.
    pub timeout: Option<Duration>,
    /// Matching budget for each individual payload.
    pub payload_timeout: Duration,
    /// Whether to shard payloads across worker threads. When `false`, the
    /// whole batch runs inline on the caller's thread with the same
    /// timeout semantics.
    pub parallel: bool,
    /// Upper bound on concurrent workers; always capped at [`MAX_WORKERS`].
    pub max_workers: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            payload_timeout: DEFAULT_PAYLOAD_TIMEOUT,
            parallel: true,
            max_workers: default_worker_count(),
        }
    }
}

impl ScanOptions {
    /// Creates options with the documented defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wall-clock budget for the whole call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the matching budget for each individual payload.
    #[must_use]
    pub const fn with_payload_timeout(mut self, payload_timeout: Duration) -> Self {
        self.payload_timeout = payload_timeout;
        self
    }

    /// Runs the whole batch on the caller's thread instead of sharding it
    /// across workers.
    #[must_use]
    pub const fn inline(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Sets the worker bound, clamped to `1..=`[`MAX_WORKERS`].
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.clamp(1, MAX_WORKERS);
        self
    }
}

fn default_worker_count() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get).min(MAX_WORKERS)
}
