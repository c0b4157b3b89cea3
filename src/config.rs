//! Runtime configuration for the parallel engines.
//!
//! Only the worker count is configurable. Everything else about a run is
//! decided by its inputs.

/// Worker-count configuration shared by every parallel region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on worker threads. `None` uses the hardware concurrency.
    pub max_threads: Option<usize>,
    /// Force a single worker. Takes precedence over `max_threads`.
    pub single_thread: bool,
}

impl RuntimeConfig {
    /// Create the default configuration (one worker per hardware thread).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit worker count.
    ///
    /// `0` is accepted here and rejected when the pool is built.
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = Some(max_threads);
        self
    }

    /// Run every parallel region on one worker.
    pub fn with_single_thread(mut self, single_thread: bool) -> Self {
        self.single_thread = single_thread;
        self
    }

    /// Resolve the effective thread count.
    ///
    /// - `single_thread == true` → `Some(1)`
    /// - `max_threads == Some(n)` → `Some(n)`
    /// - otherwise → `None` (ask the runtime)
    pub fn effective_threads(&self) -> Option<usize> {
        if self.single_thread {
            Some(1)
        } else {
            self.max_threads
        }
    }
}
