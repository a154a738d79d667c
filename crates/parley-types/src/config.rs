use serde::{Deserialize, Serialize};

/// Documents longer than this many characters are summarized in chunks
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Maximum characters per chunk
    pub chunk_size: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl SummaryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// How completed jobs are handed back to pollers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// One FIFO shared by every conversation; callers must match ids
    #[default]
    Shared,
    /// Status polls only return results of the caller's conversation
    PerConversation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Number of background workers
    pub workers: usize,
    /// Jobs that may wait in the queue before submit is rejected
    pub queue_capacity: usize,
    pub delivery: DeliveryMode,
    /// Finished jobs kept until polled; the oldest are dropped beyond this
    pub retained_results: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 64,
            delivery: DeliveryMode::default(),
            retained_results: 1024,
        }
    }
}

impl DispatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn with_retained_results(mut self, retained: usize) -> Self {
        self.retained_results = retained;
        self
    }
}
