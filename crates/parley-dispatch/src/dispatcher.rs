use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use futures::FutureExt;
use parley_types::{ConversationId, DeliveryMode, DispatchConfig, JobId, JobOutcome, ParleyError, Result};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::handler::JobHandler;
use crate::job::{Job, JobRequest, Poll, Submission};
use crate::store::{JobStore, StoreCounts};

/// Bounded worker pool behind a submit/poll interface.
///
/// `submit` only enqueues; workers pull jobs in submission order and record
/// every outcome, failures included, in the [`JobStore`]. A saturated queue
/// rejects `submit` with `QueueFull` and makes `submit_wait` wait.
pub struct Dispatcher {
    tx: Sender<Submission>,
    store: Arc<JobStore>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Spawn the worker pool. Must be called inside a tokio runtime.
    pub fn start(handler: Arc<dyn JobHandler>, config: DispatchConfig) -> Self {
        let worker_count = config.workers.max(1);
        let capacity = config.queue_capacity.max(1);
        let (tx, rx) = bounded::<Submission>(capacity);
        let store = Arc::new(JobStore::with_retention(config.retained_results));

        let workers = (0..worker_count)
            .map(|worker| {
                let rx = rx.clone();
                let store = store.clone();
                let handler = handler.clone();
                tokio::spawn(async move { run_worker(worker, rx, store, handler).await })
            })
            .collect();

        info!(
            workers = worker_count,
            queue_capacity = capacity,
            delivery = ?config.delivery,
            retained_results = config.retained_results,
            "Dispatcher started"
        );

        Self {
            tx,
            store,
            workers: Mutex::new(workers),
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Enqueue without waiting; fails with `QueueFull` when saturated
    pub async fn submit(&self, conversation_id: ConversationId, request: JobRequest) -> Result<JobId> {
        let submission = self.register(conversation_id, request).await;
        let id = submission.id;

        match self.tx.try_send(submission) {
            Ok(()) => {
                debug!(job_id = %id, queued = self.tx.len(), "Job submitted");
                Ok(id)
            }
            Err(TrySendError::Full(_)) => {
                self.store.remove(id).await;
                warn!(job_id = %id, capacity = self.capacity(), "Job queue full");
                Err(ParleyError::QueueFull(self.capacity()))
            }
            Err(TrySendError::Closed(_)) => {
                self.store.remove(id).await;
                Err(ParleyError::DispatcherClosed)
            }
        }
    }

    /// Enqueue, waiting for queue capacity if needed
    pub async fn submit_wait(&self, conversation_id: ConversationId, request: JobRequest) -> Result<JobId> {
        let submission = self.register(conversation_id, request).await;
        let id = submission.id;

        if self.tx.send(submission).await.is_err() {
            self.store.remove(id).await;
            return Err(ParleyError::DispatcherClosed);
        }
        debug!(job_id = %id, "Job submitted");
        Ok(id)
    }

    async fn register(&self, conversation_id: ConversationId, request: JobRequest) -> Submission {
        let id = JobId::new();
        self.store
            .insert(Job::pending(id, conversation_id.clone(), request.kind()))
            .await;
        Submission {
            id,
            conversation_id,
            request,
        }
    }

    /// Oldest completed job of any conversation.
    ///
    /// The result may belong to another conversation than the caller's;
    /// callers must compare `conversation_id` and poll again on mismatch.
    pub async fn poll(&self) -> Poll {
        self.store.poll().await
    }

    /// Oldest completed job of one conversation
    pub async fn poll_conversation(&self, conversation_id: &ConversationId) -> Poll {
        self.store.poll_conversation(conversation_id).await
    }

    /// Outcome of one job; drains it once terminal
    pub async fn poll_job(&self, id: JobId) -> Result<Poll> {
        self.store.poll_job(id).await
    }

    /// Poll according to the configured [`DeliveryMode`]
    pub async fn poll_for(&self, conversation_id: &ConversationId) -> Poll {
        match self.config.delivery {
            DeliveryMode::Shared => self.poll().await,
            DeliveryMode::PerConversation => self.poll_conversation(conversation_id).await,
        }
    }

    /// Registry view without draining
    pub async fn status(&self, id: JobId) -> Option<Job> {
        self.store.get(id).await
    }

    pub fn queued(&self) -> usize {
        self.tx.len()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(self.config.queue_capacity)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub async fn counts(&self) -> StoreCounts {
        self.store.counts().await
    }

    /// Stop accepting jobs and wait for workers to drain the queue
    pub async fn shutdown(&self) {
        self.tx.close();
        let workers: Vec<_> = self.workers.lock().await.drain(..).collect();
        for worker in workers {
            if let Err(e) = worker.await {
                error!(error = %e, "Worker task ended abnormally");
            }
        }
        info!("Dispatcher stopped");
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.tx.close();
    }
}

async fn run_worker(
    worker: usize,
    rx: Receiver<Submission>,
    store: Arc<JobStore>,
    handler: Arc<dyn JobHandler>,
) {
    debug!(worker, "Worker started");

    while let Ok(Submission {
        id,
        conversation_id,
        request,
    }) = rx.recv().await
    {
        if !store.mark_processing(id).await {
            continue;
        }
        debug!(worker, job_id = %id, conversation_id = %conversation_id, kind = %request.kind(), "Job started");

        let result = AssertUnwindSafe(handler.handle(&conversation_id, request))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(text)) => JobOutcome::Ready(text),
            Ok(Err(e)) => {
                warn!(worker, job_id = %id, error = %e, "Job failed");
                JobOutcome::Failed(e.to_string())
            }
            Err(_) => {
                error!(worker, job_id = %id, "Job handler panicked");
                JobOutcome::Failed("job handler panicked".to_string())
            }
        };

        store.complete(id, outcome).await;
        debug!(worker, job_id = %id, "Job finished");
    }

    debug!(worker, "Worker stopped");
}
