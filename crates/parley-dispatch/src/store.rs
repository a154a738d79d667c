use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use parley_types::{ConversationId, JobId, JobOutcome, JobStatus, ParleyError, Result};
use tokio::sync::Mutex;
use tracing::warn;

use crate::job::{CompletedJob, Job, Poll};

#[derive(Debug, Default)]
struct Inner {
    jobs: HashMap<JobId, Job>,
    /// Terminal jobs in completion order
    completed: VecDeque<JobId>,
}

impl Inner {
    fn take(&mut self, id: JobId) -> Option<CompletedJob> {
        let job = self.jobs.remove(&id)?;
        let outcome = job.outcome?;
        Some(CompletedJob {
            job_id: job.id,
            conversation_id: job.conversation_id,
            outcome,
        })
    }
}

/// Job registry plus the completion-ordered result queue.
///
/// A completed job can be drained exactly once, either from the shared queue
/// or by its own id. At most `retained` undrained results are kept; older
/// ones are evicted as new jobs finish.
#[derive(Debug)]
pub struct JobStore {
    inner: Mutex<Inner>,
    retained: usize,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETAINED_RESULTS)
    }
}

const DEFAULT_RETAINED_RESULTS: usize = 1024;

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retained: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            retained: retained.max(1),
        }
    }

    pub async fn insert(&self, job: Job) {
        self.inner.lock().await.jobs.insert(job.id, job);
    }

    pub async fn remove(&self, id: JobId) -> Option<Job> {
        let mut inner = self.inner.lock().await;
        inner.completed.retain(|queued| *queued != id);
        inner.jobs.remove(&id)
    }

    pub async fn get(&self, id: JobId) -> Option<Job> {
        self.inner.lock().await.jobs.get(&id).cloned()
    }

    /// pending -> processing; false if the job is unknown or not pending
    pub async fn mark_processing(&self, id: JobId) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(job) = inner.jobs.get_mut(&id) else {
            return false;
        };
        if !job.status.can_transition_to(JobStatus::Processing) {
            warn!(job_id = %id, status = ?job.status, "Refusing to restart job");
            return false;
        }
        job.status = JobStatus::Processing;
        job.started_at = Some(Utc::now());
        true
    }

    /// processing -> ready | failed. Terminal jobs are never overwritten.
    pub async fn complete(&self, id: JobId, outcome: JobOutcome) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(job) = inner.jobs.get_mut(&id) else {
            return false;
        };
        let next = outcome.status();
        if !job.status.can_transition_to(next) {
            warn!(job_id = %id, status = ?job.status, next = ?next, "Refusing job transition");
            return false;
        }
        job.status = next;
        job.outcome = Some(outcome);
        job.finished_at = Some(Utc::now());
        inner.completed.push_back(id);

        while inner.completed.len() > self.retained {
            if let Some(evicted) = inner.completed.pop_front() {
                inner.jobs.remove(&evicted);
                warn!(job_id = %evicted, retained = self.retained, "Dropping uncollected job result");
            }
        }
        true
    }

    /// Oldest completed job of any conversation
    pub async fn poll(&self) -> Poll {
        let mut inner = self.inner.lock().await;
        while let Some(id) = inner.completed.pop_front() {
            if let Some(done) = inner.take(id) {
                return Poll::Ready(done);
            }
        }
        Poll::Processing
    }

    /// Oldest completed job of `conversation`; other results keep their place
    pub async fn poll_conversation(&self, conversation: &ConversationId) -> Poll {
        let mut inner = self.inner.lock().await;
        let position = inner.completed.iter().position(|id| {
            inner
                .jobs
                .get(id)
                .is_some_and(|job| &job.conversation_id == conversation)
        });

        let Some(pos) = position else {
            return Poll::Processing;
        };
        match inner.completed.remove(pos) {
            Some(id) => inner.take(id).map_or(Poll::Processing, Poll::Ready),
            None => Poll::Processing,
        }
    }

    /// State of one job; a terminal job is drained by this call
    pub async fn poll_job(&self, id: JobId) -> Result<Poll> {
        let mut inner = self.inner.lock().await;
        let status = inner
            .jobs
            .get(&id)
            .map(|job| job.status)
            .ok_or(ParleyError::JobNotFound(id))?;

        match status {
            JobStatus::Pending => Ok(Poll::Pending),
            JobStatus::Processing => Ok(Poll::Processing),
            JobStatus::Ready | JobStatus::Failed => {
                inner.completed.retain(|queued| *queued != id);
                inner
                    .take(id)
                    .map(Poll::Ready)
                    .ok_or(ParleyError::JobNotFound(id))
            }
        }
    }

    /// Jobs by status, for health reporting
    pub async fn counts(&self) -> StoreCounts {
        let inner = self.inner.lock().await;
        let mut counts = StoreCounts::default();
        for job in inner.jobs.values() {
            match job.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Ready | JobStatus::Failed => counts.completed += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StoreCounts {
    pub pending: usize,
    pub processing: usize,
    /// Terminal but not yet polled
    pub completed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobKind;

    async fn finished(store: &JobStore, conversation: &str, result: &str) -> JobId {
        let id = JobId::new();
        store
            .insert(Job::pending(id, ConversationId::new(conversation), JobKind::Text))
            .await;
        assert!(store.mark_processing(id).await);
        assert!(store.complete(id, JobOutcome::Ready(result.to_string())).await);
        id
    }

    #[tokio::test]
    async fn test_terminal_state_is_final() {
        let store = JobStore::new();
        let id = finished(&store, "a", "done").await;

        assert!(!store.complete(id, JobOutcome::Failed("late".into())).await);
        assert!(!store.mark_processing(id).await);

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Ready);
        assert_eq!(job.outcome, Some(JobOutcome::Ready("done".into())));
    }

    #[tokio::test]
    async fn test_pending_cannot_complete_directly() {
        let store = JobStore::new();
        let id = JobId::new();
        store
            .insert(Job::pending(id, ConversationId::default(), JobKind::Text))
            .await;

        assert!(!store.complete(id, JobOutcome::Ready("x".into())).await);
        assert_eq!(store.poll_job(id).await.unwrap(), Poll::Pending);
    }

    #[tokio::test]
    async fn test_shared_poll_is_completion_ordered() {
        let store = JobStore::new();
        assert_eq!(store.poll().await, Poll::Processing);

        finished(&store, "b", "first").await;
        finished(&store, "a", "second").await;

        let done = store.poll().await.into_completed().unwrap();
        assert_eq!(done.conversation_id.as_str(), "b");
        let done = store.poll().await.into_completed().unwrap();
        assert_eq!(done.result(), Some("second"));
        assert_eq!(store.poll().await, Poll::Processing);
    }

    #[tokio::test]
    async fn test_poll_conversation_keeps_other_results() {
        let store = JobStore::new();
        finished(&store, "b", "for b").await;
        finished(&store, "a", "for a").await;

        let done = store
            .poll_conversation(&ConversationId::new("a"))
            .await
            .into_completed()
            .unwrap();
        assert_eq!(done.result(), Some("for a"));

        assert_eq!(store.poll_conversation(&ConversationId::new("a")).await, Poll::Processing);
        let done = store.poll().await.into_completed().unwrap();
        assert_eq!(done.result(), Some("for b"));
    }

    #[tokio::test]
    async fn test_poll_job_drains_once() {
        let store = JobStore::new();
        let id = finished(&store, "a", "x").await;

        assert!(store.poll_job(id).await.unwrap().is_ready());
        assert_eq!(store.poll_job(id).await, Err(ParleyError::JobNotFound(id)));
        // Also gone from the shared queue
        assert_eq!(store.poll().await, Poll::Processing);
    }

    #[tokio::test]
    async fn test_uncollected_results_are_capped() {
        let store = JobStore::with_retention(2);
        let oldest = finished(&store, "a", "1").await;
        finished(&store, "b", "2").await;
        finished(&store, "c", "3").await;

        assert_eq!(store.poll_job(oldest).await, Err(ParleyError::JobNotFound(oldest)));
        assert_eq!(store.counts().await.completed, 2);
        let done = store.poll().await.into_completed().unwrap();
        assert_eq!(done.result(), Some("2"));
    }

    #[tokio::test]
    async fn test_drained_results_do_not_count_toward_cap() {
        let store = JobStore::with_retention(1);
        let first = finished(&store, "a", "1").await;
        assert!(store.poll_job(first).await.unwrap().is_ready());

        let second = finished(&store, "a", "2").await;
        assert!(store.poll_job(second).await.unwrap().is_ready());
    }

    #[tokio::test]
    async fn test_counts() {
        let store = JobStore::new();
        finished(&store, "a", "x").await;
        store
            .insert(Job::pending(JobId::new(), ConversationId::default(), JobKind::Summarize))
            .await;

        let counts = store.counts().await;
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.completed, 1);
    }
}
