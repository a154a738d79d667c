//! Asynchronous job dispatch for Parley.
//!
//! Long model calls are submitted as jobs and executed by a bounded pool of
//! workers. Callers poll for results, either from the shared completion queue
//! ([`Dispatcher::poll`]) or per job ([`Dispatcher::poll_job`]).

mod dispatcher;
mod handler;
mod job;
mod store;

pub use dispatcher::Dispatcher;
pub use handler::{ConversationHandler, JobHandler};
pub use job::{CompletedJob, Job, JobKind, JobRequest, Poll};
pub use store::{JobStore, StoreCounts};
