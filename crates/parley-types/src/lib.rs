pub mod config;
pub mod error;
pub mod ids;
pub mod job;
pub mod modality;

pub use config::{DeliveryMode, DispatchConfig, SummaryConfig, DEFAULT_CHUNK_SIZE};
pub use error::{ParleyError, Result};
pub use ids::{ConversationId, JobId};
pub use job::{JobOutcome, JobStatus};
pub use modality::Modality;
