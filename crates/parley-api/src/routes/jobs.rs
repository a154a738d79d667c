use axum::{
    extract::{Path, Query, State},
    Json,
};
use parley_dispatch::{CompletedJob, JobRequest, Poll};
use parley_session::{decode_image, ImageSource};
use parley_types::{ConversationId, JobId, JobStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub(crate) fn default_conversation() -> String {
    ConversationId::default().to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TextJobRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_conversation")]
    pub conversation_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImageJobRequest {
    #[serde(default)]
    pub prompt: String,
    /// Base64 payload, optionally as a `data:image/...;base64,` URI
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_conversation")]
    pub conversation_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    pub status: String,
    pub conversation_id: String,
    pub job_id: String,
}

impl SubmitResponse {
    pub(crate) fn processing(conversation_id: &ConversationId, job_id: JobId) -> Self {
        Self {
            status: "processing".to_string(),
            conversation_id: conversation_id.to_string(),
            job_id: job_id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    /// Conversation the caller is waiting on (used with per-conversation delivery)
    pub conversation_id: Option<String>,
}

/// `{status: "processing"}` or a delivered result
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum StatusResponse {
    Ready {
        status: String,
        conversation_id: String,
        job_id: String,
        response: Option<String>,
        error: Option<String>,
    },
    Processing {
        status: String,
    },
}

impl StatusResponse {
    fn processing() -> Self {
        Self::Processing {
            status: "processing".to_string(),
        }
    }

    fn ready(done: CompletedJob) -> Self {
        Self::Ready {
            status: "ready".to_string(),
            conversation_id: done.conversation_id.to_string(),
            job_id: done.job_id.to_string(),
            response: done.result().map(str::to_string),
            error: done.error().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobStatusResponse {
    pub job_id: String,
    #[schema(value_type = String, example = "ready")]
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Submit a text prompt
#[utoipa::path(
    post,
    path = "/jobs/text",
    request_body = TextJobRequest,
    responses(
        (status = 200, description = "Job accepted", body = SubmitResponse),
        (status = 503, description = "Job queue is full")
    ),
    tag = "jobs"
)]
pub async fn submit_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextJobRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    let conversation_id = ConversationId::new(req.conversation_id);
    let job_id = state
        .app
        .dispatcher
        .submit(conversation_id.clone(), JobRequest::text(req.prompt))
        .await?;

    Ok(Json(SubmitResponse::processing(&conversation_id, job_id)))
}

/// Submit a prompt with at most one image to the conversation's vision session.
///
/// The image is decoded before the job is queued, so malformed payloads are
/// rejected with 400 right away. Without an image the prompt is sent as a
/// text turn of the same session.
#[utoipa::path(
    post,
    path = "/jobs/image",
    request_body = ImageJobRequest,
    responses(
        (status = 200, description = "Job accepted", body = SubmitResponse),
        (status = 400, description = "Undecodable image, or neither prompt nor image"),
        (status = 503, description = "Job queue is full")
    ),
    tag = "jobs"
)]
pub async fn submit_image(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImageJobRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    let image = if req.image.trim().is_empty() {
        None
    } else {
        Some(ImageSource::bytes(decode_image(ImageSource::base64(req.image))?.data))
    };
    if image.is_none() && req.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("No prompt or image provided".to_string()));
    }

    let conversation_id = ConversationId::new(req.conversation_id);
    let job_id = state
        .app
        .dispatcher
        .submit(conversation_id.clone(), JobRequest::vision(req.prompt, image))
        .await?;

    Ok(Json(SubmitResponse::processing(&conversation_id, job_id)))
}

/// Poll for a finished job.
///
/// With shared delivery this returns the oldest finished job of any
/// conversation; callers must check `conversation_id`.
#[utoipa::path(
    get,
    path = "/jobs/status",
    params(StatusQuery),
    responses(
        (status = 200, description = "Processing or a finished job", body = StatusResponse)
    ),
    tag = "jobs"
)]
pub async fn poll_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Json<StatusResponse> {
    let conversation_id = query
        .conversation_id
        .map(ConversationId::new)
        .unwrap_or_default();

    match state.app.dispatcher.poll_for(&conversation_id).await {
        Poll::Ready(done) => Json(StatusResponse::ready(done)),
        Poll::Pending | Poll::Processing => Json(StatusResponse::processing()),
    }
}

/// Poll one job by id; a finished job is returned once
#[utoipa::path(
    get,
    path = "/jobs/{job_id}",
    params(("job_id" = String, Path, description = "Job id returned on submit")),
    responses(
        (status = 200, description = "Job state", body = JobStatusResponse),
        (status = 400, description = "Malformed job id"),
        (status = 404, description = "Unknown or already collected job")
    ),
    tag = "jobs"
)]
pub async fn poll_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    let id: JobId = job_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid job id: {}", job_id)))?;

    let response = match state.app.dispatcher.poll_job(id).await? {
        Poll::Pending => JobStatusResponse::waiting(id, JobStatus::Pending),
        Poll::Processing => JobStatusResponse::waiting(id, JobStatus::Processing),
        Poll::Ready(done) => JobStatusResponse {
            job_id: id.to_string(),
            status: done.outcome.status(),
            conversation_id: Some(done.conversation_id.to_string()),
            response: done.result().map(str::to_string),
            error: done.error().map(str::to_string),
        },
    };

    Ok(Json(response))
}

impl JobStatusResponse {
    fn waiting(id: JobId, status: JobStatus) -> Self {
        Self {
            job_id: id.to_string(),
            status,
            conversation_id: None,
            response: None,
            error: None,
        }
    }
}
