use axum::{extract::State, Json};
use parley_dispatch::JobRequest;
use parley_types::ConversationId;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::jobs::{default_conversation, SubmitResponse};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SummarizeRequest {
    pub text: String,
    /// Characters per chunk; the server default applies when absent
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default = "default_conversation")]
    pub conversation_id: String,
}

/// Queue a chunked summary of a document's text.
///
/// The summary is delivered through the job endpoints like any other job.
#[utoipa::path(
    post,
    path = "/documents/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Job accepted", body = SubmitResponse),
        (status = 400, description = "Empty text"),
        (status = 503, description = "Job queue is full")
    ),
    tag = "documents"
)]
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("No text provided".to_string()));
    }

    let conversation_id = ConversationId::new(req.conversation_id);
    let job_id = state
        .app
        .dispatcher
        .submit(
            conversation_id.clone(),
            JobRequest::summarize(req.text, req.chunk_size),
        )
        .await?;

    Ok(Json(SubmitResponse::processing(&conversation_id, job_id)))
}
