use axum::{body::Bytes, extract::State, Json};
use parley_types::Modality;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResetRequest {
    /// `text` (default) or `image`
    #[serde(rename = "type", default)]
    #[schema(value_type = String, example = "text")]
    pub kind: Modality,
}

impl ResetRequest {
    /// An empty body resets text conversations; anything else must name a
    /// known modality
    fn parse(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid reset request: {}", e)))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    pub status: String,
    pub modality: String,
    /// Sessions whose history was cleared
    pub sessions: usize,
}

/// Clear every conversation of one modality
#[utoipa::path(
    post,
    path = "/conversations/reset",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Histories cleared", body = ResetResponse),
        (status = 400, description = "Malformed body or unknown type")
    ),
    tag = "conversations"
)]
pub async fn reset(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<ResetResponse>> {
    let req = ResetRequest::parse(&body)?;
    let sessions = state.app.sessions.reset_modality(req.kind).await;
    tracing::info!(modality = %req.kind, sessions, "Conversations reset");

    Ok(Json(ResetResponse {
        status: "reset".to_string(),
        modality: req.kind.to_string(),
        sessions,
    }))
}
