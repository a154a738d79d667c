use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley_types::ParleyError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Model provider error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Parley(#[from] ParleyError),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Parley(err) => match err {
                ParleyError::Capability(_)
                | ParleyError::Decode(_)
                | ParleyError::EmptyInput(_)
                | ParleyError::Extraction(_) => StatusCode::BAD_REQUEST,
                ParleyError::SessionNotFound(_) | ParleyError::JobNotFound(_) => StatusCode::NOT_FOUND,
                ParleyError::QueueFull(_) | ParleyError::DispatcherClosed => StatusCode::SERVICE_UNAVAILABLE,
                ParleyError::ModelInvocation(_) => StatusCode::BAD_GATEWAY,
                ParleyError::ClientInit(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Parley(ParleyError::ClientInit(msg)) => {
                tracing::error!("Client initialization error: {}", msg);
                "Model client is not configured".to_string()
            }
            ApiError::Internal => {
                tracing::error!("Internal error");
                self.to_string()
            }
            ApiError::Upstream(msg) | ApiError::Parley(ParleyError::ModelInvocation(msg)) => {
                tracing::warn!("Model provider error: {}", msg);
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ParleyError::Decode("bad".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ParleyError::QueueFull(4)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ParleyError::JobNotFound(parley_types::JobId::new())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ParleyError::ModelInvocation("500".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_api_error_response() {
        let response = ApiError::BadRequest("Test error".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
