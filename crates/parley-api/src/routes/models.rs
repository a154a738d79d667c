use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModelsQuery {
    /// Case-insensitive substring, e.g. `gemma`
    pub filter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModelsResponse {
    pub provider: String,
    pub text_model: String,
    pub vision_model: String,
    pub models: Vec<String>,
}

/// List the models the provider offers
#[utoipa::path(
    get,
    path = "/models",
    params(ModelsQuery),
    responses(
        (status = 200, description = "Available models", body = ModelsResponse),
        (status = 502, description = "Provider request failed")
    ),
    tag = "models"
)]
pub async fn list_models(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelsQuery>,
) -> ApiResult<Json<ModelsResponse>> {
    let models = state
        .app
        .client
        .list_models()
        .await
        .map_err(|e| ApiError::Upstream(format!("{:#}", e)))?;

    let llm = &state.config.llm;
    Ok(Json(ModelsResponse {
        provider: state.app.client.provider().to_string(),
        text_model: llm.text_model.clone(),
        vision_model: llm.vision_model.clone().unwrap_or_else(|| llm.text_model.clone()),
        models: filter_models(models, query.filter.as_deref()),
    }))
}

fn filter_models(models: Vec<String>, filter: Option<&str>) -> Vec<String> {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(needle) => {
            let needle = needle.to_lowercase();
            models
                .into_iter()
                .filter(|m| m.to_lowercase().contains(&needle))
                .collect()
        }
        None => models,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_is_case_insensitive() {
        let models = vec![
            "models/gemma-3-8b-it".to_string(),
            "models/Gemma-2".to_string(),
            "models/gemini-1.5-pro".to_string(),
        ];
        assert_eq!(
            filter_models(models.clone(), Some("GEMMA")),
            vec!["models/gemma-3-8b-it".to_string(), "models/Gemma-2".to_string()]
        );
        assert_eq!(filter_models(models.clone(), Some("  ")).len(), 3);
        assert_eq!(filter_models(models, None).len(), 3);
    }
}
