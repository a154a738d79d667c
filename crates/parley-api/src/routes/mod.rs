pub mod conversations;
pub mod documents;
pub mod health;
pub mod jobs;
pub mod models;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        jobs::submit_text,
        jobs::submit_image,
        jobs::poll_status,
        jobs::poll_job,
        conversations::reset,
        documents::summarize,
        models::list_models,
    ),
    components(schemas(
        health::HealthResponse,
        health::JobCounts,
        jobs::TextJobRequest,
        jobs::ImageJobRequest,
        jobs::SubmitResponse,
        jobs::StatusResponse,
        jobs::JobStatusResponse,
        conversations::ResetRequest,
        conversations::ResetResponse,
        documents::SummarizeRequest,
        models::ModelsResponse,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "jobs", description = "Submit prompts and poll for results"),
        (name = "conversations", description = "Conversation history"),
        (name = "documents", description = "Document summaries"),
        (name = "models", description = "Provider models")
    )
)]
pub struct ApiDoc;
