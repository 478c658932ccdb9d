use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "JIRA Ticket Generator API")]
    pub message: String,
    #[schema(example = "running")]
    pub status: String,
}

impl HealthResponse {
    pub const MESSAGE: &'static str = "JIRA Ticket Generator API";
    pub const STATUS_RUNNING: &'static str = "running";

    pub fn running() -> Self {
        Self {
            message: Self::MESSAGE.to_string(),
            status: Self::STATUS_RUNNING.to_string(),
        }
    }
}
