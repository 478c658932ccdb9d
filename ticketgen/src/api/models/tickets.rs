//! Models for the ticket generation endpoint.

use crate::extraction::ExtractionResult;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters accepted by `POST /api/generate-tickets`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GenerateTicketsQuery {
    /// Replaces the built-in extraction prompt. A `customPrompt` form field takes precedence.
    #[serde(rename = "customPrompt")]
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketStats {
    /// Number of entries in the `epics` array, zero if it is missing.
    pub epics: usize,
    /// Number of non-text files sent to the model.
    #[serde(rename = "imagesProcessed")]
    pub images_processed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "message": "Requirements analyzed successfully!",
    "stats": { "epics": 1, "imagesProcessed": 0 },
    "aiOutput": {
        "epics": [{
            "epicNumber": 1,
            "summary": "User authentication",
            "category": "FUNCTIONAL",
            "stories": [{ "storyNumber": "1.1", "summary": "Log in with email", "priority": "High", "subtasks": [] }]
        }]
    }
}))]
pub struct TicketGenerationResponse {
    pub message: String,
    pub stats: TicketStats,
    /// The object recovered from the model output, passed through as-is.
    #[serde(rename = "aiOutput")]
    #[schema(value_type = Object)]
    pub ai_output: ExtractionResult,
}

impl TicketGenerationResponse {
    pub const SUCCESS_MESSAGE: &'static str = "Requirements analyzed successfully!";

    pub fn new(ai_output: ExtractionResult, images_processed: usize) -> Self {
        Self {
            message: Self::SUCCESS_MESSAGE.to_string(),
            stats: TicketStats {
                epics: ai_output.epic_count(),
                images_processed,
            },
            ai_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_uses_camel_case_wire_names() {
        let object = json!({ "epics": [{ "summary": "A" }, { "summary": "B" }] });
        let result = ExtractionResult::new(object.as_object().unwrap().clone());

        let body = serde_json::to_value(TicketGenerationResponse::new(result, 3)).unwrap();

        assert_eq!(
            body,
            json!({
                "message": "Requirements analyzed successfully!",
                "stats": { "epics": 2, "imagesProcessed": 3 },
                "aiOutput": object,
            })
        );
    }
}
