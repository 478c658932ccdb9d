//! Ticket extraction: from uploaded requirements to an epic/story/subtask hierarchy.
//!
//! - [`inputs`]: classifies uploads into requirements text and image payloads
//! - [`prompt`]: the built-in instructional prompt and the content separators
//! - [`recover`]: best-effort recovery of a JSON object from the model's free text
//! - [`result`]: read-only, permissive view over the recovered object
//!
//! [`TicketExtractor`] ties these together: it lays out the content parts, makes a single model
//! call, and hands the raw text to the recoverer. Nothing is retried and no state is kept
//! between calls.

pub mod inputs;
pub mod prompt;
pub mod recover;
pub mod result;

use crate::metrics;
use crate::model::{ContentPart, GenerativeModel, ModelError};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

pub use inputs::{IMAGE_MIME_TYPE, Uploads};
pub use result::ExtractionResult;

/// Number of characters of an unparseable response logged from each end.
const RESPONSE_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No text requirements found. Please upload at least one .txt file.")]
    MissingRequirements,

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("AI response was not valid JSON")]
    UnparseableResponse,
}

/// Everything one extraction needs.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    requirements: String,
    images: Vec<Bytes>,
    custom_prompt: Option<String>,
}

impl ExtractionRequest {
    /// Fails when `requirements` is empty after trimming whitespace.
    pub fn new(requirements: impl Into<String>, images: Vec<Bytes>, custom_prompt: Option<String>) -> Result<Self, ExtractionError> {
        let requirements = requirements.into();
        if requirements.trim().is_empty() {
            return Err(ExtractionError::MissingRequirements);
        }
        Ok(Self {
            requirements,
            images,
            custom_prompt: custom_prompt.filter(|prompt| !prompt.is_empty()),
        })
    }

    pub fn from_uploads(uploads: Uploads, custom_prompt: Option<String>) -> Result<Self, ExtractionError> {
        let (requirements, images) = uploads.into_parts();
        Self::new(requirements, images, custom_prompt)
    }

    pub fn requirements(&self) -> &str {
        &self.requirements
    }

    pub fn images(&self) -> &[Bytes] {
        &self.images
    }

    pub fn custom_prompt(&self) -> Option<&str> {
        self.custom_prompt.as_deref()
    }
}

/// Builds the model input for a request and recovers the structured result from its answer.
pub struct TicketExtractor {
    model: Arc<dyn GenerativeModel>,
    default_prompt: String,
}

impl TicketExtractor {
    pub fn new(model: Arc<dyn GenerativeModel>, default_prompt: impl Into<String>) -> Self {
        Self {
            model,
            default_prompt: default_prompt.into(),
        }
    }

    /// Uses the configured prompt override if there is one, otherwise [`prompt::DEFAULT_PROMPT`].
    pub fn with_prompt_override(model: Arc<dyn GenerativeModel>, prompt_override: Option<&str>) -> Self {
        Self::new(model, prompt_override.unwrap_or(prompt::DEFAULT_PROMPT))
    }

    pub fn default_prompt(&self) -> &str {
        &self.default_prompt
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// `[prompt, header, requirements, (header, image...)]`, the image section only when images
    /// are attached.
    pub fn content_parts(&self, request: &ExtractionRequest) -> Vec<ContentPart> {
        let prompt = request.custom_prompt().unwrap_or(&self.default_prompt);

        let mut parts = Vec::with_capacity(4 + request.images.len());
        parts.push(ContentPart::text(prompt));
        parts.push(ContentPart::text(prompt::REQUIREMENTS_HEADER));
        parts.push(ContentPart::text(request.requirements.as_str()));

        if !request.images.is_empty() {
            parts.push(ContentPart::text(prompt::DIAGRAMS_HEADER));
            parts.extend(
                request
                    .images
                    .iter()
                    .map(|image| ContentPart::inline_data(IMAGE_MIME_TYPE, image.clone())),
            );
        }

        parts
    }

    #[instrument(skip_all, fields(model = %self.model.name(), images = request.images.len(), custom_prompt = request.custom_prompt.is_some()))]
    pub async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionResult, ExtractionError> {
        let parts = self.content_parts(&request);

        info!("Sending prompt to AI");
        let text = self.model.generate(parts).await?;
        info!(chars = text.len(), "AI response received");

        match recover::recover_with_strategy(&text) {
            Some((strategy, object)) => {
                metrics::record_json_recovery(strategy.as_str());
                info!(%strategy, "Recovered JSON from AI response");
                Ok(ExtractionResult::new(object))
            }
            None => {
                metrics::record_json_recovery("failed");
                warn!("Failed to parse AI response as JSON");
                warn!("Response preview (first {} chars): {}", RESPONSE_PREVIEW_CHARS, head(&text, RESPONSE_PREVIEW_CHARS));
                warn!("Response preview (last {} chars): {}", RESPONSE_PREVIEW_CHARS, tail(&text, RESPONSE_PREVIEW_CHARS));
                Err(ExtractionError::UnparseableResponse)
            }
        }
    }
}

fn head(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn tail(text: &str, chars: usize) -> &str {
    let count = text.chars().count();
    if count <= chars {
        return text;
    }
    match text.char_indices().nth(count - chars) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockModel;
    use serde_json::json;

    fn extractor(model: &Arc<MockModel>) -> TicketExtractor {
        TicketExtractor::new(model.clone(), "DEFAULT PROMPT")
    }

    #[test]
    fn test_request_requires_non_blank_text() {
        assert!(matches!(
            ExtractionRequest::new("  \n\n ", vec![Bytes::from_static(b"img")], None),
            Err(ExtractionError::MissingRequirements)
        ));
        assert!(ExtractionRequest::new("Epic 1", vec![], None).is_ok());
    }

    #[test]
    fn test_empty_custom_prompt_is_ignored() {
        let request = ExtractionRequest::new("Epic 1", vec![], Some(String::new())).unwrap();
        assert_eq!(request.custom_prompt(), None);
    }

    #[test]
    fn test_content_parts_without_images() {
        let model = Arc::new(MockModel::new());
        let request = ExtractionRequest::new("Epic 1\n\n", vec![], None).unwrap();

        let parts = extractor(&model).content_parts(&request);

        assert_eq!(
            parts,
            vec![
                ContentPart::text("DEFAULT PROMPT"),
                ContentPart::text("\n\n**Requirements:**\n"),
                ContentPart::text("Epic 1\n\n"),
            ]
        );
    }

    #[test]
    fn test_content_parts_with_images_and_custom_prompt() {
        let model = Arc::new(MockModel::new());
        let images = vec![Bytes::from_static(b"first"), Bytes::from_static(b"second")];
        let request = ExtractionRequest::new("Epic 1", images, Some("Focus on security".to_string())).unwrap();

        let parts = extractor(&model).content_parts(&request);

        assert_eq!(
            parts,
            vec![
                ContentPart::text("Focus on security"),
                ContentPart::text("\n\n**Requirements:**\n"),
                ContentPart::text("Epic 1"),
                ContentPart::text("\n\n**Architecture Diagrams:**\n"),
                ContentPart::inline_data("image/png", Bytes::from_static(b"first")),
                ContentPart::inline_data("image/png", Bytes::from_static(b"second")),
            ]
        );
    }

    #[test]
    fn test_prompt_override_from_configuration() {
        let model = Arc::new(MockModel::new());
        assert_eq!(TicketExtractor::with_prompt_override(model.clone(), None).default_prompt(), prompt::DEFAULT_PROMPT);
        assert_eq!(
            TicketExtractor::with_prompt_override(model, Some("configured")).default_prompt(),
            "configured"
        );
    }

    #[tokio::test]
    async fn test_extract_recovers_fenced_output() {
        let model = Arc::new(MockModel::new());
        model.push_text("```json\n{\"epics\": [{\"summary\": \"Search\", \"stories\": []}]}\n```");
        let request = ExtractionRequest::new("Epic: Search", vec![], None).unwrap();

        let result = extractor(&model).extract(request).await.unwrap();

        assert_eq!(result.epic_count(), 1);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"epics": [{"summary": "Search", "stories": []}]})
        );
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_prompt_is_first_part_sent() {
        let model = Arc::new(MockModel::new());
        model.push_text("{\"epics\": []}");
        let request = ExtractionRequest::new("Epic 1", vec![], Some("Only security stories".to_string())).unwrap();

        extractor(&model).extract(request).await.unwrap();

        let calls = model.calls();
        assert_eq!(calls[0][0], ContentPart::text("Only security stories"));
    }

    #[tokio::test]
    async fn test_model_failure_is_reported() {
        let model = Arc::new(MockModel::new());
        model.push_error(503, "backend unavailable");
        let request = ExtractionRequest::new("Epic 1", vec![], None).unwrap();

        let err = extractor(&model).extract(request).await.unwrap_err();

        assert!(matches!(err, ExtractionError::Model(ModelError::Status { status: 503, .. })));
        assert!(err.to_string().contains("backend unavailable"));
    }

    #[test_log::test(tokio::test)]
    async fn test_unparseable_output_is_reported() {
        let model = Arc::new(MockModel::new());
        model.push_text("I could not find any epics in this document.");
        let request = ExtractionRequest::new("Epic 1", vec![], None).unwrap();

        let err = extractor(&model).extract(request).await.unwrap_err();

        assert!(matches!(err, ExtractionError::UnparseableResponse));
    }

    #[test]
    fn test_preview_helpers_respect_char_boundaries() {
        let text = "ééééé";
        assert_eq!(head(text, 2), "éé");
        assert_eq!(tail(text, 2), "éé");
        assert_eq!(head(text, 10), text);
        assert_eq!(tail(text, 10), text);
    }
}
