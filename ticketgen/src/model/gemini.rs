//! Google Gemini `generateContent` client.

use super::{ContentPart, GenerativeModel, ModelError};
use crate::config::AiConfig;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

impl<'a> From<&'a ContentPart> for RequestPart<'a> {
    fn from(part: &'a ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => RequestPart::Text { text },
            ContentPart::InlineData { mime_type, data } => RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type,
                    data: general_purpose::STANDARD.encode(data),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or the reason there is none.
    fn into_text(self) -> Result<String, ModelError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .map(|reason| format!("prompt blocked ({reason})"))
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(ModelError::EmptyResponse { reason });
        };

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = match candidate.finish_reason {
                Some(finish_reason) => format!("candidate finished with {finish_reason}"),
                None => "candidate had no text parts".to_string(),
            };
            return Err(ModelError::EmptyResponse { reason });
        }

        Ok(text)
    }
}

/// Makes sure a url has a trailing slash, so that `join` appends rather than replaces the last
/// path segment.
fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}

/// [`GenerativeModel`] backed by the Gemini REST API.
pub struct GeminiClient {
    client: Client,
    base_url: Url,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: Url, model: impl Into<String>, api_key: Option<String>, request_timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: ensure_slash(&base_url),
            model: model.into(),
            api_key,
        })
    }

    pub fn from_config(config: &AiConfig) -> anyhow::Result<Self> {
        Self::new(config.base_url.clone(), &config.model, config.api_key.clone(), config.request_timeout)
    }

    fn endpoint(&self) -> Result<Url, ModelError> {
        self.base_url
            .join(&format!("models/{}:generateContent", self.model))
            .map_err(|e| ModelError::Decode(format!("Failed to construct generateContent URL: {e}")))
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model, parts = parts.len()))]
    async fn generate(&self, parts: Vec<ContentPart>) -> Result<String, ModelError> {
        let api_key = self.api_key.as_deref().ok_or(ModelError::MissingApiKey)?;
        let url = self.endpoint()?;

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: parts.iter().map(RequestPart::from).collect(),
            }],
        };

        debug!("Sending generateContent request to {}", url);
        let response = self.client.post(url.clone()).header("x-goog-api-key", api_key).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("generateContent request failed");
            tracing::error!("Url was: {}", url);
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body_text = response.text().await?;
        let parsed = serde_json::from_str::<GenerateContentResponse>(&body_text).map_err(|e| {
            tracing::error!("Failed to parse generateContent response as JSON. Error: {}", e);
            tracing::debug!("Response body was: {}", body_text);
            ModelError::Decode(e.to_string())
        })?;

        parsed.into_text()
    }

    fn name(&self) -> &str {
        &self.model
    }
}
