//! Generative model abstraction.
//!
//! The extraction pipeline talks to the hosted model through the [`GenerativeModel`] trait: an
//! ordered list of [`ContentPart`]s goes in, the model's text completion comes out. The only
//! production implementation is [`gemini::GeminiClient`]; tests substitute a scripted model.

pub mod gemini;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use gemini::GeminiClient;

/// One piece of the content sent to the model, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Inline binary data with an explicit mime type (images).
    InlineData { mime_type: String, data: Bytes },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::InlineData { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no API key configured for the AI provider (set GOOGLE_API_KEY)")]
    MissingApiKey,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("AI provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("error decoding AI provider response: {0}")]
    Decode(String),

    #[error("AI provider returned no text: {reason}")]
    EmptyResponse { reason: String },
}

/// A hosted model that turns an ordered list of content parts into a text completion.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, parts: Vec<ContentPart>) -> Result<String, ModelError>;

    fn name(&self) -> &str;
}
