use crate::extraction::ExtractionError;
use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// Request body exceeds the configured upload limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Ticket extraction failed (missing requirements, model call, or unparseable output)
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Extraction(ExtractionError::MissingRequirements) => StatusCode::BAD_REQUEST,
            Error::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `detail` field of the response
    pub fn detail(&self) -> String {
        match self {
            Error::BadRequest { message } | Error::PayloadTooLarge { message } => message.clone(),
            Error::Extraction(ExtractionError::MissingRequirements) => ExtractionError::MissingRequirements.to_string(),
            Error::Extraction(err) => format!("AI analysis failed: {err}"),
            Error::Internal { .. } => "Internal server error".to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<MultipartError> for Error {
    fn from(err: MultipartError) -> Self {
        let message = format!("Failed to parse multipart data: {}", err.body_text());
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::PayloadTooLarge { message }
        } else {
            Error::BadRequest { message }
        }
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        Error::BadRequest {
            message: format!("Expected a multipart/form-data upload: {}", rejection.body_text()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Extraction(ExtractionError::Model(_)) => {
                tracing::error!("Error in AI analysis: {:#}", self);
            }
            Error::Internal { .. } | Error::Extraction(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::BadRequest { .. } | Error::PayloadTooLarge { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = ErrorResponse { detail: self.detail() };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::BadRequest { message: "x".into() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Extraction(ExtractionError::MissingRequirements).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Extraction(ExtractionError::UnparseableResponse).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Extraction(ExtractionError::Model(ModelError::MissingApiKey)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ai_failures_carry_underlying_message() {
        let err = Error::Extraction(ExtractionError::Model(ModelError::Status {
            status: 429,
            body: "Resource has been exhausted".into(),
        }));
        assert_eq!(err.detail(), "AI analysis failed: AI provider returned 429: Resource has been exhausted");

        let err = Error::Extraction(ExtractionError::UnparseableResponse);
        assert_eq!(err.detail(), "AI analysis failed: AI response was not valid JSON");
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let err = Error::Internal {
            operation: "read upload spool at /var/tmp/ticketgen-3".to_string(),
        };
        assert_eq!(err.detail(), "Internal server error");
    }
}
