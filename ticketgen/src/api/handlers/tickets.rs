use crate::api::models::tickets::{GenerateTicketsQuery, TicketGenerationResponse};
use crate::errors::{Error, ErrorResponse, Result};
use crate::extraction::{ExtractionRequest, ExtractionResult, Uploads};
use crate::{AppState, metrics};
use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartRejection},
};
use serde_json::Value;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

/// Form field carrying the uploaded files, repeated once per file.
const FILES_FIELD: &str = "files";
/// Form field (and query parameter) overriding the extraction prompt.
const CUSTOM_PROMPT_FIELD: &str = "customPrompt";

#[utoipa::path(
    post,
    path = "/api/generate-tickets",
    tag = "tickets",
    summary = "Generate tickets",
    description = "Upload requirement documents (`.txt`) and architecture diagrams (any other file) and receive an \
epic/story/subtask hierarchy extracted by the AI model.

Text files are concatenated in upload order. Every non-text file is sent to the model as a PNG image. \
Pass `customPrompt` as a form field or query parameter to replace the built-in instructions.",
    params(GenerateTicketsQuery),
    request_body(
        content_type = "multipart/form-data",
        description = "One or more `files` parts and an optional `customPrompt` text part"
    ),
    responses(
        (status = 200, description = "Requirements analyzed", body = TicketGenerationResponse),
        (status = 400, description = "No usable text requirements or a malformed upload", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the configured size limit", body = ErrorResponse),
        (status = 500, description = "The AI call failed or its answer could not be parsed", body = ErrorResponse),
    )
)]
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn generate_tickets(
    State(state): State<AppState>,
    Query(query): Query<GenerateTicketsQuery>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<TicketGenerationResponse>> {
    let outcome = generate(&state, query, multipart).await;

    metrics::record_generation(match &outcome {
        Ok(_) => "success",
        Err(e) if e.is_client_error() => "bad_request",
        Err(_) => "ai_error",
    });

    outcome.map(Json)
}

async fn generate(
    state: &AppState,
    query: GenerateTicketsQuery,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<TicketGenerationResponse> {
    let mut multipart = multipart?;
    let mut uploads = Uploads::new();
    let mut form_prompt: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            FILES_FIELD => {
                let filename = field.file_name().map(str::to_string);
                let content = field.bytes().await?;
                uploads
                    .push(filename.as_deref(), content)
                    .map_err(|e| Error::BadRequest { message: e.to_string() })?;
            }
            CUSTOM_PROMPT_FIELD => {
                form_prompt = Some(field.text().await?);
            }
            other => {
                debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    if uploads.is_empty() {
        return Err(Error::BadRequest {
            message: "No files uploaded. Please upload at least one file.".to_string(),
        });
    }

    let images_processed = uploads.images().len();
    info!(
        text_files = uploads.text_files(),
        images = images_processed,
        chars = uploads.requirements().len(),
        "Received upload"
    );

    // The form field wins; blank values count as absent
    let custom_prompt = form_prompt
        .filter(|prompt| !prompt.is_empty())
        .or(query.custom_prompt);

    let request = ExtractionRequest::from_uploads(uploads, custom_prompt)?;
    let result = state.extractor.extract(request).await?;

    log_epics(&result);

    Ok(TicketGenerationResponse::new(result, images_processed))
}

fn log_epics(result: &ExtractionResult) {
    if result.epics().is_none() {
        warn!("AI response has no epics array");
        return;
    }

    info!(epics = result.epic_count(), "Generated epics");
    for (i, epic) in result.epic_views().enumerate() {
        info!(
            number = %item_number(epic.epic_number()),
            category = epic.category().unwrap_or("-"),
            "[Epic {}] {} ({} stories)",
            i + 1,
            epic.summary().unwrap_or("No summary"),
            epic.story_count()
        );
        for story in epic.stories() {
            debug!(
                number = %item_number(story.story_number()),
                priority = story.priority().unwrap_or("-"),
                subtasks = story.subtasks().count(),
                "  story: {}",
                story.summary().unwrap_or("No summary")
            );
            for subtask in story.subtasks() {
                trace!(
                    number = %item_number(subtask.subtask_number()),
                    "    subtask: {}",
                    subtask.summary().unwrap_or("No summary")
                );
            }
        }
    }
}

/// Models number items as either strings or integers.
fn item_number(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(number)) => number.clone(),
        Some(Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    }
}
