//! OpenAPI documentation, served as JSON at `/api-docs/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::api;
use crate::errors::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "JIRA Ticket Generator API",
        description = "Turns plain-text requirements and architecture diagrams into a JIRA-style epic, story and subtask hierarchy using a hosted generative model."
    ),
    paths(
        api::handlers::health::root,
        api::handlers::health::healthz,
        api::handlers::tickets::generate_tickets,
    ),
    components(schemas(
        api::models::health::HealthResponse,
        api::models::tickets::TicketGenerationResponse,
        api::models::tickets::TicketStats,
        ErrorResponse,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "tickets", description = "Ticket generation from uploaded requirements"),
    )
)]
pub struct ApiDoc;
