//! OpenAPI documentation and schema generation
//!
//! The document is generated at compile time by utoipa and served at `/openapi.json`.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.1.0",
        description = "Sequential batch media download queue: create a task from a list of URLs, poll its progress, and retrieve each file as it completes"
    ),
    servers(
        (url = "http://localhost:6789", description = "Local development server")
    ),
    paths(
        // Task Lifecycle
        crate::api::routes::create_task,
        crate::api::routes::task_status,
        crate::api::routes::next_file,
        crate::api::routes::download_file,
        crate::api::routes::delete_task,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        crate::types::TaskId,
        crate::types::TaskStatus,
        crate::types::ItemStatus,
        crate::types::TaskSnapshot,
        crate::types::ItemSnapshot,
        crate::types::Event,

        crate::api::routes::CreateTaskRequest,
        crate::api::routes::CreateTaskResponse,
        crate::api::routes::NextFileResponse,
        crate::api::routes::SuccessResponse,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "queue", description = "Task lifecycle - Create batches, poll status, drain and download completed files, clean up"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the `X-Api-Key` header scheme to the document
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}
