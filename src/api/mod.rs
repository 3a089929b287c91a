//! REST API server module
//!
//! Exposes the task lifecycle over HTTP: create a batch, poll its status, drain
//! completed-file notifications, stream individual files, and clean up.

use crate::{Config, MediaQueue, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Path the Swagger UI loads its document from
const SWAGGER_SPEC_PATH: &str = "/api-docs/openapi.json";

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Task Lifecycle
/// - `POST /queue/create` - Create a batch task
/// - `GET /queue/status/:task_id` - Task status snapshot
/// - `GET /queue/next/:task_id` - Drain the next completed-file notification
/// - `GET /queue/download/:task_id/:index` - Stream a completed item's file
/// - `DELETE /queue/:task_id` - Remove a task and its files
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream
pub fn create_router(queue: MediaQueue, config: Arc<Config>) -> Router {
    let state = AppState::new(queue, config.clone());

    let router = Router::new()
        // Task Lifecycle
        .route("/queue/create", post(routes::create_task))
        .route("/queue/status/:task_id", get(routes::task_status))
        .route("/queue/next/:task_id", get(routes::next_file))
        .route("/queue/download/:task_id/:index", get(routes::download_file))
        .route("/queue/:task_id", delete(routes::delete_task))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url(SWAGGER_SPEC_PATH, ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    let router = if config.server.api.api_key.is_some() {
        router.layer(middleware::from_fn_with_state(
            config.server.api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        router
    };

    let router = if config.server.api.cors_enabled {
        router.layer(build_cors_layer(&config.server.api.cors_origins))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Build a CORS layer based on configured origins (`*` allows any origin)
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address
///
/// Runs until the server fails. Use [`serve_with_shutdown`] to stop on a signal.
///
/// # Example
///
/// ```no_run
/// use media_dl::{MediaQueue, Config};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let queue = MediaQueue::new((*config).clone()).await?;
///
/// media_dl::api::start_api_server(queue, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(queue: MediaQueue, config: Arc<Config>) -> Result<()> {
    serve_with_shutdown(queue, config, std::future::pending()).await
}

/// Serve the API until `shutdown` resolves, then stop accepting connections
pub async fn serve_with_shutdown<F>(queue: MediaQueue, config: Arc<Config>, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(queue, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
