//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/` except `/health`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Workspaces
        .route("/workspaces", post(handlers::workspace::open_workspace))
        .route(
            "/workspaces/{user}",
            axum::routing::delete(handlers::workspace::close_workspace),
        )
        // Profile
        .route(
            "/workspaces/{user}/profile",
            get(handlers::profile::get_profile).patch(handlers::profile::update_profile),
        )
        // Tasks
        .route(
            "/workspaces/{user}/tasks",
            get(handlers::task::list_tasks).post(handlers::task::create_task),
        )
        .route(
            "/workspaces/{user}/tasks/{id}",
            axum::routing::patch(handlers::task::rename_task).delete(handlers::task::delete_task),
        )
        .route(
            "/workspaces/{user}/tasks/{id}/toggle",
            post(handlers::task::toggle_task),
        )
        // Chat
        .route(
            "/workspaces/{user}/chat",
            get(handlers::chat::get_history).post(handlers::chat::send_message),
        )
        // Assistant
        .route(
            "/workspaces/{user}/plan",
            post(handlers::assistant::generate_plan),
        )
        .route(
            "/workspaces/{user}/insight",
            post(handlers::assistant::generate_insight),
        )
        .route(
            "/workspaces/{user}/dashboard",
            get(handlers::assistant::get_dashboard),
        )
        // Safety
        .route(
            "/workspaces/{user}/sos",
            post(handlers::sos::activate_sos).delete(handlers::sos::dismiss_sos),
        )
        // Notices
        .route(
            "/workspaces/{user}/notices",
            get(handlers::notice::list_notices),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
