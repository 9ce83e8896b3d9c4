//! Routing module for the commerce MCP server

use crate::commerce::SharedState;
use crate::mcp::models::{LATEST_PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};
use crate::mcp::SharedDispatcher;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState, dispatcher: SharedDispatcher) -> Router {
    // Middleware: Log requests
    let log_layer = axum::middleware::from_fn(|req: Request<Body>, next: Next| async move {
        let method = req.method().clone();
        let uri = req.uri().clone();
        tracing::debug!(%method, %uri, "HTTP request");

        let res = next.run(req).await;
        if !res.status().is_success() {
            tracing::warn!(%method, %uri, status = %res.status(), "HTTP request not successful");
        }
        res
    });

    // Middleware: CORS (Permissive for local dev)
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    let protocol = crate::mcp::routes()
        .route("/health", get(health))
        .with_state(dispatcher);
    let rest = crate::commerce::routes().with_state(state);

    // Routes
    Router::new()
        .merge(protocol)
        .merge(rest)
        .layer(log_layer)
        .layer(cors_layer)
}

/// Endpoint: GET /health
async fn health(State(dispatcher): State<SharedDispatcher>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": SERVER_NAME,
        "version": SERVER_VERSION,
        "protocolVersion": LATEST_PROTOCOL_VERSION,
        "sessions": dispatcher.sessions().len(),
    }))
}
