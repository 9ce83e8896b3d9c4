//! MCP (Model Context Protocol) HTTP transport
//!
//! POST carries one envelope or a batch; the connection's session travels in
//! the `Mcp-Session-Id` header. GET keeps the SSE endpoint handshake and
//! DELETE ends a session.

use super::dispatcher::Dispatcher;
use super::models::SESSION_HEADER;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

pub type SharedDispatcher = Arc<Dispatcher>;

/// Creates routes for MCP-related operations
pub fn routes() -> Router<SharedDispatcher> {
    Router::new()
        .route("/", post(handle_mcp).get(handle_mcp_sse))
        .route(
            "/mcp",
            post(handle_mcp)
                .get(handle_mcp_sse)
                .delete(handle_session_delete),
        ) // Standard endpoint
        .route("/mcp/", post(handle_mcp).get(handle_mcp_sse)) // Trailing slash safety
}

fn session_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Handle SSE (Server-Sent Events) handshake for GET requests
async fn handle_mcp_sse() -> impl IntoResponse {
    (
        [("content-type", "text/event-stream")],
        "event: endpoint\ndata: /mcp\n\n",
    )
}

/// Endpoint: POST /mcp
///
/// 200 for any protocol response (error objects included), 400 when the body
/// is not JSON, 204 when nothing needs answering.
async fn handle_mcp(
    State(dispatcher): State<SharedDispatcher>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session = session_header(&headers);
    let outcome = dispatcher.handle(session, &body).await;

    let mut response = match outcome.body {
        None => StatusCode::NO_CONTENT.into_response(),
        Some(body) => {
            let status = if outcome.parse_error {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::OK
            };
            (status, Json(body)).into_response()
        }
    };

    if let Some(id) = outcome.session_id {
        match HeaderValue::from_str(&id) {
            Ok(value) => {
                response.headers_mut().insert(SESSION_HEADER, value);
            }
            Err(e) => tracing::warn!(session = %id, error = %e, "Session id is not a valid header"),
        }
    }

    response
}

/// Endpoint: DELETE /mcp
/// Ends the session named by the `Mcp-Session-Id` header and drops its cart.
async fn handle_session_delete(
    State(dispatcher): State<SharedDispatcher>,
    headers: HeaderMap,
) -> StatusCode {
    match session_header(&headers) {
        None => StatusCode::BAD_REQUEST,
        Some(id) if dispatcher.end_session(id) => StatusCode::NO_CONTENT,
        Some(id) => {
            tracing::debug!(session = %id, "DELETE for unknown session");
            StatusCode::NOT_FOUND
        }
    }
}
