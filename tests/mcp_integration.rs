//! Integration tests for the MCP (Model Context Protocol) server
//!
//! These tests drive the full axum router and verify:
//! - Server initialization, sessions and the SSE handshake
//! - Tool, resource and prompt discovery
//! - Tool execution against the commerce stores
//! - Batches, notifications and error handling
//! - The REST API sharing the same stores

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

// Import from the main crate
use agent_commerce_rust::commerce::AppState;
use agent_commerce_rust::mcp::Dispatcher;
use agent_commerce_rust::router::create_app_router;

/// Helper function to create a test app instance
fn create_test_app() -> axum::Router {
    let state = Arc::new(AppState::new());
    let dispatcher = Arc::new(Dispatcher::commerce(state.clone()).unwrap());
    create_app_router(state, dispatcher)
}

/// Sends a raw request and returns status, headers and the decoded body
/// (`Value::Null` when the body is empty).
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Body,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, headers, body)
}

/// Helper function to send a JSON-RPC message to /mcp
async fn send_mcp(
    app: &axum::Router,
    session: Option<&str>,
    message: Value,
) -> (StatusCode, HeaderMap, Value) {
    let headers: Vec<(&str, &str)> = session.map(|s| ("mcp-session-id", s)).into_iter().collect();
    send(app, "POST", "/mcp", &headers, Body::from(message.to_string())).await
}

/// Helper function to send a JSON-RPC request and get the response
async fn send_jsonrpc_request(
    app: &axum::Router,
    method: &str,
    params: Option<Value>,
    id: i32,
) -> (StatusCode, Value) {
    let mut request_body = json!({
        "jsonrpc": "2.0",
        "method": method,
        "id": id
    });
    if let Some(params) = params {
        request_body["params"] = params;
    }

    let (status, _, body) = send_mcp(app, None, request_body).await;
    (status, body)
}

/// Helper function to send a JSON request and get the response (REST API)
async fn send_rest_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    session: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = match body {
        Some(b) => Body::from(b.to_string()),
        None => Body::empty(),
    };
    let (status, _, body) = send(app, method, uri, &[("session-id", session)], body).await;
    (status, body)
}

fn initialize_params(version: &str) -> Value {
    json!({
        "protocolVersion": version,
        "capabilities": {},
        "clientInfo": { "name": "integration-test", "version": "1.0" }
    })
}

/// Runs `initialize` without a session header and returns the new session id
async fn initialize_session(app: &axum::Router) -> String {
    let message = json!({
        "jsonrpc": "2.0",
        "method": "initialize",
        "params": initialize_params("2025-06-18"),
        "id": 0
    });
    let (_, headers, _) = send_mcp(app, None, message).await;
    headers
        .get("mcp-session-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

fn tool_call(name: &str, arguments: Value, id: i64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments },
        "id": id
    })
}

fn shipping_address() -> Value {
    json!({
        "name": "John Doe",
        "street": "123 Main St",
        "city": "New York",
        "state": "NY",
        "zip": "10001",
        "country": "US"
    })
}

// =============================================================================
// Handshake and sessions
// =============================================================================

#[tokio::test]
async fn test_mcp_sse_endpoint() {
    let app = create_test_app();

    let (status, headers, _) = send(&app, "GET", "/mcp", &[], Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "text/event-stream");

    let request = Request::builder()
        .method("GET")
        .uri("/mcp")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body_bytes.to_vec()).unwrap();

    assert!(body_str.contains("event: endpoint"));
    assert!(body_str.contains("data: /mcp"));
}

#[tokio::test]
async fn test_mcp_initialize() {
    let app = create_test_app();

    let (status, body) =
        send_jsonrpc_request(&app, "initialize", Some(initialize_params("2024-11-05")), 1).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], 1);

    let result = &body["result"];
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "agent-commerce-rust");
    assert_eq!(
        result["capabilities"],
        json!({ "tools": {}, "resources": {}, "prompts": {} })
    );
    assert!(result["instructions"].is_string());
}

#[tokio::test]
async fn test_mcp_initialize_returns_session_header() {
    let app = create_test_app();

    let message = json!({
        "jsonrpc": "2.0",
        "method": "initialize",
        "params": initialize_params("2025-06-18"),
        "id": 1
    });
    let (status, headers, body) = send_mcp(&app, None, message).await;

    assert_eq!(status, StatusCode::OK);
    let session = headers.get("mcp-session-id").unwrap().to_str().unwrap();
    assert_eq!(body["result"]["sessionId"], session);
}

#[tokio::test]
async fn test_mcp_initialize_unsupported_version_gets_latest() {
    let app = create_test_app();

    let (_, body) =
        send_jsonrpc_request(&app, "initialize", Some(initialize_params("1999-01-01")), 1).await;
    assert_eq!(body["result"]["protocolVersion"], "2025-06-18");
}

#[tokio::test]
async fn test_mcp_double_initialize_is_invalid_request() {
    let app = create_test_app();

    let init = |id: i64| {
        json!({
            "jsonrpc": "2.0",
            "method": "initialize",
            "params": initialize_params("2024-11-05"),
            "id": id
        })
    };

    let (_, headers, _) = send_mcp(&app, None, init(1)).await;
    let session = headers
        .get("mcp-session-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let (status, _, body) = send_mcp(&app, Some(&session), init(2)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);
    assert_eq!(body["error"]["code"], -32600);
}

#[tokio::test]
async fn test_mcp_delete_session() {
    let app = create_test_app();

    let message = json!({
        "jsonrpc": "2.0",
        "method": "initialize",
        "params": initialize_params("2024-11-05"),
        "id": 1
    });
    let (_, headers, _) = send_mcp(&app, None, message).await;
    let session = headers
        .get("mcp-session-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let headers = [("mcp-session-id", session.as_str())];
    send_mcp(
        &app,
        Some(&session),
        tool_call("add_to_cart", json!({ "productId": "prod-001", "quantity": 2 }), 2),
    )
    .await;
    let (_, body) = send_rest_request(&app, "GET", "/api/cart", &session, None).await;
    assert_eq!(body["cart"]["itemCount"], 2);

    let (status, _, _) = send(&app, "DELETE", "/mcp", &headers, Body::empty()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The session's cart went with it.
    let (_, body) = send_rest_request(&app, "GET", "/api/cart", &session, None).await;
    assert_eq!(body["cart"]["itemCount"], 0);
    let (_, _, body) = send_mcp(&app, Some(&session), tool_call("get_cart", json!({}), 3)).await;
    assert_eq!(body["result"]["structuredContent"]["cart"]["itemCount"], 0);

    let (status, _, _) = send(&app, "DELETE", "/mcp", &headers, Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, "DELETE", "/mcp", &[], Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Discovery
// =============================================================================

#[tokio::test]
async fn test_mcp_tools_list() {
    let app = create_test_app();

    let (status, body) = send_jsonrpc_request(&app, "tools/list", None, 2).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);

    let tools = body["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    for name in [
        "search_products",
        "get_product_details",
        "add_to_cart",
        "get_cart",
        "checkout",
    ] {
        assert!(names.contains(&name), "missing tool {name}");
    }

    let search = tools.iter().find(|t| t["name"] == "search_products").unwrap();
    assert_eq!(search["inputSchema"]["type"], "object");
    assert!(search["inputSchema"]["properties"]["query"].is_object());
    assert_eq!(search["inputSchema"]["required"], json!(["query"]));

    // Listing twice gives the same answer.
    let (_, again) = send_jsonrpc_request(&app, "tools/list", None, 2).await;
    assert_eq!(body, again);
}

#[tokio::test]
async fn test_mcp_resources_list_and_read() {
    let app = create_test_app();

    let (status, body) = send_jsonrpc_request(&app, "resources/list", None, 3).await;
    assert_eq!(status, StatusCode::OK);
    let resources = body["result"]["resources"].as_array().unwrap();
    assert!(resources.iter().any(|r| r["uri"] == "products://catalog"));
    assert!(resources.iter().all(|r| r["mimeType"] == "application/json"));

    let (_, body) = send_jsonrpc_request(&app, "resources/templates/list", None, 4).await;
    let templates = body["result"]["resourceTemplates"].as_array().unwrap();
    assert!(templates
        .iter()
        .any(|t| t["uriTemplate"] == "orders://{orderId}"));

    let (status, body) = send_jsonrpc_request(
        &app,
        "resources/read",
        Some(json!({ "uri": "products://prod-001" })),
        5,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let content = &body["result"]["contents"][0];
    assert_eq!(content["uri"], "products://prod-001");
    let product: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(product["name"], "Wireless Bluetooth Headphones");

    let (status, body) = send_jsonrpc_request(
        &app,
        "resources/read",
        Some(json!({ "uri": "weather://today" })),
        6,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32802);
}

#[tokio::test]
async fn test_mcp_prompts() {
    let app = create_test_app();

    let (_, body) = send_jsonrpc_request(&app, "prompts/list", None, 1).await;
    let prompts = body["result"]["prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 3);

    let (status, body) = send_jsonrpc_request(
        &app,
        "prompts/get",
        Some(json!({
            "name": "shopping_assistant",
            "arguments": { "userQuery": "I need a laptop under $1000" }
        })),
        2,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let message = &body["result"]["messages"][0];
    assert_eq!(message["role"], "user");
    assert!(message["content"]["text"]
        .as_str()
        .unwrap()
        .contains("I need a laptop under $1000"));

    let (_, body) = send_jsonrpc_request(
        &app,
        "prompts/get",
        Some(json!({ "name": "order_support", "arguments": {} })),
        3,
    )
    .await;
    assert_eq!(body["error"]["code"], -32602);
}

// =============================================================================
// Tool execution
// =============================================================================

#[tokio::test]
async fn test_mcp_search_products() {
    let app = create_test_app();

    let (status, _, body) = send_mcp(
        &app,
        None,
        tool_call("search_products", json!({ "query": "laptop", "limit": 5 }), 1),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_eq!(result["content"][0]["type"], "text");
    let products = result["structuredContent"]["products"].as_array().unwrap();
    assert!(!products.is_empty());
    assert!(products.len() <= 5);
}

#[tokio::test]
async fn test_mcp_missing_required_argument() {
    let app = create_test_app();

    let (status, _, body) =
        send_mcp(&app, None, tool_call("search_products", json!({ "limit": 5 }), 1)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn test_mcp_add_to_cart_out_of_stock() {
    let app = create_test_app();

    let (status, _, body) = send_mcp(
        &app,
        None,
        tool_call(
            "add_to_cart",
            json!({ "productId": "out-of-stock-prod", "variantId": "v", "quantity": 1 }),
            1,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    let payload = &body["result"]["structuredContent"];
    assert_eq!(payload["success"], false);
    assert!(payload["message"].as_str().unwrap().contains("stock"));
}

#[tokio::test]
async fn test_mcp_unknown_product_is_found_false() {
    let app = create_test_app();

    let (_, _, body) = send_mcp(
        &app,
        None,
        tool_call("get_product_details", json!({ "productId": "prod-999" }), 1),
    )
    .await;

    assert!(body.get("error").is_none());
    assert_eq!(body["result"]["structuredContent"]["found"], false);
}

#[tokio::test]
async fn test_mcp_cart_round_trip() {
    let app = create_test_app();
    let session_id = initialize_session(&app).await;
    let session = Some(session_id.as_str());

    let (_, _, added) = send_mcp(
        &app,
        session,
        tool_call(
            "add_to_cart",
            json!({ "productId": "prod-001", "variantId": "var-001", "quantity": 1 }),
            1,
        ),
    )
    .await;
    assert!(added["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("added"));

    send_mcp(
        &app,
        session,
        tool_call(
            "add_to_cart",
            json!({ "productId": "prod-002", "variantId": "var-003", "quantity": 2 }),
            2,
        ),
    )
    .await;

    let (_, _, body) = send_mcp(&app, session, tool_call("get_cart", json!({}), 3)).await;
    let cart = &body["result"]["structuredContent"]["cart"];
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart["items"][1]["quantity"], 2);
    assert_eq!(cart["total"], 179.97);

    // Another session sees its own empty cart.
    let other_id = initialize_session(&app).await;
    let (_, _, other) = send_mcp(&app, Some(&other_id), tool_call("get_cart", json!({}), 4)).await;
    assert_eq!(other["result"]["structuredContent"]["cart"]["itemCount"], 0);
}

#[tokio::test]
async fn test_mcp_checkout_flow() {
    let app = create_test_app();
    let session_id = initialize_session(&app).await;
    let session = Some(session_id.as_str());

    send_mcp(
        &app,
        session,
        tool_call("add_to_cart", json!({ "productId": "prod-004", "quantity": 2 }), 1),
    )
    .await;

    let (status, _, body) = send_mcp(
        &app,
        session,
        tool_call("checkout", json!({ "shippingAddress": shipping_address() }), 2),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let result = &body["result"];
    assert!(result["content"][0]["text"].as_str().unwrap().contains("order"));
    let payload = &result["structuredContent"];
    assert_eq!(payload["status"], "confirmed");
    assert_eq!(payload["total"], 75.26);
    let order_id = payload["orderId"].as_str().unwrap().to_string();

    let (_, _, body) = send_mcp(
        &app,
        session,
        tool_call("get_order_status", json!({ "orderId": order_id }), 3),
    )
    .await;
    assert_eq!(body["result"]["structuredContent"]["order"]["status"], "confirmed");

    let (_, _, body) = send_mcp(&app, session, tool_call("get_cart", json!({}), 4)).await;
    assert_eq!(body["result"]["structuredContent"]["cart"]["items"], json!([]));
}

#[tokio::test]
async fn test_mcp_update_cart_item_respects_shared_stock() {
    let app = create_test_app();
    let session_id = initialize_session(&app).await;
    let session = Some(session_id.as_str());

    // prod-003 has 15 units in stock across both variants.
    for (variant, quantity, id) in [("var-005", 10, 1), ("var-006", 1, 2)] {
        send_mcp(
            &app,
            session,
            tool_call(
                "add_to_cart",
                json!({ "productId": "prod-003", "variantId": variant, "quantity": quantity }),
                id,
            ),
        )
        .await;
    }

    let (status, _, body) = send_mcp(
        &app,
        session,
        tool_call(
            "update_cart_item",
            json!({ "productId": "prod-003", "variantId": "var-006", "quantity": 15 }),
            3,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let payload = &body["result"]["structuredContent"];
    assert_eq!(payload["success"], false);
    assert!(payload["message"].as_str().unwrap().contains("stock"));

    let (_, _, body) = send_mcp(
        &app,
        session,
        tool_call(
            "add_to_cart",
            json!({ "productId": "prod-003", "variantId": "var-006", "quantity": 5 }),
            4,
        ),
    )
    .await;
    assert_eq!(body["result"]["structuredContent"]["success"], false);

    let (_, _, body) = send_mcp(&app, session, tool_call("get_cart", json!({}), 5)).await;
    assert_eq!(body["result"]["structuredContent"]["cart"]["itemCount"], 11);
}

#[tokio::test]
async fn test_mcp_unknown_session_uses_default_cart() {
    let app = create_test_app();

    send_mcp(
        &app,
        Some("made-up-session"),
        tool_call("add_to_cart", json!({ "productId": "prod-004", "quantity": 1 }), 1),
    )
    .await;

    let (_, body) = send_rest_request(&app, "GET", "/api/cart", "made-up-session", None).await;
    assert_eq!(body["cart"]["itemCount"], 0);
    let (_, body) = send_rest_request(&app, "GET", "/api/cart", "default", None).await;
    assert_eq!(body["cart"]["itemCount"], 1);
}

#[tokio::test]
async fn test_mcp_recommendations_based_on_product() {
    let app = create_test_app();

    let (_, _, body) = send_mcp(
        &app,
        None,
        tool_call("get_recommendations", json!({ "basedOn": "prod-001" }), 1),
    )
    .await;

    let payload = &body["result"]["structuredContent"];
    assert_eq!(payload["basedOn"], "prod-001");
    let recs = payload["recommendations"].as_array().unwrap();
    assert!(recs.iter().all(|r| r["id"] != "prod-001"));
    assert_eq!(recs[0]["category"], "Electronics");
}

#[tokio::test]
async fn test_mcp_checkout_incomplete_address() {
    let app = create_test_app();

    let (_, _, body) = send_mcp(
        &app,
        None,
        tool_call(
            "checkout",
            json!({ "shippingAddress": { "name": "John Doe", "street": "123 Main St" } }),
            1,
        ),
    )
    .await;
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn test_mcp_checkout_empty_cart() {
    let app = create_test_app();

    let (status, _, body) = send_mcp(
        &app,
        Some("nothing-here"),
        tool_call("checkout", json!({ "shippingAddress": shipping_address() }), 1),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let payload = &body["result"]["structuredContent"];
    assert_eq!(payload["success"], false);
    assert_eq!(payload["reason"], "empty_cart");
}

// =============================================================================
// Batches, notifications and errors
// =============================================================================

#[tokio::test]
async fn test_mcp_batch_skips_notifications() {
    let app = create_test_app();

    let batch = json!([
        { "jsonrpc": "2.0", "method": "tools/list", "id": 1 },
        { "jsonrpc": "2.0", "method": "ping" }
    ]);
    let (status, _, body) = send_mcp(&app, None, batch).await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], 1);
    assert!(entries[0]["result"]["tools"].is_array());
}

#[tokio::test]
async fn test_mcp_notifications_have_no_content() {
    let app = create_test_app();

    let (status, _, body) =
        send_mcp(&app, None, json!({ "jsonrpc": "2.0", "method": "ping" })).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let batch = json!([
        { "jsonrpc": "2.0", "method": "notifications/initialized" },
        { "jsonrpc": "2.0", "method": "notifications/cancelled", "params": { "requestId": 4 } }
    ]);
    let (status, _, _) = send_mcp(&app, None, batch).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_mcp_empty_batch_is_invalid_request() {
    let app = create_test_app();

    let (status, _, body) = send_mcp(&app, None, json!([])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_mcp_unknown_method() {
    let app = create_test_app();

    let (status, body) = send_jsonrpc_request(&app, "unknown/method", None, 11).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 11);
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn test_mcp_invalid_json() {
    let app = create_test_app();

    let (status, _, body) = send(
        &app,
        "POST",
        "/mcp",
        &[],
        Body::from("invalid json {{{"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_mcp_wrong_protocol_tag() {
    let app = create_test_app();

    let (status, _, body) = send_mcp(
        &app,
        None,
        json!({ "jsonrpc": "1.0", "method": "tools/list", "id": 5 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["id"], 5);
}

#[tokio::test]
async fn test_mcp_tool_call_unknown_tool() {
    let app = create_test_app();

    let (status, _, body) =
        send_mcp(&app, None, tool_call("bogus_tool", json!({}), 12)).await;

    assert_eq!(status, StatusCode::OK);
    let error = &body["error"];
    assert_eq!(error["code"], -32803);
    assert_ne!(error["code"], -32601);
    assert!(error["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_mcp_root_endpoint() {
    let app = create_test_app();

    let (status, _, body) = send(
        &app,
        "POST",
        "/",
        &[],
        Body::from(json!({ "jsonrpc": "2.0", "method": "ping", "id": 1 }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!({}));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = create_test_app();

    let (status, _, _) = send(&app, "GET", "/nope", &[], Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// REST API
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = create_test_app();

    let (status, body) = send_rest_request(&app, "GET", "/health", "default", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_rest_products() {
    let app = create_test_app();

    let (status, body) =
        send_rest_request(&app, "GET", "/api/products?category=Electronics", "s", None).await;
    assert_eq!(status, StatusCode::OK);
    let products = body["products"].as_array().unwrap();
    assert!(products.iter().all(|p| p["category"] == "Electronics"));

    let (status, body) = send_rest_request(&app, "GET", "/api/products/prod-002", "s", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["id"], "prod-002");

    let (status, body) = send_rest_request(&app, "GET", "/api/products/missing", "s", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "product_not_found");

    let (status, body) = send_rest_request(
        &app,
        "POST",
        "/api/products/search",
        "s",
        Some(json!({ "query": "", "filters": { "sortBy": "price", "limit": 2 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    assert_eq!(body["products"][0]["id"], "prod-004");
}

#[tokio::test]
async fn test_rest_cart_and_orders() {
    let app = create_test_app();
    let session = "rest-shopper";

    let (status, body) = send_rest_request(
        &app,
        "POST",
        "/api/cart/items",
        session,
        Some(json!({ "productId": "prod-001", "variantId": "var-002", "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["total"], 169.98);

    let (status, body) = send_rest_request(
        &app,
        "PUT",
        "/api/cart/items/prod-001/var-002",
        session,
        Some(json!({ "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["itemCount"], 1);

    let (status, body) = send_rest_request(
        &app,
        "POST",
        "/api/cart/items",
        session,
        Some(json!({ "productId": "out-of-stock-prod", "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["reason"], "out_of_stock");

    let (status, body) = send_rest_request(
        &app,
        "POST",
        "/api/orders",
        session,
        Some(json!({ "shippingAddress": shipping_address() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "pending");
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let (_, body) = send_rest_request(&app, "GET", "/api/cart", session, None).await;
    assert_eq!(body["cart"]["items"], json!([]));

    let pay = format!("/api/orders/{order_id}/pay");
    let (status, body) = send_rest_request(&app, "POST", &pay, session, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "confirmed");

    let cancel = format!("/api/orders/{order_id}/cancel");
    let (status, body) = send_rest_request(&app, "POST", &cancel, session, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["reason"], "not_cancellable");

    let (_, body) = send_rest_request(&app, "GET", "/api/orders", session, None).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rest_and_mcp_share_stores() {
    let app = create_test_app();
    let session = initialize_session(&app).await;

    send_mcp(
        &app,
        Some(&session),
        tool_call("add_to_cart", json!({ "productId": "prod-005", "quantity": 1 }), 1),
    )
    .await;

    let (_, body) = send_rest_request(&app, "GET", "/api/cart", &session, None).await;
    assert_eq!(body["cart"]["items"][0]["productId"], "prod-005");
}

#[tokio::test]
async fn test_rest_suppliers() {
    let app = create_test_app();

    let (status, body) = send_rest_request(&app, "GET", "/api/suppliers", "s", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suppliers"].as_array().unwrap().len(), 2);

    let (status, body) = send_rest_request(&app, "GET", "/api/suppliers/spocket", "s", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["supplier"]["name"], "Spocket");

    let (status, body) = send_rest_request(&app, "GET", "/api/suppliers/acme", "s", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "supplier_not_found");

    let (status, body) =
        send_rest_request(&app, "POST", "/api/suppliers/aliexpress/sync", "s", None).await;
    assert_eq!(status, StatusCode::OK);
    let sync_id = body["syncId"].as_str().unwrap().to_string();
    assert!(sync_id.starts_with("SYNC-"));

    let uri = format!("/api/suppliers/sync/{sync_id}");
    let (status, body) = send_rest_request(&app, "GET", &uri, "s", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["progress"], 100);
    assert_eq!(body["supplierId"], "aliexpress");

    let (status, _) =
        send_rest_request(&app, "GET", "/api/suppliers/sync/SYNC-MISSING", "s", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_rest_request(&app, "POST", "/api/suppliers/acme/sync", "s", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
