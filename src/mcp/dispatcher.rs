//! Dispatcher
//!
//! Routes validated envelopes to method handlers and assembles the response
//! body. Transport-agnostic: callers hand in raw bytes plus the session id
//! their connection carries, and get back zero or one JSON value.
//!
//! A call moves through `Received → Validated → Routed → HandlerExecuting`
//! and ends as a success or error envelope. Notifications run the same way
//! but their outcome is dropped.

use super::error::{McpError, McpResult, RegistryError};
use super::helpers::{params_object, require_str, rpc_error, rpc_success};
use super::models::{
    Implementation, InitializeParams, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ServerCapabilities, ToolCallResult, SERVER_NAME, SERVER_VERSION,
};
use super::registry::SchemaRegistry;
use super::schema::{arguments_object, check_arguments};
use super::session::SessionManager;
use super::tools::ToolContext;
use super::validator::{self, Checked, Incoming};
use super::{prompts, resources};
use crate::commerce::helpers::DEFAULT_SESSION_KEY;
use crate::commerce::SharedState;
use futures_util::future::join_all;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;

const INSTRUCTIONS: &str = "Commerce assistant server. Use search_products and \
get_product_details to browse, add_to_cart and get_cart to build a cart, and \
checkout with a full shipping address to place an order.";

/// Outcome of one inbound message
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dispatched {
    /// Response to send back; `None` means "no content"
    pub body: Option<Value>,
    /// Session created by an `initialize` in this message
    pub session_id: Option<String>,
    /// The input was not valid JSON
    pub parse_error: bool,
}

/// Method handler a request routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Initialize,
    Ping,
    ToolsList,
    ToolsCall,
    ResourcesList,
    ResourceTemplatesList,
    ResourcesRead,
    PromptsList,
    PromptsGet,
    Initialized,
    Cancelled,
    Unknown,
}

impl Route {
    fn from_method(method: &str) -> Self {
        match method {
            "initialize" => Route::Initialize,
            "ping" => Route::Ping,
            "tools/list" => Route::ToolsList,
            "tools/call" => Route::ToolsCall,
            "resources/list" => Route::ResourcesList,
            "resources/templates/list" => Route::ResourceTemplatesList,
            "resources/read" => Route::ResourcesRead,
            "prompts/list" => Route::PromptsList,
            "prompts/get" => Route::PromptsGet,
            "notifications/initialized" => Route::Initialized,
            "notifications/cancelled" => Route::Cancelled,
            _ => Route::Unknown,
        }
    }
}

/// Successful handler output
struct Handled {
    result: Value,
    created_session: Option<String>,
}

impl Handled {
    fn result(result: Value) -> Self {
        Self {
            result,
            created_session: None,
        }
    }
}

/// Protocol entry point shared by every transport
pub struct Dispatcher {
    registry: SchemaRegistry,
    sessions: SessionManager,
    state: SharedState,
}

impl Dispatcher {
    /// Dispatcher over `registry` with an empty session table.
    pub fn new(state: SharedState, registry: SchemaRegistry) -> Self {
        Self {
            registry,
            sessions: SessionManager::new(),
            state,
        }
    }

    /// Dispatcher over the full commerce registry.
    pub fn commerce(state: SharedState) -> Result<Self, RegistryError> {
        Ok(Self::new(state, SchemaRegistry::commerce()?))
    }

    /// Registered tools, resources and prompts.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Live sessions.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Ends a session and drops the cart keyed by it. Returns false when the
    /// session did not exist.
    pub fn end_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.destroy(session_id);
        if removed {
            self.state.carts.clear(session_id);
        }
        removed
    }

    /// Ends every session idle for longer than `max_idle`, dropping their
    /// carts. Returns how many were ended.
    pub fn evict_idle_sessions(&self, max_idle: chrono::Duration) -> usize {
        let evicted = self.sessions.evict_idle(max_idle, chrono::Utc::now());
        for id in &evicted {
            self.state.carts.clear(id);
        }
        evicted.len()
    }

    /// Cart key for a call: the caller's session when it is live, otherwise
    /// the shared default key.
    fn session_key<'a>(&self, session_id: Option<&'a str>) -> &'a str {
        match session_id {
            Some(id) if self.sessions.touch(id) => id,
            Some(id) => {
                tracing::debug!(session = %id, "Unknown session, using default cart");
                DEFAULT_SESSION_KEY
            }
            None => DEFAULT_SESSION_KEY,
        }
    }

    /// Handles one inbound message: a single envelope or a batch.
    pub async fn handle(&self, session_id: Option<&str>, raw: &[u8]) -> Dispatched {
        match validator::parse(raw) {
            Ok(value) => self.handle_value(session_id, value).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected undecodable message");
                Dispatched {
                    body: Some(encode(&rpc_error(None, &e))),
                    session_id: None,
                    parse_error: true,
                }
            }
        }
    }

    /// Same as [`Self::handle`] for input that is already decoded.
    pub async fn handle_value(&self, session_id: Option<&str>, value: Value) -> Dispatched {
        let incoming = match validator::classify(value) {
            Ok(incoming) => incoming,
            Err(e) => {
                return Dispatched {
                    body: Some(encode(&rpc_error(None, &e))),
                    ..Default::default()
                }
            }
        };

        match incoming {
            Incoming::Single(checked) => {
                let (response, created) = self.handle_checked(session_id, checked).await;
                Dispatched {
                    body: response.map(|r| encode(&r)),
                    session_id: created,
                    parse_error: false,
                }
            }
            Incoming::Batch(items) => {
                tracing::debug!(size = items.len(), "Dispatching batch");
                let results = join_all(
                    items
                        .into_iter()
                        .map(|checked| self.handle_checked(session_id, checked)),
                )
                .await;

                let mut created_session = None;
                let mut responses = Vec::new();
                for (response, created) in results {
                    responses.extend(response);
                    created_session = created_session.or(created);
                }

                Dispatched {
                    body: (!responses.is_empty()).then(|| encode(&responses)),
                    session_id: created_session,
                    parse_error: false,
                }
            }
        }
    }

    async fn handle_checked(
        &self,
        session_id: Option<&str>,
        checked: Checked,
    ) -> (Option<JsonRpcResponse>, Option<String>) {
        match checked {
            Ok(request) => self.handle_request(session_id, request).await,
            Err(rejected) => {
                tracing::debug!(error = %rejected.error, "Invalid envelope");
                (Some(rpc_error(rejected.id, &rejected.error)), None)
            }
        }
    }

    /// Runs one validated request. Notifications never yield a response.
    pub async fn handle_request(
        &self,
        session_id: Option<&str>,
        request: JsonRpcRequest,
    ) -> (Option<JsonRpcResponse>, Option<String>) {
        let route = Route::from_method(&request.method);

        if request.is_notification() {
            self.notify(session_id, route, &request).await;
            return (None, None);
        }

        tracing::debug!(method = %request.method, id = ?request.id, "Dispatching request");

        match self.execute(session_id, route, &request).await {
            Ok(handled) => (
                Some(rpc_success(request.id, handled.result)),
                handled.created_session,
            ),
            Err(e) => {
                match &e {
                    McpError::InternalError(_) => {
                        tracing::error!(method = %request.method, error = %e, "Request failed")
                    }
                    _ => tracing::debug!(method = %request.method, error = %e, "Request rejected"),
                }
                (Some(rpc_error(request.id, &e)), None)
            }
        }
    }

    async fn notify(&self, session_id: Option<&str>, route: Route, request: &JsonRpcRequest) {
        match route {
            Route::Initialized => {
                let known = session_id.is_some_and(|id| self.sessions.mark_initialized(id));
                if !known {
                    tracing::debug!("initialized notification for unknown session");
                }
            }
            Route::Cancelled => {
                let target = request
                    .params
                    .as_ref()
                    .and_then(|p| p.get("requestId"))
                    .cloned()
                    .unwrap_or(Value::Null);
                tracing::info!(request = %target, "Client cancelled a request; nothing to cancel");
            }
            Route::Unknown => {
                tracing::debug!(method = %request.method, "Ignoring unknown notification");
            }
            _ => {
                if let Err(e) = self.execute(session_id, route, request).await {
                    tracing::debug!(method = %request.method, error = %e, "Notification failed silently");
                }
            }
        }
    }

    async fn execute(
        &self,
        session_id: Option<&str>,
        route: Route,
        request: &JsonRpcRequest,
    ) -> McpResult<Handled> {
        let params = request.params.as_ref();
        match route {
            Route::Initialize => self.initialize(session_id, params),
            Route::Ping | Route::Initialized | Route::Cancelled => Ok(Handled::result(json!({}))),
            Route::ToolsList => Ok(Handled::result(json!({ "tools": self.registry.list_tools() }))),
            Route::ToolsCall => self
                .call_tool(self.session_key(session_id), params)
                .await
                .map(Handled::result),
            Route::ResourcesList => Ok(Handled::result(
                json!({ "resources": self.registry.list_resources() }),
            )),
            Route::ResourceTemplatesList => Ok(Handled::result(
                json!({ "resourceTemplates": self.registry.list_templates() }),
            )),
            Route::ResourcesRead => {
                let params = params_object(params)?;
                let uri = require_str(&params, "uri")?;
                let contents = resources::read(&self.state, self.session_key(session_id), uri)?;
                Ok(Handled::result(json!({ "contents": contents })))
            }
            Route::PromptsList => Ok(Handled::result(
                json!({ "prompts": self.registry.list_prompts() }),
            )),
            Route::PromptsGet => {
                let params = params_object(params)?;
                let name = require_str(&params, "name")?;
                let descriptor = self
                    .registry
                    .prompt(name)
                    .ok_or_else(|| McpError::PromptNotFound(name.to_string()))?;
                let rendered = prompts::render(&self.state, descriptor, params.get("arguments"))?;
                to_json(&rendered).map(Handled::result)
            }
            Route::Unknown => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    fn initialize(&self, session_id: Option<&str>, params: Option<&Value>) -> McpResult<Handled> {
        let params: InitializeParams =
            serde_json::from_value(Value::Object(params_object(params)?))?;
        let session = self.sessions.initialize(session_id, params)?;

        let result = InitializeResult {
            protocol_version: session.negotiated_protocol_version,
            capabilities: ServerCapabilities::default(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            session_id: session.session_id.clone(),
            instructions: INSTRUCTIONS.to_string(),
        };

        Ok(Handled {
            result: to_json(&result)?,
            created_session: Some(session.session_id),
        })
    }

    async fn call_tool(&self, session_key: &str, params: Option<&Value>) -> McpResult<Value> {
        let params = params_object(params)?;
        let name = require_str(&params, "name")?;
        let tool = self
            .registry
            .tool(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        let arguments = arguments_object(params.get("arguments"))?;
        check_arguments(&tool.descriptor.input_schema, &arguments)?;

        let ctx = ToolContext {
            state: self.state.clone(),
            session_key: session_key.to_string(),
        };

        tracing::info!(tool = %name, session = %session_key, "Tool call");
        let payload = AssertUnwindSafe(tool.handler.call(&ctx, arguments))
            .catch_unwind()
            .await
            .map_err(|_| McpError::InternalError(format!("Tool {name} failed unexpectedly")))??;

        to_json(&ToolCallResult::from_payload(payload))
    }
}

fn to_json<T: Serialize>(value: &T) -> McpResult<Value> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}

/// Serializes a response (or batch of responses) for the wire.
fn encode<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        encode_fallback(&McpError::InternalError(e.to_string()))
    })
}

fn encode_fallback(error: &McpError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "error": { "code": error.code(), "message": error.to_string() },
        "id": null,
    })
}
