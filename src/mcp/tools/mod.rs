//! MCP tool implementations.
//!
//! Each tool is a unit struct pairing its descriptor with a handler. Handlers
//! translate arguments into collaborator calls and return a JSON payload;
//! the dispatcher wraps that payload into content blocks.
//!
//! Expected domain outcomes (unknown product, out of stock, order not
//! cancellable) are returned as `Ok` payloads with `success: false` or
//! `found: false`. Only malformed arguments become an [`McpError`].

pub mod cart;
pub mod catalog;
pub mod orders;

use super::error::{McpError, McpResult};
use super::models::ToolDescriptor;
use crate::commerce::{CommerceError, SharedState};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

/// What a tool may touch while it runs
#[derive(Clone)]
pub struct ToolContext {
    pub state: SharedState,
    /// Key of the caller's cart and order history
    pub session_key: String,
}

/// Trait implemented by each MCP tool exposed by this server
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Name, description and input schema
    fn descriptor(&self) -> ToolDescriptor;

    /// Runs the tool. Arguments have already been checked against the schema.
    async fn call(&self, ctx: &ToolContext, arguments: Value) -> McpResult<Value>;
}

/// Every commerce tool, in listing order.
pub fn all() -> Vec<Arc<dyn ToolHandler>> {
    vec![
        Arc::new(catalog::SearchProducts),
        Arc::new(catalog::GetProductDetails),
        Arc::new(cart::AddToCart),
        Arc::new(cart::GetCart),
        Arc::new(orders::Checkout),
        Arc::new(cart::UpdateCartItem),
        Arc::new(cart::RemoveFromCart),
        Arc::new(orders::GetOrderStatus),
        Arc::new(orders::GetOrderHistory),
        Arc::new(orders::CancelOrder),
        Arc::new(orders::GetShippingOptions),
        Arc::new(catalog::GetRecommendations),
    ]
}

/// Deserializes tool arguments into a typed input struct.
pub(crate) fn parse_input<T: DeserializeOwned>(arguments: Value) -> McpResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| McpError::InvalidParams(format!("Invalid arguments: {e}")))
}

/// Payload for an operation the collaborator declined.
pub(crate) fn declined(error: &CommerceError) -> Value {
    json!({
        "success": false,
        "message": error.to_string(),
        "reason": error.reason(),
    })
}
