//! Read-only resources. The URI scheme names the backing collaborator:
//! `products://` the catalog, `cart://` the caller's cart, `orders://` the
//! order store.

use super::error::{McpError, McpResult};
use super::models::{
    ResourceContents, ResourceDescriptor, ResourceTemplateDescriptor, JSON_MIME_TYPE,
};
use crate::commerce::AppState;
use serde::Serialize;
use serde_json::json;

pub const CATALOG_URI: &str = "products://catalog";
pub const CURRENT_CART_URI: &str = "cart://current";

pub fn static_resources() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor {
            uri: CATALOG_URI.to_string(),
            name: "Product catalog".to_string(),
            description: "Every product with variants, price and stock".to_string(),
            mime_type: JSON_MIME_TYPE.to_string(),
        },
        ResourceDescriptor {
            uri: CURRENT_CART_URI.to_string(),
            name: "Current cart".to_string(),
            description: "The cart of the calling session".to_string(),
            mime_type: JSON_MIME_TYPE.to_string(),
        },
    ]
}

pub fn templates() -> Vec<ResourceTemplateDescriptor> {
    vec![
        ResourceTemplateDescriptor {
            uri_template: "products://{productId}".to_string(),
            name: "Product".to_string(),
            description: "A single product by id".to_string(),
            mime_type: JSON_MIME_TYPE.to_string(),
        },
        ResourceTemplateDescriptor {
            uri_template: "orders://{orderId}".to_string(),
            name: "Order".to_string(),
            description: "A single order by id".to_string(),
            mime_type: JSON_MIME_TYPE.to_string(),
        },
    ]
}

/// Resolves `uri` against the collaborators.
pub fn read(state: &AppState, session_key: &str, uri: &str) -> McpResult<Vec<ResourceContents>> {
    let not_found = || McpError::ResourceNotFound(uri.to_string());
    let (scheme, path) = uri.split_once("://").ok_or_else(not_found)?;

    let body = match (scheme, path) {
        ("products", "catalog") => to_text(&json!({ "products": state.catalog.list() }))?,
        ("products", id) if !id.is_empty() => to_text(&state.catalog.find(id).ok_or_else(not_found)?)?,
        ("cart", "current") => to_text(&state.carts.get(session_key))?,
        ("orders", id) if !id.is_empty() => to_text(&state.orders.get(id).ok_or_else(not_found)?)?,
        _ => return Err(not_found()),
    };

    Ok(vec![ResourceContents {
        uri: uri.to_string(),
        mime_type: JSON_MIME_TYPE.to_string(),
        text: body,
    }])
}

fn to_text<T: Serialize>(value: &T) -> McpResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::InternalError(e.to_string()))
}
