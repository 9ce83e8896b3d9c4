//! Cart tools. All of them operate on the caller's session cart.

use super::{declined, parse_input, ToolContext, ToolHandler};
use crate::commerce::helpers::format_item_summary;
use crate::mcp::error::McpResult;
use crate::mcp::models::{InputSchema, ToolDescriptor};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddToCartInput {
    product_id: String,
    variant_id: Option<String>,
    quantity: Option<i64>,
}

pub struct AddToCart;

#[async_trait]
impl ToolHandler for AddToCart {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "add_to_cart".to_string(),
            description: "Add a product variant to the shopping cart".to_string(),
            input_schema: InputSchema::object(
                json!({
                    "productId": { "type": "string" },
                    "variantId": { "type": "string", "description": "Defaults to the first variant" },
                    "quantity": { "type": "integer", "description": "Units to add (default 1)" },
                }),
                &["productId"],
            ),
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: Value) -> McpResult<Value> {
        let input: AddToCartInput = parse_input(arguments)?;
        let quantity = input.quantity.unwrap_or(1);

        let result = ctx.state.carts.add_item(
            &ctx.session_key,
            &input.product_id,
            input.variant_id.as_deref(),
            quantity,
        );

        Ok(match result {
            Ok(cart) => {
                let line = cart.items.iter().find(|i| {
                    i.product_id == input.product_id
                        && input.variant_id.as_deref().map_or(true, |v| i.variant_id == v)
                });
                let what = line
                    .map(|l| format!("{} ({})", l.name, l.variant_name))
                    .unwrap_or_else(|| input.product_id.clone());

                json!({
                    "success": true,
                    "message": format!("{quantity}x {what} added to cart"),
                    "cart": cart,
                })
            }
            Err(e) => {
                tracing::debug!(session = %ctx.session_key, reason = e.reason(), "add_to_cart declined");
                declined(&e)
            }
        })
    }
}

pub struct GetCart;

#[async_trait]
impl ToolHandler for GetCart {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_cart".to_string(),
            description: "Show the current cart with line items and total".to_string(),
            input_schema: InputSchema::object(json!({}), &[]),
        }
    }

    async fn call(&self, ctx: &ToolContext, _arguments: Value) -> McpResult<Value> {
        let cart = ctx.state.carts.get(&ctx.session_key);
        let summary = if cart.items.is_empty() {
            "Cart is empty.".to_string()
        } else {
            format_item_summary(&cart.items)
        };

        Ok(json!({ "success": true, "summary": summary, "cart": cart }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateItemInput {
    product_id: String,
    variant_id: String,
    quantity: i64,
}

pub struct UpdateCartItem;

#[async_trait]
impl ToolHandler for UpdateCartItem {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "update_cart_item".to_string(),
            description: "Change the quantity of a cart line; 0 removes it".to_string(),
            input_schema: InputSchema::object(
                json!({
                    "productId": { "type": "string" },
                    "variantId": { "type": "string" },
                    "quantity": { "type": "integer" },
                }),
                &["productId", "variantId", "quantity"],
            ),
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: Value) -> McpResult<Value> {
        let input: UpdateItemInput = parse_input(arguments)?;

        Ok(
            match ctx.state.carts.update_quantity(
                &ctx.session_key,
                &input.product_id,
                &input.variant_id,
                input.quantity,
            ) {
                Ok(cart) => json!({
                    "success": true,
                    "message": format!("Quantity updated to {}", input.quantity),
                    "cart": cart,
                }),
                Err(e) => declined(&e),
            },
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveItemInput {
    product_id: String,
    variant_id: String,
}

pub struct RemoveFromCart;

#[async_trait]
impl ToolHandler for RemoveFromCart {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "remove_from_cart".to_string(),
            description: "Remove a line from the cart".to_string(),
            input_schema: InputSchema::object(
                json!({
                    "productId": { "type": "string" },
                    "variantId": { "type": "string" },
                }),
                &["productId", "variantId"],
            ),
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: Value) -> McpResult<Value> {
        let input: RemoveItemInput = parse_input(arguments)?;

        Ok(
            match ctx
                .state
                .carts
                .remove_item(&ctx.session_key, &input.product_id, &input.variant_id)
            {
                Ok(cart) => json!({
                    "success": true,
                    "message": "Item removed from cart",
                    "cart": cart,
                }),
                Err(e) => declined(&e),
            },
        )
    }
}
