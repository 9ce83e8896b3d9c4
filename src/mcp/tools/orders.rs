//! Checkout and order tools.

use super::{declined, parse_input, ToolContext, ToolHandler};
use crate::commerce::helpers::{format_item_summary, shipping_options};
use crate::commerce::models::{Address, Order, PaymentMethod, ShippingMethod};
use crate::mcp::error::McpResult;
use crate::mcp::models::{InputSchema, ToolDescriptor};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

fn address_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "street": { "type": "string" },
            "city": { "type": "string" },
            "state": { "type": "string" },
            "zip": { "type": "string" },
            "country": { "type": "string" },
        },
        "required": ["name", "street", "city", "state", "zip", "country"],
    })
}

fn order_summary(order: &Order) -> Value {
    json!({
        "id": order.id,
        "status": order.status,
        "paymentStatus": order.payment_status,
        "total": order.total,
        "currency": order.currency,
        "itemCount": order.items.iter().map(|i| i.quantity).sum::<u32>(),
        "trackingNumber": order.tracking_number,
        "createdAt": order.created_at,
    })
}

// =============================================================================
// checkout
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutInput {
    shipping_address: Address,
    payment_method: Option<PaymentMethod>,
    shipping_method: Option<ShippingMethod>,
}

/// Places an order for the caller's cart, captures payment and takes the
/// ordered lines out of the cart. Totals come from the cart as priced now,
/// never from the caller. An order whose payment fails is cancelled.
pub struct Checkout;

#[async_trait]
impl ToolHandler for Checkout {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "checkout".to_string(),
            description: "Place an order for everything in the cart and pay for it".to_string(),
            input_schema: InputSchema::object(
                json!({
                    "shippingAddress": address_schema(),
                    "paymentMethod": { "type": "string", "enum": ["stripe", "paypal"] },
                    "shippingMethod": { "type": "string", "enum": ["standard", "express", "overnight"] },
                }),
                &["shippingAddress"],
            ),
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: Value) -> McpResult<Value> {
        let input: CheckoutInput = parse_input(arguments)?;
        let state = &ctx.state;
        let cart = state.carts.get(&ctx.session_key);

        let order = match state.orders.create(
            &ctx.session_key,
            &cart,
            input.shipping_address,
            input.payment_method.unwrap_or_default(),
            input.shipping_method.unwrap_or_default(),
        ) {
            Ok(order) => order,
            Err(e) => return Ok(declined(&e)),
        };

        let order = match state.orders.pay(&order.id) {
            Ok(paid) => paid,
            Err(e) => {
                if let Err(cancel_err) = state.orders.cancel(&order.id) {
                    tracing::warn!(order = %order.id, error = %cancel_err, "Could not cancel unpaid order");
                }
                return Ok(declined(&e));
            }
        };
        state.carts.remove_ordered(&ctx.session_key, &order.items);

        tracing::info!(
            order = %order.id,
            session = %ctx.session_key,
            items = %format_item_summary(&order.items),
            "Checkout complete"
        );

        Ok(json!({
            "success": true,
            "message": format!("Your order {} has been placed", order.id),
            "orderId": order.id,
            "status": order.status,
            "subtotal": order.subtotal,
            "shipping": order.shipping,
            "tax": order.tax,
            "total": order.total,
            "currency": order.currency,
            "trackingNumber": order.tracking_number,
        }))
    }
}

// =============================================================================
// Order lookups
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderInput {
    order_id: String,
}

fn order_id_schema() -> InputSchema {
    InputSchema::object(json!({ "orderId": { "type": "string" } }), &["orderId"])
}

pub struct GetOrderStatus;

#[async_trait]
impl ToolHandler for GetOrderStatus {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_order_status".to_string(),
            description: "Look up the status, payment and tracking of an order".to_string(),
            input_schema: order_id_schema(),
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: Value) -> McpResult<Value> {
        let input: OrderInput = parse_input(arguments)?;

        Ok(match ctx.state.orders.get(&input.order_id) {
            Some(order) => json!({ "found": true, "order": order_summary(&order) }),
            None => json!({
                "found": false,
                "orderId": input.order_id,
                "message": format!("No order with id {}", input.order_id),
            }),
        })
    }
}

pub struct GetOrderHistory;

#[async_trait]
impl ToolHandler for GetOrderHistory {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_order_history".to_string(),
            description: "List orders placed in this session, newest first".to_string(),
            input_schema: InputSchema::object(json!({}), &[]),
        }
    }

    async fn call(&self, ctx: &ToolContext, _arguments: Value) -> McpResult<Value> {
        let orders = ctx.state.orders.list_for(&ctx.session_key);

        Ok(json!({
            "success": true,
            "total": orders.len(),
            "orders": orders.iter().map(order_summary).collect::<Vec<_>>(),
        }))
    }
}

pub struct CancelOrder;

#[async_trait]
impl ToolHandler for CancelOrder {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "cancel_order".to_string(),
            description: "Cancel an order that is still pending".to_string(),
            input_schema: order_id_schema(),
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: Value) -> McpResult<Value> {
        let input: OrderInput = parse_input(arguments)?;

        Ok(match ctx.state.orders.cancel(&input.order_id) {
            Ok(order) => json!({
                "success": true,
                "message": format!("Order {} cancelled", order.id),
                "order": order_summary(&order),
            }),
            Err(e) => declined(&e),
        })
    }
}

// =============================================================================
// get_shipping_options
// =============================================================================

#[derive(Debug, Deserialize)]
struct ShippingInput {
    country: Option<String>,
}

pub struct GetShippingOptions;

#[async_trait]
impl ToolHandler for GetShippingOptions {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_shipping_options".to_string(),
            description: "Quote delivery options and costs for a destination country".to_string(),
            input_schema: InputSchema::object(
                json!({ "country": { "type": "string", "description": "Defaults to US" } }),
                &[],
            ),
        }
    }

    async fn call(&self, _ctx: &ToolContext, arguments: Value) -> McpResult<Value> {
        let input: ShippingInput = parse_input(arguments)?;
        let country = input.country.unwrap_or_else(|| "US".to_string());

        Ok(json!({
            "success": true,
            "options": shipping_options(&country),
            "country": country,
        }))
    }
}
