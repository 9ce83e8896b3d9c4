//! Prompt templates.
//!
//! Rendering is plain string substitution over the caller's arguments plus
//! catalog facts; the same arguments always produce the same messages.

use super::error::{McpError, McpResult};
use super::models::{ContentBlock, PromptArgument, PromptDescriptor, PromptGetResult, PromptMessage, Role};
use crate::commerce::AppState;
use serde_json::{Map, Value};

fn argument(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        description: description.to_string(),
        required,
    }
}

pub fn descriptors() -> Vec<PromptDescriptor> {
    vec![
        PromptDescriptor {
            name: "shopping_assistant".to_string(),
            description: "Help a shopper find products that fit their needs".to_string(),
            arguments: vec![
                argument("userQuery", "What the shopper is looking for", true),
                argument("budget", "Maximum amount to spend", false),
            ],
        },
        PromptDescriptor {
            name: "product_comparison".to_string(),
            description: "Compare several products side by side".to_string(),
            arguments: vec![argument(
                "productIds",
                "Products to compare, as an array or comma-separated ids",
                true,
            )],
        },
        PromptDescriptor {
            name: "order_support".to_string(),
            description: "Assist with questions about an existing order".to_string(),
            arguments: vec![argument("orderId", "The order in question", true)],
        },
    ]
}

/// Checks `arguments` against `descriptor` and renders the prompt.
pub fn render(
    state: &AppState,
    descriptor: &PromptDescriptor,
    arguments: Option<&Value>,
) -> McpResult<PromptGetResult> {
    let args = match arguments {
        None => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(McpError::InvalidParams(
                "arguments must be an object".to_string(),
            ))
        }
    };

    if let Some(missing) = descriptor
        .arguments
        .iter()
        .find(|a| a.required && args.get(&a.name).map_or(true, Value::is_null))
    {
        return Err(McpError::InvalidParams(format!(
            "Missing required argument: {}",
            missing.name
        )));
    }

    let text = match descriptor.name.as_str() {
        "shopping_assistant" => shopping_assistant(&args)?,
        "product_comparison" => product_comparison(state, &args)?,
        "order_support" => order_support(&args)?,
        other => return Err(McpError::PromptNotFound(other.to_string())),
    };

    Ok(PromptGetResult {
        description: descriptor.description.clone(),
        messages: vec![PromptMessage {
            role: Role::User,
            content: ContentBlock::text(text),
        }],
    })
}

/// A string argument; numbers are accepted and printed as-is.
fn string_arg(args: &Map<String, Value>, name: &str) -> McpResult<Option<String>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(McpError::InvalidParams(format!("{name} must be a string"))),
    }
}

fn shopping_assistant(args: &Map<String, Value>) -> McpResult<String> {
    let query = string_arg(args, "userQuery")?.unwrap_or_default();
    let budget = match string_arg(args, "budget")? {
        Some(b) => format!("\nBudget: {b}"),
        None => String::new(),
    };

    Ok(format!(
        "You are a shopping assistant for our store.\n\
         Shopper request: {query}{budget}\n\n\
         Please:\n\
         1. Use search_products to find matching items\n\
         2. Use get_product_details on the best candidates\n\
         3. Recommend up to three products with a short reason for each\n\
         4. Offer to add the chosen product to the cart with add_to_cart"
    ))
}

fn product_comparison(state: &AppState, args: &Map<String, Value>) -> McpResult<String> {
    let ids: Vec<String> = match args.get("productIds") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    McpError::InvalidParams("productIds must contain strings".to_string())
                })
            })
            .collect::<McpResult<_>>()?,
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => {
            return Err(McpError::InvalidParams(
                "productIds must be an array or a comma-separated string".to_string(),
            ))
        }
    };

    if ids.is_empty() {
        return Err(McpError::InvalidParams(
            "productIds must name at least one product".to_string(),
        ));
    }

    let lines: Vec<String> = ids
        .iter()
        .map(|id| match state.catalog.find(id) {
            Some(p) => format!(
                "- {} ({}): {:.2} {}, rated {}/5, {}",
                p.name,
                p.id,
                p.price,
                p.currency,
                p.rating,
                if p.inventory > 0 { "in stock" } else { "out of stock" }
            ),
            None => format!("- {id}: not in the catalog"),
        })
        .collect();

    Ok(format!(
        "Compare the following products for a shopper:\n{}\n\n\
         Cover price, features, rating and availability, then say which one \
         offers the best value and why.",
        lines.join("\n")
    ))
}

fn order_support(args: &Map<String, Value>) -> McpResult<String> {
    let order_id = string_arg(args, "orderId")?.unwrap_or_default();

    Ok(format!(
        "A customer needs help with order {order_id}.\n\n\
         Please:\n\
         1. Use get_order_status to check its status and tracking\n\
         2. Explain where the order is and what happens next\n\
         3. If it is still pending and the customer asks, cancel it with cancel_order"
    ))
}
