//! Commerce Business Logic Helpers
//!
//! Money arithmetic, identifier generation, shipping quotes and formatting
//! shared by the collaborators, the REST handlers and the MCP tools.

use super::models::{CartItem, ShippingMethod, ShippingOption};
use axum::http::HeaderMap;
use uuid::Uuid;

/// Currency of every price in the catalog
pub const CURRENCY: &str = "USD";
/// Sales tax applied to an order subtotal
pub const TAX_RATE: f64 = 0.088;
/// Surcharge added to every option for destinations outside the US
pub const INTERNATIONAL_SURCHARGE: f64 = 15.0;
/// Cart/order key used when a caller identifies no session
pub const DEFAULT_SESSION_KEY: &str = "default";
/// Header carrying the REST caller's session key
pub const SESSION_HEADER: &str = "session-id";

/// Rounds an amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Σ(unit price × quantity) over the given lines, rounded to cents.
pub fn compute_total(items: &[CartItem]) -> f64 {
    round_cents(
        items
            .iter()
            .map(|i| i.unit_price * f64::from(i.quantity))
            .sum(),
    )
}

/// Tax owed on `subtotal`.
pub fn compute_tax(subtotal: f64) -> f64 {
    round_cents(subtotal * TAX_RATE)
}

/// Generates a fresh order identifier, e.g. `ORD-3F2A9C01B7D4`.
pub fn new_order_id() -> String {
    format!("ORD-{}", short_token())
}

/// Generates a carrier tracking number.
pub fn new_tracking_number() -> String {
    format!("TRK{}", short_token())
}

fn short_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(12);
    token.to_uppercase()
}

/// Quotes the delivery options available for `country`.
///
/// Overnight delivery is only offered inside the US; everywhere else every
/// option carries [`INTERNATIONAL_SURCHARGE`].
pub fn shipping_options(country: &str) -> Vec<ShippingOption> {
    let domestic = is_domestic(country);
    let surcharge = if domestic { 0.0 } else { INTERNATIONAL_SURCHARGE };

    [
        (ShippingMethod::Standard, "Standard shipping", 10.0, "5-7"),
        (ShippingMethod::Express, "Express shipping", 25.0, "2-3"),
        (ShippingMethod::Overnight, "Overnight shipping", 45.0, "1"),
    ]
    .into_iter()
    .filter(|(method, ..)| domestic || *method != ShippingMethod::Overnight)
    .map(|(method, label, cost, days)| ShippingOption {
        method,
        label: label.to_string(),
        cost: round_cents(cost + surcharge),
        estimated_days: days.to_string(),
    })
    .collect()
}

/// Cost of `method` to `country`, or `None` when it does not deliver there.
pub fn shipping_cost(method: ShippingMethod, country: &str) -> Option<f64> {
    shipping_options(country)
        .into_iter()
        .find(|o| o.method == method)
        .map(|o| o.cost)
}

fn is_domestic(country: &str) -> bool {
    matches!(
        country.trim().to_uppercase().as_str(),
        "US" | "USA" | "UNITED STATES"
    )
}

/// Produces a human-readable one-line summary for a list of cart items.
///
/// Example output: `"2x Wireless Headphones (Black), 1x Laptop Stand (Silver)"`.
pub fn format_item_summary(items: &[CartItem]) -> String {
    items
        .iter()
        .map(|i| format!("{}x {} ({})", i.quantity, i.name, i.variant_name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reads the REST caller's session key from the `session-id` header.
pub fn resolve_session_key(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SESSION_KEY)
        .to_string()
}
