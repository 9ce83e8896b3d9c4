//! Commerce Domain Models
//!
//! Products, carts, orders and suppliers as the collaborators hand them to
//! the protocol layer. Every type serializes in camelCase because the same
//! structs are sent verbatim to MCP clients and REST callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog Models
// =============================================================================

/// A purchasable variant of a product (colour, size, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    pub name: String,
    pub sku: String,

    /// Added to the product's base price
    #[serde(default)]
    pub price_adjustment: f64,
}

/// A catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub category: String,
    pub tags: Vec<String>,

    /// Units available for sale
    pub inventory: u32,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub rating: f64,
    pub review_count: u32,
}

impl Product {
    /// Looks up a variant by id.
    pub fn variant(&self, variant_id: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// The variant used when a caller does not name one.
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// Current unit price of `variant`.
    pub fn unit_price(&self, variant: &ProductVariant) -> f64 {
        super::helpers::round_cents(self.price + variant.price_adjustment)
    }

    /// Case-insensitive match against name, description, category and tags.
    /// An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }

        q.split_whitespace().all(|term| {
            self.name.to_lowercase().contains(term)
                || self.description.to_lowercase().contains(term)
                || self.category.to_lowercase().contains(term)
                || self.tags.iter().any(|t| t.to_lowercase().contains(term))
        })
    }
}

/// Field used to order search results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Price,
    Rating,
    Name,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filters accepted by [`super::Catalog::search`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<SortKey>,
    #[serde(default)]
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
}

// =============================================================================
// Cart Models
// =============================================================================

/// One line of a cart, priced from the catalog at read time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub variant_id: String,
    pub name: String,
    pub variant_name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub line_total: f64,
}

/// A priced view of a session's cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// The session key owning this cart
    pub id: String,
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub total: f64,
    pub currency: String,
}

// =============================================================================
// Order Models
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Stripe,
    Paypal,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
    Overnight,
}

/// Delivery address; every field is mandatory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl Address {
    /// Names of fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub session_key: String,
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub shipping: f64,
    pub tax: f64,
    pub total: f64,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    pub shipping_address: Address,
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One delivery option quoted for a destination
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    pub method: ShippingMethod,
    pub label: String,
    pub cost: f64,
    pub estimated_days: String,
}

// =============================================================================
// Supplier Models
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SupplierStatus {
    Active,
    Paused,
}

/// A dropshipping source the catalog is stocked from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub status: SupplierStatus,
    /// Number of catalog products sourced from this supplier
    pub products: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Running,
    Completed,
}

/// An inventory sync run against one supplier
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncJob {
    pub sync_id: String,
    pub supplier_id: String,
    pub status: SyncStatus,
    /// Percent complete, 0 to 100
    pub progress: u8,
    pub updated: u32,
    pub failed: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
