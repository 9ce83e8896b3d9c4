//! Errors raised by the catalog, cart and order collaborators.

use super::models::OrderStatus;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Variant {variant_id} not found for product {product_id}")]
    VariantNotFound {
        product_id: String,
        variant_id: String,
    },

    #[error("Item {product_id}/{variant_id} is not in the cart")]
    CartItemNotFound {
        product_id: String,
        variant_id: String,
    },

    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    #[error("Insufficient stock for {name}: requested {requested}, only {available} in stock")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("Quantity must be greater than zero, got {0}")]
    InvalidQuantity(i64),

    #[error("Cart is empty, nothing to order")]
    EmptyCart,

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order {id} cannot be cancelled in status {status:?}")]
    NotCancellable { id: String, status: OrderStatus },

    #[error("Order {id} cannot be paid in status {status:?}")]
    NotPayable { id: String, status: OrderStatus },

    #[error("Incomplete shipping address, missing: {0}")]
    IncompleteAddress(String),

    #[error("Shipping method {method} does not deliver to {country}")]
    ShippingUnavailable { method: String, country: String },

    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    #[error("Supplier {0} is not active")]
    SupplierInactive(String),

    #[error("Sync not found: {0}")]
    SyncNotFound(String),
}

impl CommerceError {
    /// Short machine-readable reason reported next to the human message.
    pub fn reason(&self) -> &'static str {
        match self {
            CommerceError::ProductNotFound(_) => "product_not_found",
            CommerceError::VariantNotFound { .. } => "variant_not_found",
            CommerceError::CartItemNotFound { .. } => "cart_item_not_found",
            CommerceError::OutOfStock { .. } => "out_of_stock",
            CommerceError::InsufficientStock { .. } => "insufficient_stock",
            CommerceError::InvalidQuantity(_) => "invalid_quantity",
            CommerceError::EmptyCart => "empty_cart",
            CommerceError::OrderNotFound(_) => "order_not_found",
            CommerceError::NotCancellable { .. } => "not_cancellable",
            CommerceError::NotPayable { .. } => "not_payable",
            CommerceError::IncompleteAddress(_) => "incomplete_address",
            CommerceError::ShippingUnavailable { .. } => "shipping_unavailable",
            CommerceError::SupplierNotFound(_) => "supplier_not_found",
            CommerceError::SupplierInactive(_) => "supplier_inactive",
            CommerceError::SyncNotFound(_) => "sync_not_found",
        }
    }
}

pub type CommerceResult<T> = Result<T, CommerceError>;
