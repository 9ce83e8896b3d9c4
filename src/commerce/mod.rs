//! Commerce Domain Module
//!
//! The collaborators the protocol layer depends on but does not own:
//! - Domain models (products, carts, orders)
//! - Catalog, cart, order and supplier contracts with in-memory implementations
//! - Money, shipping and identifier helpers
//! - Application state bundling the stores
//! - REST API handlers

pub mod cart;
pub mod catalog;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod orders;
pub mod state;
pub mod suppliers;

// Re-export commonly used types for convenience
pub use cart::CartStore;
pub use catalog::Catalog;
pub use error::{CommerceError, CommerceResult};
pub use handlers::routes;
pub use orders::OrderStore;
pub use state::{AppState, SharedState};
pub use suppliers::SupplierDirectory;
