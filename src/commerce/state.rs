//! Commerce State Management
//!
//! Bundles the catalog, cart, order and supplier collaborators behind their
//! traits so the protocol layer and the REST handlers can share one set of
//! stores, and tests can swap any of them for a fake.

use super::cart::{CartStore, InMemoryCartStore};
use super::catalog::{Catalog, InMemoryCatalog};
use super::orders::{InMemoryOrderStore, OrderStore};
use super::suppliers::{InMemorySuppliers, SupplierDirectory};
use std::sync::Arc;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// The collaborators every handler talks to
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
    pub suppliers: Arc<dyn SupplierDirectory>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// In-memory stores over the demo catalog.
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(InMemoryCatalog::seeded()))
    }

    /// In-memory cart and order stores priced against `catalog`.
    pub fn with_catalog(catalog: Arc<dyn Catalog>) -> Self {
        tracing::debug!(products = catalog.list().len(), "Catalog loaded");

        Self {
            carts: Arc::new(InMemoryCartStore::new(catalog.clone())),
            orders: Arc::new(InMemoryOrderStore::new()),
            suppliers: Arc::new(InMemorySuppliers::seeded()),
            catalog,
        }
    }

    /// Fully custom collaborators.
    pub fn from_parts(
        catalog: Arc<dyn Catalog>,
        carts: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
        suppliers: Arc<dyn SupplierDirectory>,
    ) -> Self {
        Self {
            catalog,
            carts,
            orders,
            suppliers,
        }
    }
}
