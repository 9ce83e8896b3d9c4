//! Cart collaborator.
//!
//! Carts store only `(product, variant, quantity)` lines. Names, prices and
//! totals are resolved from the catalog every time a cart is returned, so a
//! stored total can never drift from current prices.

use super::catalog::Catalog;
use super::error::{CommerceError, CommerceResult};
use super::helpers::{compute_total, round_cents, CURRENCY};
use super::models::{Cart, CartItem, Product, ProductVariant};
use dashmap::DashMap;
use std::sync::Arc;

/// Cart operations keyed by session.
pub trait CartStore: Send + Sync {
    fn get(&self, session_key: &str) -> Cart;

    /// Adds `quantity` units, merging with an existing line for the same
    /// product and variant. `variant_id: None` picks the product's first variant.
    fn add_item(
        &self,
        session_key: &str,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> CommerceResult<Cart>;

    /// Sets the quantity of an existing line; zero removes it.
    fn update_quantity(
        &self,
        session_key: &str,
        product_id: &str,
        variant_id: &str,
        quantity: i64,
    ) -> CommerceResult<Cart>;

    fn remove_item(
        &self,
        session_key: &str,
        product_id: &str,
        variant_id: &str,
    ) -> CommerceResult<Cart>;

    /// Takes the lines of a placed order out of the cart. Units added after
    /// the order was snapshotted stay in the cart.
    fn remove_ordered(&self, session_key: &str, ordered: &[CartItem]) -> Cart;

    fn clear(&self, session_key: &str) -> Cart;
}

#[derive(Debug, Clone, PartialEq)]
struct CartLine {
    product_id: String,
    variant_id: String,
    quantity: u32,
}

/// Carts held in memory.
/// DashMap gives per-session locking without an outer Mutex.
pub struct InMemoryCartStore {
    lines: DashMap<String, Vec<CartLine>>,
    catalog: Arc<dyn Catalog>,
}

impl InMemoryCartStore {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            lines: DashMap::new(),
            catalog,
        }
    }

    fn product(&self, product_id: &str) -> CommerceResult<Product> {
        self.catalog
            .find(product_id)
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))
    }

    /// Prices `lines` against the catalog. Lines whose product has left the
    /// catalog are dropped from the view.
    fn price(&self, session_key: &str, lines: &[CartLine]) -> Cart {
        let items: Vec<CartItem> = lines
            .iter()
            .filter_map(|line| {
                let product = self.catalog.find(&line.product_id)?;
                let variant = product.variant(&line.variant_id)?;
                let unit_price = product.unit_price(variant);
                Some(CartItem {
                    product_id: line.product_id.clone(),
                    variant_id: line.variant_id.clone(),
                    name: product.name.clone(),
                    variant_name: variant.name.clone(),
                    unit_price,
                    quantity: line.quantity,
                    line_total: round_cents(unit_price * f64::from(line.quantity)),
                })
            })
            .collect();

        Cart {
            id: session_key.to_string(),
            item_count: items.iter().map(|i| i.quantity).sum(),
            total: compute_total(&items),
            currency: CURRENCY.to_string(),
            items,
        }
    }
}

fn variant_of(product: &Product, variant_id: Option<&str>) -> CommerceResult<ProductVariant> {
    match variant_id {
        Some(id) => product.variant(id),
        None => product.default_variant(),
    }
    .cloned()
    .ok_or_else(|| CommerceError::VariantNotFound {
        product_id: product.id.clone(),
        variant_id: variant_id.unwrap_or_default().to_string(),
    })
}

/// Units of `product_id` held by every line except `skip`.
fn held_elsewhere(lines: &[CartLine], product_id: &str, skip: Option<usize>) -> i64 {
    lines
        .iter()
        .enumerate()
        .filter(|(idx, l)| Some(*idx) != skip && l.product_id == product_id)
        .map(|(_, l)| i64::from(l.quantity))
        .sum()
}

/// Checks that `line_quantity` plus the units already `held` on other lines
/// fits the product's inventory. Inventory is per product, shared by all its
/// variants. Returns the line quantity to store.
fn check_stock(product: &Product, held: i64, line_quantity: i64) -> CommerceResult<u32> {
    if product.inventory == 0 {
        return Err(CommerceError::OutOfStock {
            name: product.name.clone(),
        });
    }

    let requested = held + line_quantity;
    match (u32::try_from(requested), u32::try_from(line_quantity)) {
        (Ok(total), Ok(quantity)) if total <= product.inventory => Ok(quantity),
        _ => Err(CommerceError::InsufficientStock {
            name: product.name.clone(),
            requested: u32::try_from(requested).unwrap_or(u32::MAX),
            available: product.inventory,
        }),
    }
}

impl CartStore for InMemoryCartStore {
    fn get(&self, session_key: &str) -> Cart {
        match self.lines.get(session_key) {
            Some(lines) => self.price(session_key, &lines),
            None => self.price(session_key, &[]),
        }
    }

    fn add_item(
        &self,
        session_key: &str,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> CommerceResult<Cart> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        let product = self.product(product_id)?;
        if product.inventory == 0 {
            return Err(CommerceError::OutOfStock { name: product.name });
        }
        let variant = variant_of(&product, variant_id)?;

        let mut lines = self.lines.entry(session_key.to_string()).or_default();
        let existing = lines
            .iter()
            .position(|l| l.product_id == product.id && l.variant_id == variant.id);
        let already = existing.map_or(0, |idx| i64::from(lines[idx].quantity));
        let held = held_elsewhere(&lines, &product.id, existing);

        let new_quantity = check_stock(&product, held, already + quantity)?;

        match existing {
            Some(idx) => lines[idx].quantity = new_quantity,
            None => lines.push(CartLine {
                product_id: product.id.clone(),
                variant_id: variant.id.clone(),
                quantity: new_quantity,
            }),
        }

        Ok(self.price(session_key, &lines))
    }

    fn update_quantity(
        &self,
        session_key: &str,
        product_id: &str,
        variant_id: &str,
        quantity: i64,
    ) -> CommerceResult<Cart> {
        if quantity < 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        let not_in_cart = || CommerceError::CartItemNotFound {
            product_id: product_id.to_string(),
            variant_id: variant_id.to_string(),
        };

        let mut lines = self.lines.get_mut(session_key).ok_or_else(not_in_cart)?;
        let idx = lines
            .iter()
            .position(|l| l.product_id == product_id && l.variant_id == variant_id)
            .ok_or_else(not_in_cart)?;

        if quantity == 0 {
            lines.remove(idx);
        } else {
            let product = self.product(product_id)?;
            let held = held_elsewhere(&lines, product_id, Some(idx));
            lines[idx].quantity = check_stock(&product, held, quantity)?;
        }

        Ok(self.price(session_key, &lines))
    }

    fn remove_item(
        &self,
        session_key: &str,
        product_id: &str,
        variant_id: &str,
    ) -> CommerceResult<Cart> {
        self.update_quantity(session_key, product_id, variant_id, 0)
    }

    fn remove_ordered(&self, session_key: &str, ordered: &[CartItem]) -> Cart {
        let cart = match self.lines.get_mut(session_key) {
            Some(mut lines) => {
                for item in ordered {
                    if let Some(line) = lines
                        .iter_mut()
                        .find(|l| l.product_id == item.product_id && l.variant_id == item.variant_id)
                    {
                        line.quantity = line.quantity.saturating_sub(item.quantity);
                    }
                }
                lines.retain(|l| l.quantity > 0);
                self.price(session_key, &lines)
            }
            None => return self.price(session_key, &[]),
        };

        self.lines.remove_if(session_key, |_, lines| lines.is_empty());
        cart
    }

    fn clear(&self, session_key: &str) -> Cart {
        self.lines.remove(session_key);
        self.price(session_key, &[])
    }
}
