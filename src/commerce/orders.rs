//! Order collaborator.

use super::error::{CommerceError, CommerceResult};
use super::helpers::{
    compute_tax, new_order_id, new_tracking_number, round_cents, shipping_cost, CURRENCY,
};
use super::models::{
    Address, Cart, Order, OrderStatus, PaymentMethod, PaymentStatus, ShippingMethod,
};
use chrono::Utc;
use dashmap::DashMap;

/// Order lifecycle: `pending` → `confirmed` via [`OrderStore::pay`], or
/// `pending` → `cancelled` via [`OrderStore::cancel`].
pub trait OrderStore: Send + Sync {
    /// Snapshots `cart` into a new pending order. The order total is
    /// computed here from the cart lines.
    fn create(
        &self,
        session_key: &str,
        cart: &Cart,
        shipping_address: Address,
        payment_method: PaymentMethod,
        shipping_method: ShippingMethod,
    ) -> CommerceResult<Order>;

    fn get(&self, id: &str) -> Option<Order>;

    /// Orders placed by `session_key`, newest first.
    fn list_for(&self, session_key: &str) -> Vec<Order>;

    fn pay(&self, id: &str) -> CommerceResult<Order>;

    fn cancel(&self, id: &str) -> CommerceResult<Order>;
}

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: DashMap<String, Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn create(
        &self,
        session_key: &str,
        cart: &Cart,
        shipping_address: Address,
        payment_method: PaymentMethod,
        shipping_method: ShippingMethod,
    ) -> CommerceResult<Order> {
        if cart.items.is_empty() {
            return Err(CommerceError::EmptyCart);
        }

        let missing = shipping_address.missing_fields();
        if !missing.is_empty() {
            return Err(CommerceError::IncompleteAddress(missing.join(", ")));
        }

        let shipping = shipping_cost(shipping_method, &shipping_address.country).ok_or_else(
            || CommerceError::ShippingUnavailable {
                method: format!("{shipping_method:?}").to_lowercase(),
                country: shipping_address.country.clone(),
            },
        )?;

        let subtotal = cart.total;
        let tax = compute_tax(subtotal);

        let order = Order {
            id: new_order_id(),
            session_key: session_key.to_string(),
            items: cart.items.clone(),
            subtotal,
            shipping,
            tax,
            total: round_cents(subtotal + shipping + tax),
            currency: CURRENCY.to_string(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method,
            shipping_method,
            shipping_address,
            tracking_number: None,
            created_at: Utc::now(),
        };

        tracing::info!(order = %order.id, session = %session_key, total = order.total, "Order created");
        self.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    fn get(&self, id: &str) -> Option<Order> {
        self.orders.get(id).map(|o| o.clone())
    }

    fn list_for(&self, session_key: &str) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.session_key == session_key)
            .map(|o| o.clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    fn pay(&self, id: &str) -> CommerceResult<Order> {
        let mut order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;

        if order.status != OrderStatus::Pending {
            return Err(CommerceError::NotPayable {
                id: id.to_string(),
                status: order.status,
            });
        }

        order.payment_status = PaymentStatus::Completed;
        order.status = OrderStatus::Confirmed;
        order.tracking_number = Some(new_tracking_number());

        tracing::info!(order = %id, "Payment captured");
        Ok(order.clone())
    }

    fn cancel(&self, id: &str) -> CommerceResult<Order> {
        let mut order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;

        if order.status != OrderStatus::Pending {
            return Err(CommerceError::NotCancellable {
                id: id.to_string(),
                status: order.status,
            });
        }

        order.status = OrderStatus::Cancelled;
        tracing::info!(order = %id, "Order cancelled");
        Ok(order.clone())
    }
}
