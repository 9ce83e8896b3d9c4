//! REST API handlers for the catalog, cart and order collaborators
//!
//! These are thin HTTP views over the same stores the MCP tools use. The
//! caller's session is taken from the `session-id` header.

use super::error::CommerceError;
use super::helpers::{format_item_summary, resolve_session_key};
use super::models::{Address, PaymentMethod, SearchFilters, ShippingMethod};
use super::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

/// Creates routes for the REST surface
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/search", post(search_products))
        .route("/api/products/:id", get(get_product))
        .route("/api/cart", get(get_cart).delete(clear_cart))
        .route("/api/cart/items", post(add_cart_item))
        .route(
            "/api/cart/items/:product_id/:variant_id",
            put(update_cart_item).delete(remove_cart_item),
        )
        .route("/api/orders", post(create_order).get(list_orders))
        .route("/api/orders/:id", get(get_order))
        .route("/api/orders/:id/pay", post(pay_order))
        .route("/api/orders/:id/cancel", post(cancel_order))
        .route("/api/suppliers", get(list_suppliers))
        .route("/api/suppliers/:id", get(get_supplier))
        .route("/api/suppliers/:id/sync", post(start_supplier_sync))
        .route("/api/suppliers/sync/:sync_id", get(get_sync_status))
}

impl IntoResponse for CommerceError {
    fn into_response(self) -> Response {
        let status = match &self {
            CommerceError::ProductNotFound(_)
            | CommerceError::VariantNotFound { .. }
            | CommerceError::CartItemNotFound { .. }
            | CommerceError::OrderNotFound(_)
            | CommerceError::SupplierNotFound(_)
            | CommerceError::SyncNotFound(_) => StatusCode::NOT_FOUND,
            CommerceError::SupplierInactive(_)
            | CommerceError::OutOfStock { .. }
            | CommerceError::InsufficientStock { .. }
            | CommerceError::NotCancellable { .. }
            | CommerceError::NotPayable { .. } => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        };

        (
            status,
            Json(json!({
                "success": false,
                "error": self.to_string(),
                "reason": self.reason(),
            })),
        )
            .into_response()
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Deserialize)]
struct ProductQuery {
    #[serde(default)]
    query: String,
    category: Option<String>,
}

/// Endpoint: GET /api/products
async fn list_products(
    State(state): State<SharedState>,
    Query(params): Query<ProductQuery>,
) -> impl IntoResponse {
    let filters = SearchFilters {
        category: params.category,
        ..Default::default()
    };
    let products = state.catalog.search(&params.query, &filters);

    Json(json!({ "total": products.len(), "products": products }))
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    query: String,
    #[serde(default)]
    filters: SearchFilters,
}

/// Endpoint: POST /api/products/search
async fn search_products(
    State(state): State<SharedState>,
    Json(body): Json<SearchBody>,
) -> impl IntoResponse {
    let products = state.catalog.search(&body.query, &body.filters);

    Json(json!({
        "query": body.query,
        "total": products.len(),
        "products": products,
    }))
}

/// Endpoint: GET /api/products/:id
async fn get_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CommerceError> {
    let product = state
        .catalog
        .find(&id)
        .ok_or(CommerceError::ProductNotFound(id))?;

    Ok(Json(json!({ "product": product })))
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody {
    product_id: String,
    variant_id: Option<String>,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
struct QuantityBody {
    quantity: i64,
}

/// Endpoint: GET /api/cart
async fn get_cart(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    let cart = state.carts.get(&resolve_session_key(&headers));
    Json(json!({ "cart": cart }))
}

/// Endpoint: POST /api/cart/items
async fn add_cart_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<AddItemBody>,
) -> Result<impl IntoResponse, CommerceError> {
    let cart = state.carts.add_item(
        &resolve_session_key(&headers),
        &body.product_id,
        body.variant_id.as_deref(),
        body.quantity,
    )?;

    Ok(Json(json!({ "success": true, "cart": cart })))
}

/// Endpoint: PUT /api/cart/items/:product_id/:variant_id
async fn update_cart_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((product_id, variant_id)): Path<(String, String)>,
    Json(body): Json<QuantityBody>,
) -> Result<impl IntoResponse, CommerceError> {
    let cart = state.carts.update_quantity(
        &resolve_session_key(&headers),
        &product_id,
        &variant_id,
        body.quantity,
    )?;

    Ok(Json(json!({ "success": true, "cart": cart })))
}

/// Endpoint: DELETE /api/cart/items/:product_id/:variant_id
async fn remove_cart_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((product_id, variant_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, CommerceError> {
    let cart =
        state
            .carts
            .remove_item(&resolve_session_key(&headers), &product_id, &variant_id)?;

    Ok(Json(json!({ "success": true, "cart": cart })))
}

/// Endpoint: DELETE /api/cart
async fn clear_cart(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    let cart = state.carts.clear(&resolve_session_key(&headers));
    Json(json!({ "success": true, "cart": cart }))
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderBody {
    shipping_address: Address,
    #[serde(default)]
    payment_method: PaymentMethod,
    #[serde(default)]
    shipping_method: ShippingMethod,
}

/// Endpoint: POST /api/orders
/// Places a pending order for the caller's cart and takes the ordered lines out of it.
async fn create_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<CreateOrderBody>,
) -> Result<impl IntoResponse, CommerceError> {
    let session_key = resolve_session_key(&headers);
    let cart = state.carts.get(&session_key);

    let order = state.orders.create(
        &session_key,
        &cart,
        body.shipping_address,
        body.payment_method,
        body.shipping_method,
    )?;
    state.carts.remove_ordered(&session_key, &order.items);

    tracing::info!(
        order = %order.id,
        items = %format_item_summary(&order.items),
        "REST order placed"
    );

    let payment_url = (order.payment_method == PaymentMethod::Stripe)
        .then(|| format!("/api/orders/{}/pay", order.id));

    Ok(Json(json!({
        "success": true,
        "order": {
            "id": order.id,
            "total": order.total,
            "status": order.status,
            "paymentUrl": payment_url,
        }
    })))
}

/// Endpoint: GET /api/orders
async fn list_orders(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    let orders = state.orders.list_for(&resolve_session_key(&headers));
    Json(json!({ "orders": orders }))
}

/// Endpoint: GET /api/orders/:id
async fn get_order(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CommerceError> {
    let order = state
        .orders
        .get(&id)
        .ok_or(CommerceError::OrderNotFound(id))?;

    Ok(Json(json!({ "order": order })))
}

/// Endpoint: POST /api/orders/:id/pay
async fn pay_order(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CommerceError> {
    let order = state.orders.pay(&id)?;

    Ok(Json(json!({
        "success": true,
        "order": {
            "id": order.id,
            "status": order.status,
            "paymentStatus": order.payment_status,
            "trackingNumber": order.tracking_number,
        }
    })))
}

/// Endpoint: POST /api/orders/:id/cancel
async fn cancel_order(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CommerceError> {
    let order = state.orders.cancel(&id)?;
    Ok(Json(json!({ "success": true, "order": order })))
}

// =============================================================================
// Suppliers
// =============================================================================

/// Endpoint: GET /api/suppliers
async fn list_suppliers(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({ "suppliers": state.suppliers.list() }))
}

/// Endpoint: GET /api/suppliers/:id
async fn get_supplier(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CommerceError> {
    let supplier = state
        .suppliers
        .find(&id)
        .ok_or(CommerceError::SupplierNotFound(id))?;

    Ok(Json(json!({ "supplier": supplier })))
}

/// Endpoint: POST /api/suppliers/:id/sync
async fn start_supplier_sync(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CommerceError> {
    let job = state.suppliers.start_sync(&id)?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Inventory sync started for {}", job.supplier_id),
        "syncId": job.sync_id,
    })))
}

/// Endpoint: GET /api/suppliers/sync/:sync_id
async fn get_sync_status(
    State(state): State<SharedState>,
    Path(sync_id): Path<String>,
) -> Result<impl IntoResponse, CommerceError> {
    let job = state
        .suppliers
        .sync_status(&sync_id)
        .ok_or(CommerceError::SyncNotFound(sync_id))?;

    Ok(Json(job))
}
