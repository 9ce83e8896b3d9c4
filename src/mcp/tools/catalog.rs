//! Catalog tools: search, product detail and recommendations.

use super::{parse_input, ToolContext, ToolHandler};
use crate::commerce::models::{Product, SearchFilters, SortKey, SortOrder};
use crate::mcp::error::McpResult;
use crate::mcp::models::{InputSchema, ToolDescriptor};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;

const DEFAULT_SEARCH_LIMIT: usize = 10;
const MAX_SEARCH_LIMIT: usize = 50;
const DEFAULT_RECOMMENDATIONS: usize = 3;

/// Compact listing entry for search results
fn summary(product: &Product) -> Value {
    json!({
        "id": product.id,
        "name": product.name,
        "description": product.description,
        "price": product.price,
        "currency": product.currency,
        "category": product.category,
        "rating": product.rating,
        "inStock": product.inventory > 0,
        "image": product.images.first(),
    })
}

// =============================================================================
// search_products
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchInput {
    query: String,
    category: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    limit: Option<usize>,
    sort_by: Option<SortKey>,
    sort_order: Option<SortOrder>,
}

pub struct SearchProducts;

#[async_trait]
impl ToolHandler for SearchProducts {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "search_products".to_string(),
            description: "Search the product catalog by keyword with optional price range, \
                          category and sorting"
                .to_string(),
            input_schema: InputSchema::object(
                json!({
                    "query": { "type": "string", "description": "Search keywords; empty matches everything" },
                    "category": { "type": "string" },
                    "minPrice": { "type": "number", "minimum": 0 },
                    "maxPrice": { "type": "number", "minimum": 0 },
                    "limit": { "type": "integer", "minimum": 1, "description": "Maximum results (default 10, max 50)" },
                    "sortBy": { "type": "string", "enum": ["price", "rating", "name"] },
                    "sortOrder": { "type": "string", "enum": ["asc", "desc"] },
                }),
                &["query"],
            ),
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: Value) -> McpResult<Value> {
        let input: SearchInput = parse_input(arguments)?;

        let filters = SearchFilters {
            category: input.category,
            min_price: input.min_price,
            max_price: input.max_price,
            sort_by: input.sort_by,
            sort_order: input.sort_order.unwrap_or_default(),
            limit: Some(
                input
                    .limit
                    .unwrap_or(DEFAULT_SEARCH_LIMIT)
                    .min(MAX_SEARCH_LIMIT),
            ),
        };

        let products = ctx.state.catalog.search(&input.query, &filters);
        tracing::debug!(query = %input.query, hits = products.len(), "Product search");

        Ok(json!({
            "success": true,
            "query": input.query,
            "total": products.len(),
            "products": products.iter().map(summary).collect::<Vec<_>>(),
        }))
    }
}

// =============================================================================
// get_product_details
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductInput {
    product_id: String,
}

pub struct GetProductDetails;

#[async_trait]
impl ToolHandler for GetProductDetails {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_product_details".to_string(),
            description: "Get full details of a product including variants, stock and rating"
                .to_string(),
            input_schema: InputSchema::object(
                json!({ "productId": { "type": "string" } }),
                &["productId"],
            ),
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: Value) -> McpResult<Value> {
        let input: ProductInput = parse_input(arguments)?;

        Ok(match ctx.state.catalog.find(&input.product_id) {
            Some(product) => json!({ "found": true, "product": product }),
            None => json!({
                "found": false,
                "productId": input.product_id,
                "message": format!("No product with id {}", input.product_id),
            }),
        })
    }
}

// =============================================================================
// get_recommendations
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationInput {
    #[serde(alias = "basedOn")]
    product_id: Option<String>,
    limit: Option<usize>,
}

/// Suggests in-stock products. Seeds the choice from one product when given,
/// otherwise from the categories already in the caller's cart.
pub struct GetRecommendations;

#[async_trait]
impl ToolHandler for GetRecommendations {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_recommendations".to_string(),
            description: "Recommend related in-stock products for a product or the current cart"
                .to_string(),
            input_schema: InputSchema::object(
                json!({
                    "productId": { "type": "string" },
                    "basedOn": { "type": "string", "description": "Alias of productId" },
                    "limit": { "type": "integer", "minimum": 1 },
                }),
                &[],
            ),
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: Value) -> McpResult<Value> {
        let input: RecommendationInput = parse_input(arguments)?;
        let limit = input.limit.unwrap_or(DEFAULT_RECOMMENDATIONS);

        let (categories, exclude): (HashSet<String>, HashSet<String>) = match &input.product_id {
            Some(id) => match ctx.state.catalog.find(id) {
                Some(product) => (
                    HashSet::from([product.category.clone()]),
                    HashSet::from([product.id.clone()]),
                ),
                None => {
                    return Ok(json!({
                        "success": false,
                        "found": false,
                        "message": format!("No product with id {id}"),
                    }))
                }
            },
            None => {
                let cart = ctx.state.carts.get(&ctx.session_key);
                let in_cart: HashSet<String> =
                    cart.items.iter().map(|i| i.product_id.clone()).collect();
                let categories = in_cart
                    .iter()
                    .filter_map(|id| ctx.state.catalog.find(id))
                    .map(|p| p.category)
                    .collect();
                (categories, in_cart)
            }
        };

        let recommendations = recommend(ctx.state.catalog.list(), &categories, &exclude, limit);

        Ok(json!({
            "success": true,
            "basedOn": input.product_id,
            "recommendations": recommendations.iter().map(summary).collect::<Vec<_>>(),
        }))
    }
}

/// Same-category products first, then everything else; best rated first
/// within each group.
fn recommend(
    mut products: Vec<Product>,
    categories: &HashSet<String>,
    exclude: &HashSet<String>,
    limit: usize,
) -> Vec<Product> {
    products.retain(|p| p.inventory > 0 && !exclude.contains(&p.id));
    products.sort_by(|a, b| {
        let a_related = categories.contains(&a.category);
        let b_related = categories.contains(&b.category);
        b_related
            .cmp(&a_related)
            .then_with(|| b.rating.total_cmp(&a.rating))
    });
    products.truncate(limit);
    products
}
