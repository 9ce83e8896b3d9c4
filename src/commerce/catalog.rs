//! Product catalog collaborator.

use super::models::{Product, ProductVariant, SearchFilters, SortKey, SortOrder};
use std::cmp::Ordering;

/// Read access to the product catalog.
pub trait Catalog: Send + Sync {
    /// Looks up one product by id.
    fn find(&self, id: &str) -> Option<Product>;

    /// Products matching `query` (empty means no text filter) and `filters`.
    fn search(&self, query: &str, filters: &SearchFilters) -> Vec<Product>;

    /// Every product, in catalog order.
    fn list(&self) -> Vec<Product>;
}

/// Immutable catalog held in memory
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Catalog pre-loaded with the demo products.
    pub fn seeded() -> Self {
        Self::new(seed_products())
    }
}

impl Catalog for InMemoryCatalog {
    fn find(&self, id: &str) -> Option<Product> {
        self.products.iter().find(|p| p.id == id).cloned()
    }

    fn search(&self, query: &str, filters: &SearchFilters) -> Vec<Product> {
        let mut result: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.matches(query))
            .filter(|p| {
                filters
                    .category
                    .as_deref()
                    .map_or(true, |c| p.category.eq_ignore_ascii_case(c))
            })
            .filter(|p| filters.min_price.map_or(true, |min| p.price >= min))
            .filter(|p| filters.max_price.map_or(true, |max| p.price <= max))
            .cloned()
            .collect();

        if let Some(key) = filters.sort_by {
            result.sort_by(|a, b| {
                let ord = compare_by(key, a, b);
                match filters.sort_order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = filters.limit {
            result.truncate(limit);
        }

        result
    }

    fn list(&self) -> Vec<Product> {
        self.products.clone()
    }
}

fn compare_by(key: SortKey, a: &Product, b: &Product) -> Ordering {
    match key {
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::Rating => a.rating.total_cmp(&b.rating),
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    }
}

fn variant(id: &str, name: &str, sku: &str, price_adjustment: f64) -> ProductVariant {
    ProductVariant {
        id: id.to_string(),
        name: name.to_string(),
        sku: sku.to_string(),
        price_adjustment,
    }
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    name: &str,
    description: &str,
    price: f64,
    category: &str,
    tags: &[&str],
    inventory: u32,
    variants: Vec<ProductVariant>,
    rating: f64,
    review_count: u32,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        currency: super::helpers::CURRENCY.to_string(),
        category: category.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        inventory,
        images: vec![format!("https://example.com/images/{id}.jpg")],
        variants,
        rating,
        review_count,
    }
}

/// The demo catalog.
pub fn seed_products() -> Vec<Product> {
    vec![
        product(
            "prod-001",
            "Wireless Bluetooth Headphones",
            "Over-ear noise cancelling headphones with 30 hour battery life",
            79.99,
            "Electronics",
            &["audio", "wireless", "headphones", "bluetooth"],
            100,
            vec![
                variant("var-001", "Black", "WBH-BLK", 0.0),
                variant("var-002", "Red", "WBH-RED", 5.0),
            ],
            4.5,
            1284,
        ),
        product(
            "prod-002",
            "Aluminium Laptop Stand",
            "Adjustable ergonomic laptop stand for 11 to 17 inch laptops",
            49.99,
            "Accessories",
            &["laptop", "stand", "desk", "ergonomic"],
            40,
            vec![
                variant("var-003", "Silver", "ALS-SLV", 0.0),
                variant("var-004", "Space Grey", "ALS-GRY", 0.0),
            ],
            4.2,
            532,
        ),
        product(
            "prod-003",
            "UltraBook Pro 14 Laptop",
            "14 inch laptop with 16GB RAM and 512GB SSD",
            999.99,
            "Electronics",
            &["laptop", "computer", "notebook"],
            15,
            vec![
                variant("var-005", "16GB / 512GB", "UBP-16-512", 0.0),
                variant("var-006", "32GB / 1TB", "UBP-32-1T", 300.0),
            ],
            4.7,
            211,
        ),
        product(
            "prod-004",
            "Ergonomic Wireless Mouse",
            "Silent-click wireless mouse with USB receiver",
            29.99,
            "Accessories",
            &["mouse", "wireless", "ergonomic"],
            250,
            vec![variant("var-007", "Graphite", "EWM-GRA", 0.0)],
            4.4,
            3120,
        ),
        product(
            "prod-005",
            "Smart Watch Pro",
            "Fitness and health tracking smart watch with voice assistant",
            299.99,
            "Electronics",
            &["watch", "fitness", "wearable"],
            60,
            vec![
                variant("var-008", "42mm", "SWP-42", 0.0),
                variant("var-009", "46mm", "SWP-46", 20.0),
            ],
            4.6,
            874,
        ),
        product(
            "out-of-stock-prod",
            "Limited Edition Mechanical Keyboard",
            "Hot-swappable mechanical keyboard, sold out",
            149.99,
            "Accessories",
            &["keyboard", "mechanical"],
            0,
            vec![variant("var-001", "Standard", "LEK-STD", 0.0)],
            4.9,
            96,
        ),
    ]
}
