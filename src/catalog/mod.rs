//! Product catalog: data model, HTTP client and client-side filtering

pub mod client;
pub mod retry;

use serde::{Deserialize, Serialize};

pub use client::CatalogClient;
pub use retry::RetryPolicy;

/// A product as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u64,
}

impl Product {
    /// Only absolute http(s) images are shown; anything else gets a placeholder.
    pub fn has_remote_image(&self) -> bool {
        self.image.starts_with("http")
    }

    pub fn display_price(&self) -> String {
        crate::format_price(self.price)
    }

    /// Case-insensitive match on title or category.
    /// `query_lower` must already be lowercased.
    fn matches(&self, query_lower: &str) -> bool {
        self.title.to_lowercase().contains(query_lower)
            || self.category.to_lowercase().contains(query_lower)
    }
}

/// Keep the products whose title or category contains `query`, ignoring case.
/// Listing order is preserved.
pub fn filter_products(products: Vec<Product>, query: &str) -> Vec<Product> {
    let query_lower = query.to_lowercase();
    products
        .into_iter()
        .filter(|p| p.matches(&query_lower))
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{Product, Rating};

    pub fn product(id: u64, title: &str, category: &str) -> Product {
        Product {
            id,
            title: title.to_string(),
            price: 10.0 * id as f64,
            description: format!("Description of {}", title),
            category: category.to_string(),
            image: format!("https://fakestoreapi.com/img/{}.jpg", id),
            rating: Rating {
                rate: 4.1,
                count: 120 + id,
            },
        }
    }

    pub fn catalog() -> Vec<Product> {
        vec![
            product(1, "Fjallraven Backpack", "men's clothing"),
            product(2, "Mens Casual Premium Slim Fit T-Shirts", "men's clothing"),
            product(5, "John Hardy Women's Legends Naga Bracelet", "jewelery"),
            product(9, "WD 2TB Elements Portable External Hard Drive", "electronics"),
            product(15, "BIYLACLESEN Women's 3-in-1 Snowboard Jacket", "women's clothing"),
        ]
    }
}
