//! prodsearch - terminal product search
//!
//! A search box that queries a remote product catalog as you type.
//!
//! # Features
//!
//! - **Debounced queries**: requests start once the input has been still for a moment
//! - **Client-side filtering**: title or category match, ignoring case
//! - **Query cache**: results are reused per query until they go stale
//! - **Virtualized dropdown**: only the visible suggestions are rendered
//! - **Keyboard and mouse navigation** with a detail panel for the chosen product
//!
//! # Example
//!
//! ```no_run
//! use prodsearch::{AppConfig, CatalogClient};
//!
//! #[tokio::main]
//! async fn main() -> prodsearch::Result<()> {
//!     let config = AppConfig::default();
//!     let client = CatalogClient::new(&config.catalog)?;
//!
//!     for product in client.search("jacket").await? {
//!         println!("{} - {}", product.title, product.display_price());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod tui;

// Re-export main types
pub use cache::{CacheLookup, QueryCache};
pub use catalog::{filter_products, CatalogClient, Product, Rating, RetryPolicy};
pub use config::AppConfig;
pub use debounce::Debouncer;
pub use error::{Result, SearchError};
pub use fetcher::{FetchMessage, Fetcher, QueryDispatcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format a price the way the catalog shows it: `$` and the shortest decimal form
pub fn format_price(price: f64) -> String {
    format!("${}", price)
}
