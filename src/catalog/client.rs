use super::retry::RetryPolicy;
use super::{filter_products, Product};
use crate::config::CatalogConfig;
use crate::error::{Result, SearchError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("prodsearch/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the product listing endpoint.
///
/// The endpoint has no server-side search, so every query fetches the same
/// fixed-size page and filters it locally.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    products_url: Url,
    retry: RetryPolicy,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let products_url = products_url(&config.base_url, config.limit)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            products_url,
            retry: RetryPolicy::new(
                config.max_retries,
                config.retry_base_ms,
                config.retry_max_ms,
            ),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch the product page, retrying transient failures.
    pub async fn fetch_products(&self) -> Result<Vec<Product>> {
        self.retry
            .execute("fetch_products", || self.fetch_once())
            .await
    }

    /// Products whose title or category contains `query`.
    /// An empty query never touches the network.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let products = self.fetch_products().await?;
        let total = products.len();
        let hits = filter_products(products, query);
        info!("Query '{}' matched {} of {} products", query, hits.len(), total);
        Ok(hits)
    }

    async fn fetch_once(&self) -> Result<Vec<Product>> {
        debug!("GET {}", self.products_url);

        let response = self.client.get(self.products_url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status { status });
        }

        let body = response.bytes().await?;
        let products: Vec<Product> = serde_json::from_slice(&body)?;
        Ok(products)
    }
}

/// `{base}/products?limit={limit}`, keeping any path prefix on `base`.
fn products_url(base_url: &str, limit: usize) -> Result<Url> {
    let raw = format!("{}/products", base_url.trim_end_matches('/'));
    let mut url = Url::parse(&raw).map_err(|e| SearchError::InvalidUrl(raw.clone(), e))?;
    url.query_pairs_mut()
        .append_pair("limit", &limit.to_string());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn listing() -> serde_json::Value {
        json!([
            {
                "id": 1,
                "title": "Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops",
                "price": 109.95,
                "description": "Your perfect pack for everyday use",
                "category": "men's clothing",
                "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
                "rating": { "rate": 3.9, "count": 120 }
            },
            {
                "id": 9,
                "title": "WD 2TB Elements Portable External Hard Drive - USB 3.0",
                "price": 64,
                "description": "USB 3.0 and USB 2.0 compatibility",
                "category": "electronics",
                "image": "https://fakestoreapi.com/img/61IBBVJvSDL._AC_SY879_.jpg",
                "rating": { "rate": 3.3, "count": 203 }
            }
        ])
    }

    fn client_for(server: &Server) -> CatalogClient {
        let config = CatalogConfig {
            base_url: server.url(),
            ..CatalogConfig::default()
        };
        CatalogClient::new(&config)
            .unwrap()
            .with_retry(RetryPolicy::new(3, 1, 5))
    }

    #[test]
    fn builds_listing_url_with_limit() {
        let url = products_url("https://fakestoreapi.com/", 15).unwrap();
        assert_eq!(url.as_str(), "https://fakestoreapi.com/products?limit=15");

        let url = products_url("http://localhost:9000/api", 3).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/products?limit=3");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            products_url("not a url", 15),
            Err(SearchError::InvalidUrl(_, _))
        ));
    }

    #[tokio::test]
    async fn search_filters_fetched_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/products")
            .match_query(Matcher::UrlEncoded("limit".into(), "15".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(listing().to_string())
            .create_async()
            .await;

        let hits = client_for(&server).search("ELECTRONICS").await.unwrap();

        mock.assert_async().await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 9);
        assert_eq!(hits[0].price, 64.0);
    }

    #[tokio::test]
    async fn empty_query_skips_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/products")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let hits = client_for(&server).search("").await.unwrap();

        assert!(hits.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_error_status_is_reported_without_retry() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/products")
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let err = client_for(&server).fetch_products().await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, SearchError::Status { status } if status.as_u16() == 404));
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/products")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(4)
            .create_async()
            .await;

        let err = client_for(&server).fetch_products().await.unwrap_err();

        mock.assert_async().await;
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/products")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{\"not\": \"a list\"}")
            .create_async()
            .await;

        let err = client_for(&server).fetch_products().await.unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }
}
