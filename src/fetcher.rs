//! Background fetching for the interactive UI
//!
//! At most one request is in flight. Dispatching a new query aborts the
//! previous task, and aborted tasks report nothing. Results come back over a
//! channel that the UI loop drains on every tick.

use crate::catalog::{CatalogClient, Product};
use crate::error::{Result, SearchError};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::debug;

/// Messages from the background fetch task
#[derive(Debug, Clone, PartialEq)]
pub enum FetchMessage {
    Loaded { query: String, products: Vec<Product> },
    Failed { query: String, error: String },
}

impl FetchMessage {
    pub fn query(&self) -> &str {
        match self {
            FetchMessage::Loaded { query, .. } | FetchMessage::Failed { query, .. } => query,
        }
    }
}

/// Issues catalog queries on behalf of the UI
pub trait QueryDispatcher {
    /// Start fetching `query`, cancelling whatever was in flight
    fn dispatch(&mut self, query: &str);

    /// Abort the in-flight request, if any
    fn cancel(&mut self);

    /// The query currently being fetched
    fn in_flight(&self) -> Option<&str>;

    /// Next completed result, without blocking
    fn try_recv(&mut self) -> Option<FetchMessage>;
}

struct InFlight {
    query: String,
    handle: JoinHandle<()>,
}

pub struct Fetcher {
    runtime: Runtime,
    client: Arc<CatalogClient>,
    sender: Sender<FetchMessage>,
    receiver: Receiver<FetchMessage>,
    current: Option<InFlight>,
}

impl Fetcher {
    pub fn new(client: CatalogClient) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("prodsearch-fetch")
            .enable_all()
            .build()
            .map_err(|e| SearchError::Runtime(e.to_string()))?;

        let (sender, receiver) = channel();

        Ok(Self {
            runtime,
            client: Arc::new(client),
            sender,
            receiver,
            current: None,
        })
    }
}

impl QueryDispatcher for Fetcher {
    fn dispatch(&mut self, query: &str) {
        self.cancel();

        let client = Arc::clone(&self.client);
        let tx = self.sender.clone();
        let owned = query.to_string();

        debug!("Dispatching fetch for '{}'", query);
        let handle = self.runtime.spawn(async move {
            let msg = match client.search(&owned).await {
                Ok(products) => FetchMessage::Loaded {
                    query: owned,
                    products,
                },
                Err(e) => FetchMessage::Failed {
                    query: owned,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(msg);
        });

        self.current = Some(InFlight {
            query: query.to_string(),
            handle,
        });
    }

    fn cancel(&mut self) {
        if let Some(prev) = self.current.take() {
            if !prev.handle.is_finished() {
                debug!("Request for '{}' was aborted", prev.query);
                prev.handle.abort();
            }
        }
    }

    fn in_flight(&self) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|c| !c.handle.is_finished())
            .map(|c| c.query.as_str())
    }

    fn try_recv(&mut self) -> Option<FetchMessage> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Fetcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RetryPolicy;
    use crate::config::CatalogConfig;
    use mockito::{Matcher, Server};
    use std::io::Write;
    use std::time::{Duration, Instant};

    fn fetcher_for(server: &Server) -> Fetcher {
        let config = CatalogConfig {
            base_url: server.url(),
            ..CatalogConfig::default()
        };
        let client = CatalogClient::new(&config)
            .unwrap()
            .with_retry(RetryPolicy::none());
        Fetcher::new(client).unwrap()
    }

    fn wait_for_message(fetcher: &mut Fetcher) -> FetchMessage {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(msg) = fetcher.try_recv() {
                return msg;
            }
            assert!(Instant::now() < deadline, "no fetch result within 5s");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn loaded_results_are_filtered() {
        let mut server = Server::new();
        server
            .mock("GET", "/products")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"[{"id":5,"title":"Naga Bracelet","price":695,"category":"jewelery"},
                    {"id":9,"title":"Hard Drive","price":64,"category":"electronics"}]"#,
            )
            .create();

        let mut fetcher = fetcher_for(&server);
        fetcher.dispatch("brace");

        match wait_for_message(&mut fetcher) {
            FetchMessage::Loaded { query, products } => {
                assert_eq!(query, "brace");
                assert_eq!(products.len(), 1);
                assert_eq!(products[0].id, 5);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn failures_carry_the_error_string() {
        let mut server = Server::new();
        server
            .mock("GET", "/products")
            .match_query(Matcher::Any)
            .with_status(500)
            .create();

        let mut fetcher = fetcher_for(&server);
        fetcher.dispatch("shirt");

        let msg = wait_for_message(&mut fetcher);
        assert_eq!(msg.query(), "shirt");
        assert!(matches!(msg, FetchMessage::Failed { ref error, .. } if error.contains("500")));
    }

    const BAG: &str = r#"[{"id":1,"title":"Bag","price":10,"category":"bags"}]"#;

    /// Listing that holds the body back for `delay`
    fn slow_listing(server: &mut Server, delay: Duration) -> mockito::Mock {
        server
            .mock("GET", "/products")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_chunked_body(move |w| {
                std::thread::sleep(delay);
                w.write_all(BAG.as_bytes())
            })
            .expect(1)
            .create()
    }

    #[test]
    fn cancelled_requests_report_nothing() {
        let mut server = Server::new();
        let _slow = slow_listing(&mut server, Duration::from_millis(500));

        let mut fetcher = fetcher_for(&server);
        fetcher.dispatch("bag");
        std::thread::sleep(Duration::from_millis(100));
        fetcher.cancel();
        assert_eq!(fetcher.in_flight(), None);

        std::thread::sleep(Duration::from_millis(900));
        assert_eq!(fetcher.try_recv(), None);
    }

    #[test]
    fn new_dispatch_supersedes_the_previous_request() {
        let mut server = Server::new();
        let _slow = slow_listing(&mut server, Duration::from_millis(800));
        server
            .mock("GET", "/products")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(BAG)
            .create();

        let mut fetcher = fetcher_for(&server);
        fetcher.dispatch("a");
        std::thread::sleep(Duration::from_millis(100));
        fetcher.dispatch("b");
        assert_eq!(fetcher.in_flight(), Some("b"));

        match wait_for_message(&mut fetcher) {
            FetchMessage::Loaded { query, products } => {
                assert_eq!(query, "b");
                assert_eq!(products.len(), 1);
            }
            other => panic!("unexpected message {:?}", other),
        }

        std::thread::sleep(Duration::from_millis(1200));
        assert_eq!(fetcher.try_recv(), None);
    }
}
