//! Integration tests for the draft order relay.
//!
//! Each test starts its own relay on an ephemeral port, pointed at a
//! `wiremock` server standing in for the Shopify Admin API. Nothing outside
//! the process is contacted.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p draft-relay-integration-tests
//! ```

use std::net::SocketAddr;

use draft_relay::{app, config::RelayConfig, state::AppState};
use reqwest::{Client, Response};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Admin API path for draft order creation.
pub const DRAFT_ORDERS_PATH: &str = "/admin/api/2024-10/draft_orders.json";

/// Admin API path for a variant lookup.
#[must_use]
pub fn variant_path(id: i64) -> String {
    format!("/admin/variants/{id}.json")
}

/// A running relay wired to a mock Shopify.
pub struct TestContext {
    pub shopify: MockServer,
    pub client: Client,
    pub relay_addr: SocketAddr,
}

impl TestContext {
    /// Start a mock Shopify and a relay using default settings.
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Start a mock Shopify and a relay, overriding environment variables.
    ///
    /// `SHOPIFY_URL` and `SHOPIFY_ACCESS_TOKEN` are always provided.
    ///
    /// # Panics
    ///
    /// Panics if the relay cannot be configured or bound.
    pub async fn with_env(overrides: &[(&str, &str)]) -> Self {
        let shopify = MockServer::start().await;
        let shopify_url = shopify.uri();

        let config = RelayConfig::from_lookup(|key| match key {
            "SHOPIFY_URL" => Some(shopify_url.clone()),
            "SHOPIFY_ACCESS_TOKEN" => Some("shpat_integration_token".to_string()),
            _ => overrides
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string()),
        })
        .expect("Failed to build relay configuration");

        let state = AppState::new(config).expect("Failed to create application state");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind relay listener");
        let relay_addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, app(state))
                .await
                .expect("Relay server error");
        });

        Self {
            shopify,
            client: Client::new(),
            relay_addr,
        }
    }

    /// Full URL of a relay path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.relay_addr)
    }

    /// POST a raw body to `/create-draft-order`.
    ///
    /// # Panics
    ///
    /// Panics if the relay cannot be reached.
    pub async fn post_raw(&self, body: impl Into<reqwest::Body>) -> Response {
        self.client
            .post(self.url("/create-draft-order"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to reach relay")
    }

    /// POST a JSON submission to `/create-draft-order`.
    pub async fn post_json(&self, body: &Value) -> Response {
        self.post_raw(body.to_string()).await
    }

    /// Answer a variant lookup with the given product.
    pub async fn mount_variant(&self, id: i64, product_id: i64) {
        Mock::given(method("GET"))
            .and(path(variant_path(id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "variant": {"id": id, "product_id": product_id, "title": "Default"}
            })))
            .mount(&self.shopify)
            .await;
    }

    /// Answer a variant lookup with a status and no variant.
    pub async fn mount_variant_status(&self, id: i64, status: u16) {
        Mock::given(method("GET"))
            .and(path(variant_path(id)))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"errors": "Not Found"})),
            )
            .mount(&self.shopify)
            .await;
    }

    /// Accept draft orders and return the given invoice URL.
    pub async fn mount_draft_order(&self, invoice_url: &str) {
        Mock::given(method("POST"))
            .and(path(DRAFT_ORDERS_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "draft_order": {"id": 1_069_920_475, "invoice_url": invoice_url}
            })))
            .mount(&self.shopify)
            .await;
    }

    /// Reject draft orders with the given status.
    pub async fn mount_draft_order_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(DRAFT_ORDERS_PATH))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"errors": {"base": ["bad"]}})),
            )
            .mount(&self.shopify)
            .await;
    }

    /// The `draft_order` objects Shopify received, in order.
    ///
    /// # Panics
    ///
    /// Panics if request recording is disabled or a body is not JSON.
    pub async fn submitted_draft_orders(&self) -> Vec<Value> {
        self.shopify
            .received_requests()
            .await
            .expect("Request recording is disabled")
            .iter()
            .filter(|request| request.url.path() == DRAFT_ORDERS_PATH)
            .map(|request| {
                let body: Value =
                    serde_json::from_slice(&request.body).expect("Draft order body is not JSON");
                body.get("draft_order").cloned().unwrap_or(Value::Null)
            })
            .collect()
    }

    /// Number of requests Shopify received for a path.
    pub async fn shopify_calls(&self, request_path: &str) -> usize {
        self.shopify
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == request_path)
            .count()
    }
}
