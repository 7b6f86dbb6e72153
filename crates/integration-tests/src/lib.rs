//! Integration test harness for the Soar storefront.
//!
//! Each test gets its own in-process fake commerce backend and storefront,
//! both bound to ephemeral ports on `127.0.0.1`, plus a `reqwest` client with
//! a cookie store so the storefront session survives across requests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p soar-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::{Client, redirect::Policy};
use secrecy::SecretString;
use serde_json::{Value, json};
use soar_storefront::config::{CommerceConfig, StorefrontConfig};
use soar_storefront::state::AppState;

/// API key the storefront is configured with and the fake backend expects.
pub const TEST_API_KEY: &str = "sk_live_7fQ2xL9mVr4Tz8Kp";

/// Hosted payment page origin returned by the fake backend.
pub const PAYMENT_ORIGIN: &str = "https://pay.soar.test";

/// Inbox the storefront is configured to send contact form mail to.
pub const CONTACT_INBOX: &str = "shop@soar.test";

/// A webhook as the fake backend received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedWebhook {
    pub signature: Option<String>,
    pub body: Vec<u8>,
}

/// Everything the fake backend saw.
#[derive(Default)]
struct Recorded {
    payment_link_calls: AtomicUsize,
    payment_requests: Mutex<Vec<Value>>,
    product_queries: Mutex<Vec<Option<String>>>,
    product_list_calls: AtomicUsize,
    webhooks: Mutex<Vec<RelayedWebhook>>,
    emails: Mutex<Vec<Value>>,
    fail_payments: AtomicBool,
    products: Mutex<Value>,
}

/// In-process stand-in for the commerce backend.
#[derive(Clone)]
pub struct FakeBackend {
    pub url: String,
    recorded: Arc<Recorded>,
}

impl FakeBackend {
    /// Start a fake backend serving `products`.
    pub async fn start(products: Value) -> Self {
        let recorded = Arc::new(Recorded {
            products: Mutex::new(products),
            ..Recorded::default()
        });

        let router = Router::new()
            .route("/api/v1/products", get(list_products))
            .route("/api/v1/products/{id}", get(get_product))
            .route("/api/v1/payments/create-payment-link", post(create_payment_link))
            .route("/api/v1/payments/webhook", post(webhook))
            .route("/api/v1/send", post(send_email))
            .with_state(Arc::clone(&recorded));

        let addr = serve(router).await;
        Self {
            url: format!("http://{addr}"),
            recorded,
        }
    }

    /// Make every subsequent payment-link request fail with a 500.
    pub fn fail_payments(&self) {
        self.recorded.fail_payments.store(true, Ordering::SeqCst);
    }

    /// Replace the product list.
    pub fn set_products(&self, products: Value) {
        *self.recorded.products.lock().expect("products lock") = products;
    }

    /// Number of payment-link requests received, including failed ones.
    #[must_use]
    pub fn payment_link_calls(&self) -> usize {
        self.recorded.payment_link_calls.load(Ordering::SeqCst)
    }

    /// Bodies of accepted payment-link requests.
    #[must_use]
    pub fn payment_requests(&self) -> Vec<Value> {
        self.recorded
            .payment_requests
            .lock()
            .expect("payment requests lock")
            .clone()
    }

    /// Query strings received on the product list endpoint.
    #[must_use]
    pub fn product_queries(&self) -> Vec<Option<String>> {
        self.recorded
            .product_queries
            .lock()
            .expect("product queries lock")
            .clone()
    }

    /// Number of product list requests received.
    #[must_use]
    pub fn product_list_calls(&self) -> usize {
        self.recorded.product_list_calls.load(Ordering::SeqCst)
    }

    /// Webhooks received.
    #[must_use]
    pub fn webhooks(&self) -> Vec<RelayedWebhook> {
        self.recorded.webhooks.lock().expect("webhooks lock").clone()
    }

    /// Bodies of email requests received.
    #[must_use]
    pub fn emails(&self) -> Vec<Value> {
        self.recorded.emails.lock().expect("emails lock").clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == TEST_API_KEY)
}

async fn list_products(
    State(recorded): State<Arc<Recorded>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    recorded.product_list_calls.fetch_add(1, Ordering::SeqCst);
    recorded
        .product_queries
        .lock()
        .expect("product queries lock")
        .push(query);
    let products = recorded.products.lock().expect("products lock").clone();
    Json(products).into_response()
}

async fn get_product(
    State(recorded): State<Arc<Recorded>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let products = recorded.products.lock().expect("products lock").clone();
    products
        .as_array()
        .and_then(|list| list.iter().find(|p| p["id"] == id.as_str()).cloned())
        .map_or_else(
            || (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found"}))).into_response(),
            |product| Json(product).into_response(),
        )
}

async fn create_payment_link(
    State(recorded): State<Arc<Recorded>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let call = recorded.payment_link_calls.fetch_add(1, Ordering::SeqCst) + 1;
    if recorded.fail_payments.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "payment provider down").into_response();
    }
    recorded
        .payment_requests
        .lock()
        .expect("payment requests lock")
        .push(body);
    Json(json!({"url": format!("{PAYMENT_ORIGIN}/session/{call}")})).into_response()
}

async fn webhook(
    State(recorded): State<Arc<Recorded>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    recorded
        .webhooks
        .lock()
        .expect("webhooks lock")
        .push(RelayedWebhook {
            signature,
            body: body.to_vec(),
        });
    StatusCode::OK
}

async fn send_email(
    State(recorded): State<Arc<Recorded>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    recorded.emails.lock().expect("emails lock").push(body);
    Json(json!({"status": "sent"})).into_response()
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server error");
    });
    addr
}

/// A running storefront wired to a fake backend.
pub struct TestContext {
    pub backend: FakeBackend,
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a storefront against a fresh fake backend with `sample_products`.
    pub async fn new() -> Self {
        Self::with_products(sample_products()).await
    }

    /// Start a storefront against a fresh fake backend with `products`.
    pub async fn with_products(products: Value) -> Self {
        let backend = FakeBackend::start(products).await;
        let config = test_config(&backend.url);
        let state = AppState::new(config).expect("Failed to build application state");
        let addr = serve(soar_storefront::app(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            backend,
            client,
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET` a path and decode the JSON body.
    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = response.status();
        (status, response.json().await.expect("Body is not JSON"))
    }

    /// `POST` a JSON body and decode the JSON response.
    pub async fn post_json(&self, path: &str, body: &Value) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed");
        let status = response.status();
        (status, response.json().await.expect("Body is not JSON"))
    }

    /// `DELETE` a path and decode the JSON response.
    pub async fn delete_json(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = response.status();
        (status, response.json().await.expect("Body is not JSON"))
    }

    /// Add `quantity` of a product to the cart.
    pub async fn add_item(&self, id: &str, title: &str, price: f64, quantity: i64) -> Value {
        let (status, body) = self
            .post_json(
                "/api/cart/items",
                &json!({"id": id, "title": title, "price": price, "quantity": quantity}),
            )
            .await;
        assert_eq!(status, reqwest::StatusCode::OK, "add item failed: {body}");
        body
    }
}

/// Storefront configuration pointing at `backend_url`.
#[must_use]
pub fn test_config(backend_url: &str) -> StorefrontConfig {
    let base_url = "http://127.0.0.1:3000".to_string();
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        commerce: CommerceConfig {
            backend_base_url: backend_url.to_string(),
            api_key: SecretString::from(TEST_API_KEY),
            success_url: format!("{base_url}/checkout/success"),
            cancel_url: format!("{base_url}/cart"),
            request_timeout: Duration::from_secs(5),
        },
        base_url,
        category_cache_ttl: Duration::from_secs(60),
        contact_recipient: CONTACT_INBOX.to_string(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A small catalog across three categories, one product inactive.
#[must_use]
pub fn sample_products() -> Value {
    json!([
        {"id": "p-lamp", "name": "Brass Lamp", "price": 45.0, "category": "Home Goods", "subcategory": "Lighting", "is_active": true},
        {"id": "p-vase", "name": "Vase", "price": 19.99, "category": "Home Goods", "subcategory": "Decor", "is_active": true},
        {"id": "p-coat", "name": "Wool Coat", "price": 120, "category": "Clothing", "subcategory": "Outerwear", "is_active": true},
        {"id": "p-clock", "name": "Mantel Clock", "price": "310.00", "category": "Art & Antiques", "is_active": true},
        {"id": "p-old", "name": "Retired Hat", "price": 5, "category": "Hats", "subcategory": "Caps", "is_active": false}
    ])
}
