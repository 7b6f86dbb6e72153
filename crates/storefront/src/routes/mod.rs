//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Health check
//!
//! # Cart (JSON, session-scoped)
//! GET    /api/cart                      - Cart snapshot
//! POST   /api/cart/items                - Add item
//! POST   /api/cart/items/{id}           - Set quantity (<= 0 removes)
//! DELETE /api/cart/items/{id}           - Remove item
//! DELETE /api/cart                      - Clear cart
//!
//! # Checkout
//! POST   /api/checkout                  - Create payment link, returns {url}
//! POST   /checkout                      - Create payment link, 303 to it
//! GET    /checkout/success              - Return from payment (?session_id=)
//!
//! # Catalog (backend proxy)
//! GET    /api/products                  - Product list (query forwarded)
//! GET    /api/products/{id}             - Product detail
//! GET    /api/categories                - Category tree (cached)
//! POST   /api/categories/refresh        - Rebuild category tree (rate limited)
//!
//! # Contact
//! POST   /api/contact                   - Email the shop inbox (rate limited)
//!
//! # Webhooks
//! POST   /api/webhooks/payments         - Relay to backend with signature
//! ```

pub mod cart;
pub mod checkout;
pub mod contact;
pub mod products;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::rate_limiter;
use crate::state::AppState;

/// Create the cart API router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{id}",
            post(cart::set_quantity).delete(cart::remove),
        )
}

/// Create the checkout routes, rate limited per client IP.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/api/checkout", post(checkout::create))
        .route("/checkout", post(checkout::redirect))
        .layer(rate_limiter())
        .route("/checkout/success", get(checkout::success))
}

/// Create the catalog proxy router.
///
/// Only the refresh is rate limited; it forces a full product fetch.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories/refresh", post(products::refresh_categories))
        .layer(rate_limiter())
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories))
}

/// Create the contact form router, rate limited per client IP.
pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact", post(contact::send))
        .layer(rate_limiter())
}

/// Create the main storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/cart", cart_routes())
        .nest("/api", catalog_routes())
        .route("/api/webhooks/payments", post(webhooks::payments))
        .merge(checkout_routes())
        .merge(contact_routes())
}
