//! Commerce backend API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`, every request authenticated with `X-API-Key`
//! - The backend is the source of truth for products and payments - NO local
//!   product storage
//! - The derived category tree is cached via `moka` (see [`CategoryCache`])
//!
//! # Endpoints
//!
//! All paths live under `{SOAR_API_URL}/api/v1`:
//!
//! ```text
//! GET  /products                       - product list (query string forwarded)
//! GET  /products/{id}                  - product detail
//! POST /payments/create-payment-link   - hosted payment page for an order
//! POST /payments/webhook               - payment provider webhook relay
//! POST /send                           - outbound email (contact form)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use soar_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.commerce)?;
//! let products = client.products().await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use cache::{CategoryCache, build_category_tree, category_slug};
pub use client::{BackendClient, WEBHOOK_SIGNATURE_HEADER};
pub use types::*;

use soar_core::{PaymentLink, PaymentLinkRequest};
use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configured base URL or API key cannot be used.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Creates hosted payment links.
///
/// [`BackendClient`] is the production implementation; the checkout
/// orchestrator is generic over this trait so it can be driven without a
/// network.
pub trait PaymentLinkApi: Send + Sync {
    /// Submit a single payment-link request.
    fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> impl Future<Output = Result<PaymentLink, BackendError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = BackendError::Api {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - maintenance");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
