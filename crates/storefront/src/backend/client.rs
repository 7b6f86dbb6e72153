//! REST client for the commerce backend.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use soar_core::{PaymentLink, PaymentLinkRequest, ProductId};
use tracing::{debug, instrument};
use url::Url;

use super::{BackendError, EmailMessage, PaymentLinkApi, Product};
use crate::config::CommerceConfig;

/// Header carrying the backend API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Path prefix for every backend endpoint.
const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Maximum number of response-body characters kept in errors and logs.
const ERROR_BODY_LIMIT: usize = 200;

/// Payment provider header carrying the webhook signature.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "stripe-signature";

/// Client for the commerce backend REST API.
///
/// Cheaply cloneable; the underlying connection pool is shared.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL or API key is unusable, or the HTTP
    /// client fails to build.
    pub fn new(config: &CommerceConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(&config.backend_base_url)
            .map_err(|e| BackendError::Config(format!("invalid backend URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Config(format!(
                "backend URL cannot be a base: {base_url}"
            )));
        }

        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| BackendError::Config(format!("invalid API key format: {e}")))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner { client, base_url }),
        })
    }

    /// Build `{base}/api/v1/{segments...}`; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        url
    }

    /// Turn a non-success response into a `BackendError`.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(url));
        }

        let message = truncate_body(&body);
        tracing::error!(
            status = %status,
            path = %url,
            body = %message,
            "Backend returned non-success status"
        );
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Fetch the raw product list, forwarding an optional query string.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        query: Option<&str>,
    ) -> Result<serde_json::Value, BackendError> {
        let mut url = self.endpoint(&["products"]);
        url.set_query(query.filter(|q| !q.is_empty()));

        let response = self.inner.client.get(url).send().await?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Fetch every product as typed records.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a record does not decode.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, BackendError> {
        let raw = self.list_products(None).await?;
        let products: Vec<Product> =
            serde_json::from_value(raw).map_err(|e| BackendError::Parse(e.to_string()))?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Fetch a single raw product record.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` for unknown IDs, or another error if
    /// the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<serde_json::Value, BackendError> {
        let url = self.endpoint(&["products", id.as_str()]);

        let response = self.inner.client.get(url).send().await?;
        let response = match Self::check(response).await {
            Err(BackendError::NotFound(_)) => {
                return Err(BackendError::NotFound(format!("Product not found: {id}")));
            }
            other => other?,
        };
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    // =========================================================================
    // Payment Methods
    // =========================================================================

    /// Relay a payment-provider webhook to the backend unchanged.
    ///
    /// The provider's signature header travels with the body so the backend
    /// can verify it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(
        skip(self, body, signature),
        fields(body_len = body.len(), signed = signature.is_some())
    )]
    pub async fn forward_webhook(
        &self,
        body: Vec<u8>,
        signature: Option<&HeaderValue>,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["payments", "webhook"]);

        let mut request = self
            .inner
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(signature) = signature {
            request = request.header(WEBHOOK_SIGNATURE_HEADER, signature.clone());
        }

        let response = request.body(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Email Methods
    // =========================================================================

    /// Send an email through the backend mailer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, email), fields(recipients = email.to.len()))]
    pub async fn send_email(&self, email: &EmailMessage) -> Result<(), BackendError> {
        let url = self.endpoint(&["send"]);

        let response = self.inner.client.post(url).json(email).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Keep at most `ERROR_BODY_LIMIT` characters of a response body.
fn truncate_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

impl PaymentLinkApi for BackendClient {
    #[instrument(
        skip(self, request),
        fields(order_id = %request.order_id, line_items = request.line_items.len())
    )]
    async fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLink, BackendError> {
        let url = self.endpoint(&["payments", "create-payment-link"]);

        let response = self.inner.client.post(url).json(request).send().await?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}
