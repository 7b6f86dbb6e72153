//! Checkout orchestration.
//!
//! Turns cart contents into a single payment-link request against the
//! commerce backend and reconciles the cart when the visitor returns from the
//! hosted payment page.
//!
//! Payment-link creation is never retried: the backend has no idempotency
//! key, so a blind retry could open two payment sessions for one order.

use soar_core::{
    CartItem, CartSnapshot, CheckoutStatus, OrderReference, PaymentLinkRequest, UserId,
};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use super::cart::{CartStore, CartStoreError};
use crate::backend::{BackendClient, BackendError, PaymentLinkApi};
use crate::config::CommerceConfig;

/// Errors that stop a checkout from starting.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to check out. Raised before any backend call.
    #[error("cart is empty")]
    EmptyCart,

    /// Backend request failed or was rejected.
    #[error("payment link request failed: {0}")]
    Backend(#[from] BackendError),

    /// Backend answered without a usable payment URL.
    #[error("backend returned no usable payment URL")]
    MissingPaymentUrl,
}

/// Where to send the browser to pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRedirect {
    /// Hosted payment page on the payment provider's origin.
    pub url: String,
    /// Reference submitted with the request.
    pub order_id: OrderReference,
}

/// Result of returning from the hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CheckoutOutcome {
    pub status: CheckoutStatus,
    /// Cart after reconciliation: empty on success, untouched otherwise.
    pub cart: CartSnapshot,
}

/// Starts and completes checkouts.
///
/// Generic over the payment-link API so it can be driven by a fake in tests;
/// production uses [`BackendClient`].
#[derive(Debug, Clone)]
pub struct CheckoutOrchestrator<P = BackendClient> {
    payments: P,
    success_url: String,
    cancel_url: String,
}

impl<P: PaymentLinkApi> CheckoutOrchestrator<P> {
    /// Create an orchestrator using the configured return URLs.
    #[must_use]
    pub fn new(config: &CommerceConfig, payments: P) -> Self {
        Self {
            payments,
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        }
    }

    /// Payment-link client in use.
    pub const fn payments(&self) -> &P {
        &self.payments
    }

    /// Request a hosted payment page for `items`.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::EmptyCart` if `items` is empty (no request is sent)
    /// - `CheckoutError::Backend` if the request fails or is rejected
    /// - `CheckoutError::MissingPaymentUrl` if the response has no valid URL
    #[instrument(skip(self, items), fields(line_items = items.len()))]
    pub async fn begin_checkout(
        &self,
        items: &[CartItem],
        user_id: Option<&UserId>,
    ) -> Result<PaymentRedirect, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order_id = OrderReference::generate(user_id);
        let request = PaymentLinkRequest::from_items(
            order_id.clone(),
            items,
            &self.success_url,
            &self.cancel_url,
        );

        tracing::info!(
            order_id = %order_id,
            total_minor_units = request.total_minor_units(),
            "Creating payment link"
        );

        let link = self
            .payments
            .create_payment_link(&request)
            .await
            .inspect_err(|e| {
                tracing::error!(order_id = %order_id, error = %e, "Payment link request failed");
            })?;

        let url = link
            .url
            .filter(|u| is_absolute_http_url(u))
            .ok_or(CheckoutError::MissingPaymentUrl)?;

        Ok(PaymentRedirect { url, order_id })
    }

    /// Reconcile the cart after the browser returns to the success URL.
    ///
    /// A present, non-blank `session_token` means payment completed: the cart
    /// is cleared. Otherwise the cart is left as-is so the visitor can retry.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    #[instrument(skip(self, session_token, cart), fields(has_token = session_token.is_some()))]
    pub async fn complete_checkout(
        &self,
        session_token: Option<&str>,
        cart: &CartStore,
    ) -> Result<CheckoutOutcome, CartStoreError> {
        if session_token.is_some_and(|t| !t.trim().is_empty()) {
            let cart = cart.clear().await?;
            tracing::info!("Checkout completed, cart cleared");
            return Ok(CheckoutOutcome {
                status: CheckoutStatus::Success,
                cart,
            });
        }

        tracing::warn!("Returned from payment without a session token, cart preserved");
        Ok(CheckoutOutcome {
            status: CheckoutStatus::Error,
            cart: cart.snapshot().await?,
        })
    }
}

fn is_absolute_http_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}
