//! Checkout route handlers.
//!
//! Checkout hands the cart to the commerce backend, which returns a hosted
//! payment page URL. The cart is only cleared once the visitor comes back to
//! the success URL with a payment session token.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use soar_core::UserId;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::{CartStore, CheckoutOutcome, PaymentRedirect};
use crate::state::AppState;

/// Checkout request body.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    /// Signed-in user, if any; tags the order reference.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Query parameters on the success return URL.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

async fn start(
    state: &AppState,
    cart: &CartStore,
    user_id: Option<&str>,
) -> Result<PaymentRedirect> {
    let user_id = user_id
        .filter(|id| !id.trim().is_empty())
        .map(UserId::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("invalid user id: {e}")))?;

    let contents = cart.load().await?;
    add_breadcrumb("checkout", "Started checkout", None);

    let redirect = state
        .checkout()
        .begin_checkout(contents.items(), user_id.as_ref())
        .await?;

    tracing::info!(order_id = %redirect.order_id, "Checkout session created");
    Ok(redirect)
}

/// Create a payment link and return its URL as JSON.
///
/// The body is optional; an empty body checks out as a guest.
#[instrument(skip(state, cart, body))]
pub async fn create(
    State(state): State<AppState>,
    cart: CartStore,
    body: Bytes,
) -> Result<Json<CheckoutResponse>> {
    let request: CheckoutRequest = if body.is_empty() {
        CheckoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid checkout request: {e}")))?
    };
    let redirect = start(&state, &cart, request.user_id.as_deref()).await?;
    Ok(Json(CheckoutResponse { url: redirect.url }))
}

/// Create a payment link and redirect the browser to it.
#[instrument(skip(state, cart))]
pub async fn redirect(State(state): State<AppState>, cart: CartStore) -> Result<Redirect> {
    let redirect = start(&state, &cart, None).await?;
    Ok(Redirect::to(&redirect.url))
}

/// Return from the hosted payment page.
///
/// With a `session_id` the cart is cleared and `status` is `success`; without
/// one the cart is kept and `status` is `error`.
#[instrument(skip(state, cart, query))]
pub async fn success(
    State(state): State<AppState>,
    cart: CartStore,
    Query(query): Query<SuccessQuery>,
) -> Result<Json<CheckoutOutcome>> {
    let outcome = state
        .checkout()
        .complete_checkout(query.session_id.as_deref(), &cart)
        .await?;
    add_breadcrumb(
        "checkout",
        "Returned from payment",
        Some(&[("status", outcome.status.as_str())]),
    );
    Ok(Json(outcome))
}
