//! Payment provider webhook relay.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::instrument;

use crate::backend::WEBHOOK_SIGNATURE_HEADER;
use crate::error::Result;
use crate::state::AppState;

/// Forward a payment webhook to the commerce backend unchanged.
///
/// The body and the provider's signature header are passed through as
/// received. Verification happens in the backend, which holds the signing
/// secret.
#[instrument(skip(state, headers, body), fields(body_len = body.len()))]
pub async fn payments(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let signature = headers.get(WEBHOOK_SIGNATURE_HEADER);
    if signature.is_none() {
        tracing::warn!("Payment webhook arrived without a signature header");
    }
    state
        .backend()
        .forward_webhook(body.to_vec(), signature)
        .await?;
    Ok(StatusCode::OK)
}
