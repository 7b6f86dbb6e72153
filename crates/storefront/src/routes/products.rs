//! Product catalog proxy handlers.
//!
//! Product records pass through from the commerce backend untouched; the
//! storefront only adds the derived category navigation.

use axum::{
    Json,
    extract::{RawQuery, State},
};
use soar_core::ProductId;
use tracing::instrument;

use crate::backend::Category;
use crate::error::{AppError, Result};
use crate::extract::AppPath;
use crate::state::AppState;

/// Product list, forwarding the query string (filters, paging) as-is.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<serde_json::Value>> {
    let products = state.backend().list_products(query.as_deref()).await?;
    Ok(Json(products))
}

/// Single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> Result<Json<serde_json::Value>> {
    let id = ProductId::parse(&id).map_err(|_| AppError::NotFound(format!("product {id}")))?;
    let product = state.backend().get_product(&id).await?;
    Ok(Json(product))
}

/// Category navigation tree.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let tree = state.categories().get().await?;
    Ok(Json(tree.to_vec()))
}

/// Drop and rebuild the category tree, e.g. after a catalog change.
#[instrument(skip(state))]
pub async fn refresh_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let tree = state.categories().refresh().await?;
    tracing::info!(categories = tree.len(), "Category cache refreshed");
    Ok(Json(tree.to_vec()))
}
