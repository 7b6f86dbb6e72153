//! Cart route handlers.
//!
//! Every handler answers with the cart snapshot after the change, so the
//! client never needs a second round trip to re-render.

use axum::Json;
use serde::Deserialize;
use soar_core::{CartSnapshot, NewCartItem, Price, ProductId};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{AppJson, AppPath};
use crate::services::CartStore;

/// Add-to-cart request body.
///
/// Item fields are taken as shown on the product page the visitor added from.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: String,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Defaults to 1; values below 1 also count as 1.
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Set-quantity request body.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

fn parse_product_id(raw: &str) -> Result<ProductId> {
    ProductId::parse(raw).map_err(|e| AppError::BadRequest(format!("invalid product id: {e}")))
}

/// Current cart.
#[instrument(skip(cart))]
pub async fn show(cart: CartStore) -> Result<Json<CartSnapshot>> {
    Ok(Json(cart.snapshot().await?))
}

/// Add an item, or increase its quantity if already present.
#[instrument(skip(cart, request), fields(product_id = %request.id))]
pub async fn add(
    cart: CartStore,
    AppJson(request): AppJson<AddItemRequest>,
) -> Result<Json<CartSnapshot>> {
    let id = parse_product_id(&request.id)?;
    let quantity = request.quantity.unwrap_or(1);

    add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));

    let item = NewCartItem {
        id,
        title: request.title,
        price: request.price,
        image: request.image,
        category: request.category,
    };
    Ok(Json(cart.add(item, quantity).await?))
}

/// Set an item's quantity; zero or less removes it.
#[instrument(skip(cart))]
pub async fn set_quantity(
    cart: CartStore,
    AppPath(id): AppPath<String>,
    AppJson(request): AppJson<SetQuantityRequest>,
) -> Result<Json<CartSnapshot>> {
    let id = parse_product_id(&id)?;
    add_breadcrumb("cart", "Updated quantity", Some(&[("product_id", id.as_str())]));
    Ok(Json(cart.set_quantity(&id, request.quantity).await?))
}

/// Remove an item.
#[instrument(skip(cart))]
pub async fn remove(
    cart: CartStore,
    AppPath(id): AppPath<String>,
) -> Result<Json<CartSnapshot>> {
    let id = parse_product_id(&id)?;
    add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));
    Ok(Json(cart.remove(&id).await?))
}

/// Empty the cart.
#[instrument(skip(cart))]
pub async fn clear(cart: CartStore) -> Result<Json<CartSnapshot>> {
    add_breadcrumb("cart", "Cleared cart", None);
    Ok(Json(cart.clear().await?))
}
