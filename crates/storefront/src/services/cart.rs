//! Session-backed cart store.
//!
//! The cart lives in the visitor's session under [`session_keys::CART`]. Every
//! operation loads the cart, applies the change, writes it back and returns a
//! fresh snapshot, so later reads in the same session always see the update.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use soar_core::{Cart, CartSnapshot, NewCartItem, ProductId};
use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use crate::models::session_keys;

/// Errors from the session store backing the cart.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// Session store read or write failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// The visitor's cart, persisted in their session.
///
/// Extract it directly in handlers:
///
/// ```rust,ignore
/// async fn show(cart: CartStore) -> Result<Json<CartSnapshot>, AppError> {
///     Ok(Json(cart.snapshot().await?))
/// }
/// ```
#[derive(Clone)]
pub struct CartStore {
    session: Session,
}

impl CartStore {
    /// Wrap a session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Load the cart, or an empty one if the session has none.
    ///
    /// A stored cart that no longer decodes is discarded and replaced with an
    /// empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(&self) -> Result<Cart, CartStoreError> {
        match self.session.get::<Cart>(session_keys::CART).await {
            Ok(cart) => Ok(cart.unwrap_or_default()),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding undecodable cart from session");
                self.session.remove_value(session_keys::CART).await?;
                Ok(Cart::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the cart to the session.
    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }

    /// Load, apply `change`, save, and return the new snapshot.
    async fn update(&self, change: impl FnOnce(&mut Cart)) -> Result<CartSnapshot, CartStoreError> {
        let mut cart = self.load().await?;
        change(&mut cart);
        self.save(&cart).await?;
        Ok(cart.snapshot())
    }

    /// Add `quantity` of a product; quantities below 1 count as 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add(&self, item: NewCartItem, quantity: i64) -> Result<CartSnapshot, CartStoreError> {
        self.update(|cart| cart.add(item, quantity)).await
    }

    /// Set a product's quantity; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn set_quantity(
        &self,
        id: &ProductId,
        quantity: i64,
    ) -> Result<CartSnapshot, CartStoreError> {
        self.update(|cart| cart.set_quantity(id, quantity)).await
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: &ProductId) -> Result<CartSnapshot, CartStoreError> {
        self.update(|cart| cart.remove(id)).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<CartSnapshot, CartStoreError> {
        self.update(Cart::clear).await
    }

    /// Current items and totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn snapshot(&self) -> Result<CartSnapshot, CartStoreError> {
        Ok(self.load().await?.snapshot())
    }
}

impl<S> FromRequestParts<S> for CartStore
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self::new(session))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use soar_core::Price;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn item(id: &str, price: &str) -> NewCartItem {
        NewCartItem {
            id: ProductId::parse(id).unwrap(),
            title: format!("Item {id}"),
            price: Price::new(Decimal::from_str(price).unwrap()),
            image: None,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_empty_session_has_empty_cart() {
        let store = CartStore::new(session());
        assert_eq!(store.snapshot().await.unwrap(), CartSnapshot::empty());
    }

    #[tokio::test]
    async fn test_mutations_are_visible_to_later_reads() {
        let session = session();
        let writer = CartStore::new(session.clone());
        let reader = CartStore::new(session);

        writer.add(item("A", "10.00"), 1).await.unwrap();
        writer.add(item("A", "10.00"), 2).await.unwrap();

        let snapshot = reader.snapshot().await.unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 3);
        assert_eq!(snapshot.subtotal, Decimal::from(30));
    }

    #[tokio::test]
    async fn test_set_quantity_and_remove() {
        let store = CartStore::new(session());
        store.add(item("A", "5"), 2).await.unwrap();
        store.add(item("B", "3"), 1).await.unwrap();

        let snapshot = store
            .set_quantity(&ProductId::parse("A").unwrap(), 0)
            .await
            .unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.item_count, 1);

        let snapshot = store.remove(&ProductId::parse("B").unwrap()).await.unwrap();
        assert!(snapshot.items.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = CartStore::new(session());
        store.add(item("A", "5"), 2).await.unwrap();

        let snapshot = store.clear().await.unwrap();
        assert_eq!(snapshot, CartSnapshot::empty());
        assert_eq!(store.snapshot().await.unwrap(), CartSnapshot::empty());
    }

    #[tokio::test]
    async fn test_undecodable_cart_is_reset() {
        let session = session();
        session
            .insert(session_keys::CART, "not a cart")
            .await
            .unwrap();

        let store = CartStore::new(session);
        assert_eq!(store.snapshot().await.unwrap(), CartSnapshot::empty());

        store.add(item("A", "1"), 1).await.unwrap();
        assert_eq!(store.snapshot().await.unwrap().item_count, 1);
    }
}
