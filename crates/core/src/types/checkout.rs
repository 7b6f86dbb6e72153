//! Payment-link request and response payloads.
//!
//! These mirror the commerce backend's `create-payment-link` contract:
//!
//! ```text
//! POST /api/v1/payments/create-payment-link
//! { "order_id": "...",
//!   "line_items": [{ "name": "...", "price": 500, "quantity": 2 }],
//!   "success_url": "...", "cancel_url": "..." }
//! -> { "url": "https://pay.example.com/..." }
//! ```

use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::id::OrderReference;

/// A product/quantity pair submitted to the payment backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Display name shown on the hosted payment page.
    pub name: String,
    /// Unit price in minor currency units (cents).
    pub price: i64,
    pub quantity: u32,
}

impl From<&CartItem> for LineItem {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.title.clone(),
            price: item.price.to_minor_units(),
            quantity: item.quantity,
        }
    }
}

/// Body of a payment-link creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLinkRequest {
    pub order_id: OrderReference,
    pub line_items: Vec<LineItem>,
    pub success_url: String,
    pub cancel_url: String,
}

impl PaymentLinkRequest {
    /// Build a request from cart items.
    #[must_use]
    pub fn from_items(
        order_id: OrderReference,
        items: &[CartItem],
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            line_items: items.iter().map(LineItem::from).collect(),
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
        }
    }

    /// Total charge in minor units.
    #[must_use]
    pub fn total_minor_units(&self) -> i64 {
        self.line_items
            .iter()
            .map(|l| l.price.saturating_mul(i64::from(l.quantity)))
            .fold(0_i64, i64::saturating_add)
    }
}

/// Backend response carrying the hosted payment page URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLink {
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{Cart, NewCartItem, Price, ProductId};

    fn cart_with(items: &[(&str, &str, i64)]) -> Cart {
        let mut cart = Cart::new();
        for (id, price, qty) in items {
            cart.add(
                NewCartItem {
                    id: ProductId::parse(id).unwrap(),
                    title: format!("Item {id}"),
                    price: Price::new(Decimal::from_str(price).unwrap()),
                    image: None,
                    category: None,
                },
                *qty,
            );
        }
        cart
    }

    #[test]
    fn test_line_items_are_in_cents() {
        let cart = cart_with(&[("A", "5", 2), ("B", "3", 1)]);
        let request = PaymentLinkRequest::from_items(
            OrderReference::new(1, None, "x"),
            cart.items(),
            "https://shop.test/checkout/success",
            "https://shop.test/cart",
        );

        let prices: Vec<(i64, u32)> = request
            .line_items
            .iter()
            .map(|l| (l.price, l.quantity))
            .collect();
        assert_eq!(prices, [(500, 2), (300, 1)]);
        assert_eq!(request.total_minor_units(), 1300);
    }

    #[test]
    fn test_request_wire_format() {
        let cart = cart_with(&[("A", "19.99", 1)]);
        let request = PaymentLinkRequest::from_items(
            OrderReference::new(42, None, "abc"),
            cart.items(),
            "s",
            "c",
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "order_id": "order_42_guest_abc",
                "line_items": [{ "name": "Item A", "price": 1999, "quantity": 1 }],
                "success_url": "s",
                "cancel_url": "c",
            })
        );
    }

    #[test]
    fn test_payment_link_missing_url() {
        let link: PaymentLink = serde_json::from_str("{}").unwrap();
        assert!(link.url.is_none());
    }
}
