//! Shopping cart state.
//!
//! The cart is an ordered list of line items keyed by product ID. Insertion
//! order is display order. Operations never fail: out-of-range quantities are
//! normalized rather than rejected, so the cart always holds a valid state and
//! validation is left to checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Product fields captured when an item is added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A line in the cart.
///
/// `price` is the unit price at the time the product was first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartItem {
    /// Line total: unit price times quantity, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.amount().saturating_mul(Decimal::from(self.quantity))
    }
}

/// Point-in-time read of the cart plus derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    /// Sum of quantities.
    pub item_count: u64,
    /// Sum of `price * quantity`, saturating at `Decimal::MAX`.
    pub subtotal: Decimal,
}

impl CartSnapshot {
    /// Snapshot of an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            item_count: 0,
            subtotal: Decimal::ZERO,
        }
    }
}

/// Ordered, de-duplicated collection of cart items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

/// Clamp a caller-supplied quantity into `1..=u32::MAX`.
fn normalize_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.max(1)).unwrap_or(u32::MAX)
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add `quantity` of a product.
    ///
    /// If the product is already in the cart its quantity is increased and the
    /// existing entry keeps its position, title and price. Otherwise a new
    /// entry is appended. Quantities below 1 are treated as 1.
    pub fn add(&mut self, item: NewCartItem, quantity: i64) {
        let quantity = normalize_quantity(quantity);

        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return;
        }

        self.items.push(CartItem {
            id: item.id,
            title: item.title,
            price: item.price,
            image: item.image,
            category: item.category,
            quantity,
        });
    }

    /// Set the quantity of a product.
    ///
    /// A quantity of zero or less removes the item. Unknown IDs are ignored.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }

        if let Some(existing) = self.items.iter_mut().find(|i| &i.id == id) {
            existing.quantity = normalize_quantity(quantity);
        }
    }

    /// Remove a product. Unknown IDs are ignored.
    pub fn remove(&mut self, id: &ProductId) {
        self.items.retain(|i| &i.id != id);
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up an item by product ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Number of distinct products.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of line totals across all items, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Current items plus totals, derived from the items on every call.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            item_count: self.item_count(),
            subtotal: self.subtotal(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn product(id: &str, price: &str) -> NewCartItem {
        NewCartItem {
            id: ProductId::parse(id).unwrap(),
            title: format!("Product {id}"),
            price: Price::new(Decimal::from_str(price).unwrap()),
            image: None,
            category: None,
        }
    }

    fn pid(id: &str) -> ProductId {
        ProductId::parse(id).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_repeated_add_increments_single_entry() {
        let mut cart = Cart::new();
        cart.add(product("A", "10.00"), 1);
        cart.add(product("A", "10.00"), 2);

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 3);
        assert_eq!(snapshot.item_count, 3);
        assert_eq!(snapshot.subtotal, dec("30.00"));
    }

    #[test]
    fn test_add_sums_quantities_for_any_sequence() {
        let quantities = [1, 4, 2, 7, 1];
        let mut cart = Cart::new();
        for q in quantities {
            cart.add(product("A", "1"), q);
        }

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&pid("A")).unwrap().quantity, 15);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add(product("B", "1"), 1);
        cart.add(product("A", "1"), 1);
        cart.add(product("B", "1"), 1);

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["B", "A"]);
    }

    #[test]
    fn test_add_non_positive_quantity_counts_as_one() {
        let mut cart = Cart::new();
        cart.add(product("A", "2"), 0);
        cart.add(product("A", "2"), -5);

        assert_eq!(cart.get(&pid("A")).unwrap().quantity, 2);
    }

    #[test]
    fn test_add_keeps_original_price_for_existing_item() {
        let mut cart = Cart::new();
        cart.add(product("A", "10"), 1);
        cart.add(product("A", "12"), 1);

        assert_eq!(cart.subtotal(), dec("20"));
    }

    #[test]
    fn test_add_saturates_quantity() {
        let mut cart = Cart::new();
        cart.add(product("A", "0"), i64::MAX);
        cart.add(product("A", "0"), 10);

        assert_eq!(cart.get(&pid("A")).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let mut via_set = Cart::new();
        via_set.add(product("A", "5"), 2);
        via_set.add(product("B", "3"), 1);
        let mut via_remove = via_set.clone();

        via_set.set_quantity(&pid("A"), 0);
        via_remove.remove(&pid("A"));

        assert_eq!(via_set, via_remove);
        assert!(via_set.get(&pid("A")).is_none());
    }

    #[test]
    fn test_set_quantity_negative_removes() {
        let mut cart = Cart::new();
        cart.add(product("A", "5"), 2);
        cart.set_quantity(&pid("A"), -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_updates() {
        let mut cart = Cart::new();
        cart.add(product("A", "5"), 2);
        cart.set_quantity(&pid("A"), 7);

        assert_eq!(cart.get(&pid("A")).unwrap().quantity, 7);
        assert_eq!(cart.subtotal(), dec("35"));
    }

    #[test]
    fn test_set_quantity_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(product("A", "5"), 2);
        let before = cart.clone();

        cart.set_quantity(&pid("missing"), 3);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(product("A", "5"), 1);
        cart.remove(&pid("B"));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_subtotal_tracks_every_mutation() {
        let mut cart = Cart::new();
        cart.add(product("A", "5"), 2);
        cart.add(product("B", "3"), 1);
        assert_eq!(cart.snapshot().subtotal, dec("13"));

        cart.set_quantity(&pid("B"), 4);
        assert_eq!(cart.snapshot().subtotal, dec("22"));

        cart.remove(&pid("A"));
        assert_eq!(cart.snapshot().subtotal, dec("12"));
        assert_eq!(cart.snapshot().item_count, 4);
    }

    #[test]
    fn test_clear_resets_to_empty() {
        let mut cart = Cart::new();
        cart.add(product("A", "5"), 2);
        cart.add(product("B", "3"), 1);
        cart.clear();

        let snapshot = cart.snapshot();
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.item_count, 0);
        assert_eq!(snapshot.subtotal, Decimal::ZERO);
        assert_eq!(snapshot, CartSnapshot::empty());

        // Still usable after clear
        cart.add(product("C", "1"), 1);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_cart_round_trips_through_json() {
        let mut cart = Cart::new();
        cart.add(
            NewCartItem {
                image: Some("https://cdn.example.com/a.jpg".to_string()),
                category: Some("Clothing".to_string()),
                ..product("A", "19.99")
            },
            2,
        );

        let json = serde_json::to_value(&cart).unwrap();
        let restored: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_huge_prices_saturate_instead_of_overflowing() {
        let mut cart = Cart::new();
        cart.add(product("A", "10000000000000000000000000000"), 10);
        cart.add(product("B", "10000000000000000000000000000"), 1);

        assert_eq!(cart.get(&pid("A")).unwrap().line_total(), Decimal::MAX);
        let snapshot = cart.snapshot();
        assert_eq!(snapshot.subtotal, Decimal::MAX);
        assert_eq!(snapshot.item_count, 11);

        cart.set_quantity(&pid("A"), 1);
        assert_eq!(cart.subtotal(), dec("20000000000000000000000000000"));
    }
}
