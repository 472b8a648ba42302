//! The in-memory cart model.
//!
//! A cart is a list of line items, one per product, each carrying the price
//! snapshot taken when the product was added. Mutations here are purely
//! local; the storefront applies them optimistically and then mirrors them
//! to the remote cart endpoint, whose returned list replaces the local one
//! wholesale (last write wins).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// One product-quantity pair within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product this line refers to.
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// Product name at add-time.
    pub name: String,
    /// Price snapshot taken when the product was added.
    pub price: Decimal,
    /// Primary image URL at add-time.
    pub image: String,
    /// Line quantity, always at least 1.
    pub quantity: u32,
}

/// An in-memory cart: at most one line item per product ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from a server-provided item list.
    ///
    /// Duplicate product IDs are merged by summing quantities so the
    /// one-line-per-product invariant holds regardless of what the server
    /// returned.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add(item);
        }
        cart
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of line items (not total quantity).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add a product snapshot to the cart.
    ///
    /// If a line for the product already exists, the added quantity is
    /// summed onto it and the existing snapshot is kept; otherwise a new
    /// line is appended. A zero quantity is treated as 1.
    pub fn add(&mut self, mut item: CartItem) {
        item.quantity = item.quantity.max(1);
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Set the quantity of an existing line, clamped to a minimum of 1.
    ///
    /// Unknown product IDs are ignored.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| &line.product_id == product_id)
        {
            line.quantity = quantity.max(1);
        }
    }

    /// Remove the line for a product, if present.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.items.retain(|line| &line.product_id != product_id);
    }

    /// Remove all line items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the entire item list with a server-provided one.
    ///
    /// This is the reconciliation step after a remote sync: the server's
    /// list is authoritative and overwrites any local state.
    pub fn replace(&mut self, items: Vec<CartItem>) {
        *self = Self::from_items(items);
    }

    /// Derived subtotal: the sum of price x quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum()
    }

    /// Consume the cart and return its item list.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn item(id: &str, price: Decimal, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            price,
            image: String::new(),
            quantity,
        }
    }

    #[test]
    fn test_repeated_adds_merge_into_one_line() {
        let mut cart = Cart::new();
        cart.add(item("a", dec!(10), 1));
        cart.add(item("a", dec!(10), 2));

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.subtotal(), dec!(30));
    }

    #[test]
    fn test_set_quantity_clamps_to_one() {
        let mut cart = Cart::new();
        cart.add(item("a", dec!(10), 5));

        cart.set_quantity(&ProductId::new("a"), 0);
        assert_eq!(cart.items()[0].quantity, 1);

        cart.set_quantity(&ProductId::new("a"), 7);
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[test]
    fn test_set_quantity_ignores_unknown_product() {
        let mut cart = Cart::new();
        cart.add(item("a", dec!(10), 2));
        cart.set_quantity(&ProductId::new("missing"), 9);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_remove_then_add_yields_fresh_line() {
        let mut cart = Cart::new();
        cart.add(item("a", dec!(10), 5));
        cart.remove(&ProductId::new("a"));
        assert!(cart.is_empty());

        cart.add(item("a", dec!(10), 2));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_subtotal_empty_cart_is_zero() {
        assert_eq!(Cart::new().subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_sums_price_times_quantity() {
        let mut cart = Cart::new();
        cart.add(item("a", dec!(10), 1));
        cart.add(item("a", dec!(10), 2));
        cart.add(item("b", dec!(2.50), 4));

        assert_eq!(cart.subtotal(), dec!(40));
    }

    #[test]
    fn test_zero_quantity_add_counts_as_one() {
        let mut cart = Cart::new();
        cart.add(item("a", dec!(10), 0));
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut cart = Cart::new();
        cart.add(item("a", dec!(10), 3));
        cart.add(item("b", dec!(5), 1));

        cart.replace(vec![item("c", dec!(1), 2)]);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items()[0].product_id, ProductId::new("c"));
    }

    #[test]
    fn test_from_items_merges_server_duplicates() {
        let cart = Cart::from_items(vec![item("a", dec!(10), 1), item("a", dec!(10), 2)]);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 3);
    }
}
