// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-user shopping cart model.
//!
//! The cart holds point-in-time copies of product price and stock taken
//! when the item was added. They are not re-synced with the catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Cart document, keyed by user ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

/// A single cart line. At most one per `product_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[validate(length(min = 1))]
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    pub price: Decimal,
    #[validate(range(min = 1))]
    pub quantity: u32,
    pub seller_id: String,
    pub seller_name: String,
    /// Stock at the time the item was added
    pub stock: u32,
}

impl CartItem {
    /// Price × quantity for this line.
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl Cart {
    /// Synthesized empty cart for a user who has never added anything.
    pub fn empty(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            items: Vec::new(),
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge-add: increments the existing line for the product, or appends.
    pub fn add_item(&mut self, item: CartItem) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Set a line's quantity exactly; zero or negative removes the line.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                true
            }
            None => false,
        }
    }

    /// Remove the line for a product. Returns `false` if it was absent.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Σ price × quantity over all lines.
pub fn calculate_cart_total(cart: &Cart) -> Decimal {
    cart.items.iter().map(CartItem::line_total).sum()
}

/// Σ quantity over all lines.
pub fn calculate_cart_item_count(cart: &Cart) -> u32 {
    cart.items.iter().map(|i| i.quantity).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, price: Decimal, quantity: u32) -> CartItem {
        CartItem {
            product_id: product_id.to_string(),
            product_name: format!("Product {}", product_id),
            product_image: None,
            price,
            quantity,
            seller_id: "seller-1".to_string(),
            seller_name: "Seller One".to_string(),
            stock: 50,
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::empty("u1", Utc::now());
        cart.add_item(item("a", Decimal::new(1250, 2), 2));
        cart.add_item(item("b", Decimal::new(4590, 2), 1));
        cart.add_item(item("a", Decimal::new(1250, 2), 3));

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.items[1].quantity, 1);
    }

    #[test]
    fn test_set_quantity_is_exact_not_incremental() {
        let mut cart = Cart::empty("u1", Utc::now());
        cart.add_item(item("a", Decimal::ONE, 2));

        assert!(cart.set_quantity("a", 7));
        assert_eq!(cart.items[0].quantity, 7);
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let mut cart = Cart::empty("u1", Utc::now());
        cart.add_item(item("a", Decimal::ONE, 2));
        cart.add_item(item("b", Decimal::ONE, 2));

        assert!(cart.set_quantity("a", 0));
        assert!(cart.set_quantity("b", -3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_absent_product_is_noop() {
        let mut cart = Cart::empty("u1", Utc::now());
        cart.add_item(item("a", Decimal::ONE, 2));

        assert!(!cart.set_quantity("missing", 4));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::empty("u1", Utc::now());
        cart.add_item(item("a", Decimal::new(1250, 2), 2));
        cart.add_item(item("b", Decimal::new(4590, 2), 1));

        assert_eq!(calculate_cart_total(&cart), Decimal::new(7090, 2));
        assert_eq!(calculate_cart_item_count(&cart), 3);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::empty("u1", Utc::now());
        assert_eq!(calculate_cart_total(&cart), Decimal::ZERO);
        assert_eq!(calculate_cart_item_count(&cart), 0);
    }
}
