// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Order model and status state machine.
//!
//! An order is a snapshot of a checkout. Only `status`, `tracking_number`,
//! `updated_at` and `delivered_at` change after creation.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::CartItem;

/// Order lifecycle.
///
/// `pending → processing → shipped → delivered`, with `cancelled` reachable
/// from any non-terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    fn rank(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Processing => 1,
            OrderStatus::Shipped => 2,
            OrderStatus::Delivered => 3,
            OrderStatus::Cancelled => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Forward moves may skip steps; terminal states are final.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            OrderStatus::Cancelled => true,
            _ => next.rank() > self.rank(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment is arranged directly between buyer and seller; this only records it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

/// Postal address used for shipping and billing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 1, max = 300))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A purchased line, priced at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    pub seller_id: String,
    pub seller_name: String,
    pub quantity: u32,
    pub price_per_unit: Decimal,
    pub subtotal: Decimal,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            product_image: item.product_image.clone(),
            seller_id: item.seller_id.clone(),
            seller_name: item.seller_name.clone(),
            quantity: item.quantity,
            price_per_unit: item.price,
            subtotal: item.line_total(),
        }
    }
}

/// Stored order record in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Document ID
    pub id: String,
    /// Human-readable number ("EU" + 11 digits), not a key
    pub order_number: String,
    pub user_id: String,
    pub user_email: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    /// Client-supplied checkout key the document ID was derived from
    #[serde(default)]
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Materialize a new order from a creation payload.
    pub fn from_new(id: String, order_number: String, new: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            order_number,
            user_id: new.user_id,
            user_email: new.user_email,
            items: new.items,
            subtotal: new.subtotal,
            shipping_cost: new.shipping_cost,
            tax: new.tax,
            total: new.total,
            status: new.status,
            shipping_address: new.shipping_address,
            billing_address: new.billing_address,
            payment_method: new.payment_method,
            payment_status: new.payment_status,
            notes: new.notes,
            tracking_number: None,
            idempotency_key: new.idempotency_key,
            created_at: now,
            updated_at: now,
            delivered_at: None,
        }
    }

    /// Whether any line belongs to `seller_id`.
    pub fn contains_seller(&self, seller_id: &str) -> bool {
        self.items.iter().any(|i| i.seller_id == seller_id)
    }

    /// Lines belonging to `seller_id`.
    pub fn items_for_seller<'a>(
        &'a self,
        seller_id: &'a str,
    ) -> impl Iterator<Item = &'a OrderItem> + 'a {
        self.items.iter().filter(move |i| i.seller_id == seller_id)
    }

    /// Σ line subtotals belonging to `seller_id`.
    pub fn seller_subtotal(&self, seller_id: &str) -> Decimal {
        self.items_for_seller(seller_id).map(|i| i.subtotal).sum()
    }

    /// Line subtotals grouped by seller.
    pub fn subtotals_by_seller(&self) -> BTreeMap<String, Decimal> {
        let mut groups = BTreeMap::new();
        for item in &self.items {
            *groups.entry(item.seller_id.clone()).or_insert(Decimal::ZERO) += item.subtotal;
        }
        groups
    }

    /// Seller-scoped projection: only that seller's lines and their subtotal.
    pub fn seller_view(&self, seller_id: &str) -> Order {
        let mut view = self.clone();
        view.items.retain(|i| i.seller_id == seller_id);
        view.subtotal = view.items.iter().map(|i| i.subtotal).sum();
        view
    }

    /// Overwrite the status, stamping `delivered_at` on delivery.
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
        if status == OrderStatus::Delivered {
            self.delivered_at = Some(now);
        }
    }
}

/// Order creation payload. Prices and totals are taken as given.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[validate(length(min = 1))]
    pub user_id: String,
    pub user_email: String,
    #[validate(length(min = 1))]
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[validate(nested)]
    pub shipping_address: Address,
    #[validate(nested)]
    pub billing_address: Address,
    pub payment_method: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Format an order number: "EU" + low 8 digits of epoch ms + 3-digit suffix.
pub fn format_order_number(epoch_ms: i64, suffix: u16) -> String {
    format!(
        "EU{:08}{:03}",
        epoch_ms.rem_euclid(100_000_000),
        suffix % 1000
    )
}

/// Generate an order number for `now`. Not collision-proof.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::rng().random_range(0..1000);
    format_order_number(now.timestamp_millis(), suffix)
}

/// Whether `value` has the `EU` + 11 digit shape.
pub fn is_valid_order_number(value: &str) -> bool {
    value
        .strip_prefix("EU")
        .map(|digits| digits.len() == 11 && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(seller: &str, subtotal: i64) -> OrderItem {
        OrderItem {
            product_id: format!("p-{}-{}", seller, subtotal),
            product_name: "Item".to_string(),
            product_image: None,
            seller_id: seller.to_string(),
            seller_name: seller.to_uppercase(),
            quantity: 1,
            price_per_unit: Decimal::new(subtotal, 2),
            subtotal: Decimal::new(subtotal, 2),
        }
    }

    fn order_with(items: Vec<OrderItem>) -> Order {
        let subtotal: Decimal = items.iter().map(|i| i.subtotal).sum();
        let new = NewOrder {
            user_id: "buyer".to_string(),
            user_email: "buyer@example.com".to_string(),
            items,
            subtotal,
            shipping_cost: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: subtotal,
            status: OrderStatus::Pending,
            shipping_address: Address::default(),
            billing_address: Address::default(),
            payment_method: "bank_transfer".to_string(),
            payment_status: PaymentStatus::Pending,
            notes: None,
            idempotency_key: None,
        };
        Order::from_new("o1".to_string(), "EU00000000000".to_string(), new, Utc::now())
    }

    #[test]
    fn test_order_number_format() {
        assert_eq!(format_order_number(1_712_345_678_901, 7), "EU45678901007");
        assert_eq!(format_order_number(42, 999), "EU00000042999");
        assert!(is_valid_order_number(&generate_order_number(Utc::now())));
    }

    #[test]
    fn test_order_number_shape_check() {
        assert!(is_valid_order_number("EU12345678901"));
        assert!(!is_valid_order_number("EU1234567890"));
        assert!(!is_valid_order_number("US12345678901"));
        assert!(!is_valid_order_number("EU1234567890a"));
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Delivered));
        assert!(Shipped.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Processing));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Processing));
    }

    #[test]
    fn test_delivered_at_only_on_delivery() {
        let mut order = order_with(vec![line("s1", 1000)]);
        order.set_status(OrderStatus::Shipped, Utc::now());
        assert!(order.delivered_at.is_none());

        order.set_status(OrderStatus::Delivered, Utc::now());
        assert!(order.delivered_at.is_some());
    }

    #[test]
    fn test_seller_groups_sum_to_total() {
        let order = order_with(vec![line("s1", 1250), line("s2", 4590), line("s1", 300)]);
        let groups = order.subtotals_by_seller();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["s1"], Decimal::new(1550, 2));
        assert_eq!(groups.values().copied().sum::<Decimal>(), order.total);
    }

    #[test]
    fn test_seller_view_projects_lines() {
        let order = order_with(vec![line("s1", 1250), line("s2", 4590)]);
        let view = order.seller_view("s2");

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.subtotal, Decimal::new(4590, 2));
        assert_eq!(view.order_number, order.order_number);
    }
}
