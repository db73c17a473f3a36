//! Seller order statistics for the seller dashboard.
//!
//! Derived on every read from a scan of the orders collection; nothing
//! here is stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Order, OrderStatus};

/// Per-seller order counts and revenue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrderStats {
    // ─── Counts ──────────────────────────────────────────────────
    /// Orders containing at least one of the seller's items
    pub total_orders: u32,
    pub pending_orders: u32,
    pub processing_orders: u32,
    pub shipped_orders: u32,
    pub delivered_orders: u32,
    pub cancelled_orders: u32,

    // ─── Revenue ─────────────────────────────────────────────────
    /// Σ subtotal of the seller's own lines (not order totals)
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub total_revenue: Decimal,
}

impl SellerOrderStats {
    /// Fold one order into the stats.
    ///
    /// Returns `false` (and changes nothing) if the order has no line from
    /// this seller.
    pub fn update_from_order(&mut self, seller_id: &str, order: &Order) -> bool {
        if !order.contains_seller(seller_id) {
            return false;
        }

        self.total_orders += 1;
        match order.status {
            OrderStatus::Pending => self.pending_orders += 1,
            OrderStatus::Processing => self.processing_orders += 1,
            OrderStatus::Shipped => self.shipped_orders += 1,
            OrderStatus::Delivered => self.delivered_orders += 1,
            OrderStatus::Cancelled => self.cancelled_orders += 1,
        }
        self.total_revenue += order.seller_subtotal(seller_id);

        true
    }

    /// Aggregate stats for `seller_id` over a set of orders.
    pub fn from_orders<'a>(seller_id: &str, orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut stats = Self::default();
        for order in orders {
            stats.update_from_order(seller_id, order);
        }
        stats
    }
}
