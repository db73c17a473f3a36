// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.
//!
//! Field names are serialized in camelCase so documents stay compatible
//! with the existing marketplace collections.

pub mod cart;
pub mod country;
pub mod order;
pub mod product;
pub mod review;
pub mod stats;
pub mod user;

pub use cart::{calculate_cart_item_count, calculate_cart_total, Cart, CartItem};
pub use country::Country;
pub use order::{Address, NewOrder, Order, OrderItem, OrderStatus, PaymentStatus};
pub use product::{NewProduct, Product, ProductRatingFields, ProductUpdate};
pub use review::{NewReview, ProductRating, Review};
pub use stats::SellerOrderStats;
pub use user::{Role, User};

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a money amount to cents (half away from zero).
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
