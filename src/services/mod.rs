// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod cart;
pub mod catalog;
pub mod notifications;
pub mod orders;
pub mod reviews;
pub mod storage;
pub mod users;

pub use cart::CartService;
pub use catalog::{CatalogService, ProductQuery, ProductSort};
pub use notifications::{NotificationKind, NotificationService, OrderNotification};
pub use orders::{CheckoutRequest, OrderService};
pub use reviews::ReviewService;
pub use storage::StorageService;
pub use users::UserService;
