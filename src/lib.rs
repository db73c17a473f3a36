// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! EuroFood Market: a marketplace for European specialty foods
//!
//! This crate provides the backend API: catalog browsing, carts, checkout
//! into orders, seller order handling, and product reviews.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{
    CartService, CatalogService, NotificationService, OrderService, ReviewService,
    StorageService, UserService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub carts: CartService,
    pub orders: OrderService,
    pub reviews: ReviewService,
    pub catalog: CatalogService,
    pub users: UserService,
    pub storage: StorageService,
    pub notifier: NotificationService,
}

impl AppState {
    /// Wire up every service over one document store.
    pub fn new(
        config: Config,
        db: FirestoreDb,
        notifier: NotificationService,
        storage: StorageService,
    ) -> Self {
        Self {
            carts: CartService::new(db.clone()),
            orders: OrderService::new(
                db.clone(),
                notifier.clone(),
                config.shipping_cost,
                config.tax_rate,
            ),
            reviews: ReviewService::new(db.clone()),
            catalog: CatalogService::new(db.clone()),
            users: UserService::new(db.clone()),
            storage,
            notifier,
            db,
            config,
        }
    }
}
