// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cart service.
//!
//! Every mutation is load → modify → store of the whole cart document.
//! There is no conditional write: two concurrent mutations of the same
//! cart both read the same prior state and the later write wins,
//! dropping the earlier update.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Cart, CartItem};
use validator::Validate;

/// Buyer cart operations.
#[derive(Clone)]
pub struct CartService {
    db: FirestoreDb,
}

impl CartService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// The stored cart, or an empty one if the user never added anything.
    pub async fn get_cart(&self, user_id: &str) -> Result<Cart> {
        Ok(self
            .db
            .get_cart(user_id)
            .await?
            .unwrap_or_else(|| Cart::empty(user_id, chrono::Utc::now())))
    }

    /// Merge-add an item. No stock check is made here.
    pub async fn add_to_cart(&self, user_id: &str, item: CartItem) -> Result<Cart> {
        item.validate()?;

        let mut cart = self.get_cart(user_id).await?;
        tracing::info!(
            user_id,
            product_id = %item.product_id,
            quantity = item.quantity,
            "Adding item to cart"
        );
        cart.add_item(item);
        self.store(cart).await
    }

    /// Add `quantity` of a catalog product, snapshotting its current
    /// price, stock and seller into the cart line.
    pub async fn add_product(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<Cart> {
        let product = self
            .db
            .get_product(product_id)
            .await?
            .filter(|p| p.active)
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;

        let item = CartItem {
            product_id: product.id,
            product_name: product.name,
            product_image: product.image_url,
            price: product.price,
            quantity,
            seller_id: product.seller_id,
            seller_name: product.seller_name,
            stock: product.stock,
        };
        self.add_to_cart(user_id, item).await
    }

    /// Set a line's quantity exactly; `<= 0` removes it. Absent product is a no-op.
    pub async fn update_cart_item_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<Cart> {
        let mut cart = self.get_cart(user_id).await?;
        if !cart.set_quantity(product_id, quantity) {
            tracing::debug!(user_id, product_id, "Quantity update for product not in cart");
            return Ok(cart);
        }
        self.store(cart).await
    }

    pub async fn remove_from_cart(&self, user_id: &str, product_id: &str) -> Result<Cart> {
        let mut cart = self.get_cart(user_id).await?;
        cart.remove_item(product_id);
        self.store(cart).await
    }

    pub async fn clear_cart(&self, user_id: &str) -> Result<Cart> {
        tracing::info!(user_id, "Clearing cart");
        self.store(Cart::empty(user_id, chrono::Utc::now())).await
    }

    async fn store(&self, mut cart: Cart) -> Result<Cart> {
        cart.updated_at = chrono::Utc::now();
        self.db.set_cart(&cart).await?;
        Ok(cart)
    }
}
