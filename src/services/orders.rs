// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order service.
//!
//! Handles:
//! - Order creation from a priced payload (prices are not re-checked)
//! - Checkout: cart → order → notifications → cart clear
//! - Status transitions and tracking numbers (sellers)
//! - Seller-scoped order views and stats (full collection scan)
//!
//! Checkout steps are independent writes. If the cart clear fails after
//! the order is created, the order stands and the cart keeps its items.
//! Clients that send an idempotency key can safely retry: the order ID is
//! derived from the key, so the retry finds the existing order and only
//! clears the cart.

use crate::db::{collections, FirestoreDb};
use crate::error::{AppError, Result};
use crate::middleware::SessionContext;
use crate::models::order::generate_order_number;
use crate::models::{
    round_money, Address, NewOrder, Order, OrderItem, OrderStatus, PaymentStatus,
    SellerOrderStats,
};
use crate::services::notifications::SellerContact;
use crate::services::{CartService, NotificationKind, NotificationService, OrderNotification};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use validator::Validate;

/// Buyer checkout input.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(nested)]
    pub shipping_address: Address,
    /// Defaults to the shipping address
    #[serde(default)]
    #[validate(nested)]
    pub billing_address: Option<Address>,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Client-generated token making retries of this checkout idempotent
    #[serde(default)]
    #[validate(length(min = 8, max = 128), custom(function = "validate_idempotency_key"))]
    pub idempotency_key: Option<String>,
}

fn validate_idempotency_key(key: &str) -> std::result::Result<(), validator::ValidationError> {
    if key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(validator::ValidationError::new("idempotency_key_charset"))
    }
}

/// Order document ID for an idempotent checkout.
fn checkout_order_id(user_id: &str, key: &str) -> String {
    format!("{}:{}", urlencoding::encode(user_id), key)
}

#[derive(Clone)]
pub struct OrderService {
    db: FirestoreDb,
    carts: CartService,
    notifier: NotificationService,
    shipping_cost: Decimal,
    tax_rate: Decimal,
}

impl OrderService {
    pub fn new(
        db: FirestoreDb,
        notifier: NotificationService,
        shipping_cost: Decimal,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            carts: CartService::new(db.clone()),
            db,
            notifier,
            shipping_cost,
            tax_rate,
        }
    }

    // ─── Creation ────────────────────────────────────────────────

    /// Persist a new order and return it with its generated ID and number.
    ///
    /// Does not touch product stock or the buyer's cart.
    pub async fn create_order(&self, new: NewOrder) -> Result<Order> {
        new.validate()?;

        let id = match &new.idempotency_key {
            Some(key) => checkout_order_id(&new.user_id, key),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let now = chrono::Utc::now();
        let order = Order::from_new(id, generate_order_number(now), new, now);

        self.db.create_order(&order).await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            user_id = %order.user_id,
            total = %order.total,
            items = order.items.len(),
            "Order created"
        );
        Ok(order)
    }

    /// Turn the caller's cart into an order.
    pub async fn checkout(&self, ctx: &SessionContext, request: CheckoutRequest) -> Result<Order> {
        request.validate()?;

        if let Some(key) = &request.idempotency_key {
            if let Some(existing) = self.db.get_order(&checkout_order_id(&ctx.uid, key)).await? {
                return self.finish_repeated_checkout(ctx, existing).await;
            }
        }

        let cart = self.carts.get_cart(&ctx.uid).await?;
        if cart.is_empty() {
            return Err(AppError::BadRequest("Cart is empty".to_string()));
        }

        let items: Vec<OrderItem> = cart.items.iter().map(OrderItem::from).collect();
        let subtotal: Decimal = items.iter().map(|i| i.subtotal).sum();
        let tax = round_money(subtotal * self.tax_rate);
        let shipping_cost = self.shipping_cost;
        let key = request.idempotency_key.clone();

        let new = NewOrder {
            user_id: ctx.uid.clone(),
            user_email: ctx.email.clone(),
            items,
            subtotal,
            shipping_cost,
            tax,
            total: subtotal + shipping_cost + tax,
            status: OrderStatus::Pending,
            billing_address: request
                .billing_address
                .unwrap_or_else(|| request.shipping_address.clone()),
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
            payment_status: PaymentStatus::Pending,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            idempotency_key: request.idempotency_key,
        };

        let order = match self.create_order(new).await {
            Ok(order) => order,
            // A concurrent retry with the same key won the create.
            Err(AppError::Conflict(reason)) => match key {
                Some(key) => {
                    let existing = self.find_order(&checkout_order_id(&ctx.uid, &key)).await?;
                    return self.finish_repeated_checkout(ctx, existing).await;
                }
                None => return Err(AppError::Conflict(reason)),
            },
            Err(e) => return Err(e),
        };

        self.notify(&order, ctx.public_name());
        self.carts.clear_cart(&ctx.uid).await?;

        Ok(order)
    }

    /// A checkout with this key already produced `order`; make sure the
    /// cart is cleared and return the same order.
    async fn finish_repeated_checkout(&self, ctx: &SessionContext, order: Order) -> Result<Order> {
        if order.user_id != ctx.uid {
            return Err(AppError::Conflict("Idempotency key already used".to_string()));
        }
        tracing::info!(
            order_id = %order.id,
            user_id = %ctx.uid,
            "Repeated checkout, returning existing order"
        );
        self.carts.clear_cart(&ctx.uid).await?;
        Ok(order)
    }

    /// Dispatch buyer and seller notifications without waiting on them.
    fn notify(&self, order: &Order, customer_name: &str) {
        let db = self.db.clone();
        let notifier = self.notifier.clone();
        let order = order.clone();
        let customer_name = customer_name.to_string();

        tokio::spawn(async move {
            let sellers = seller_contacts(&db, &order).await;
            let base = OrderNotification {
                kind: NotificationKind::BuyerConfirmation,
                order_number: order.order_number.clone(),
                customer_email: order.user_email.clone(),
                customer_name,
                order_total: order.total,
                items: order.items.clone(),
                shipping_address: order.shipping_address.clone(),
                notes: order.notes.clone(),
                sellers: Vec::new(),
            };
            let seller_notification = OrderNotification {
                kind: NotificationKind::SellerNotification,
                sellers,
                ..base.clone()
            };
            if let Err(e) = notifier.dispatch(vec![base, seller_notification]).await {
                tracing::warn!(error = %e, "Notification task failed");
            }
        });
    }

    // ─── Reads ───────────────────────────────────────────────────

    async fn find_order(&self, order_id: &str) -> Result<Order> {
        self.db
            .get_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))
    }

    /// An order as the caller may see it: the buyer gets the whole order,
    /// a seller with items in it gets their projection.
    pub async fn get_order(&self, ctx: &SessionContext, order_id: &str) -> Result<Order> {
        let order = self.find_order(order_id).await?;
        if order.user_id == ctx.uid {
            return Ok(order);
        }
        if ctx.is_seller() && order.contains_seller(&ctx.uid) {
            return Ok(order.seller_view(&ctx.uid));
        }
        // Don't reveal that the order exists.
        Err(AppError::NotFound(format!("Order {} not found", order_id)))
    }

    /// The caller's own orders, newest first.
    pub async fn get_user_orders(&self, ctx: &SessionContext) -> Result<Vec<Order>> {
        let mut orders = self.db.get_orders_for_user(&ctx.uid).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Orders containing any item from `seller_id`, newest first.
    pub async fn get_seller_orders(&self, seller_id: &str) -> Result<Vec<Order>> {
        let mut orders = self
            .db
            .query(collections::ORDERS, |o: &Order| o.contains_seller(seller_id))
            .await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub async fn get_seller_order_stats(&self, seller_id: &str) -> Result<SellerOrderStats> {
        let orders = self.get_seller_orders(seller_id).await?;
        Ok(SellerOrderStats::from_orders(seller_id, &orders))
    }

    // ─── Seller Mutations ────────────────────────────────────────

    /// Load an order the calling seller has items in.
    async fn seller_order(&self, ctx: &SessionContext, order_id: &str) -> Result<Order> {
        ctx.require_seller()?;
        let order = self.find_order(order_id).await?;
        if !order.contains_seller(&ctx.uid) {
            return Err(AppError::Forbidden(format!(
                "Order {} has no items from this seller",
                order_id
            )));
        }
        Ok(order)
    }

    /// Move an order to `status`. Backward moves and moves out of a
    /// terminal state are rejected.
    pub async fn update_order_status(
        &self,
        ctx: &SessionContext,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order> {
        let mut order = self.seller_order(ctx, order_id).await?;

        if !order.status.can_transition_to(status) {
            return Err(AppError::BadRequest(format!(
                "Cannot change order status from {} to {}",
                order.status, status
            )));
        }

        let previous = order.status;
        order.set_status(status, chrono::Utc::now());
        self.db.set_order(&order).await?;

        tracing::info!(
            order_id,
            seller_id = %ctx.uid,
            from = %previous,
            to = %status,
            "Order status updated"
        );
        Ok(order)
    }

    pub async fn update_tracking_number(
        &self,
        ctx: &SessionContext,
        order_id: &str,
        tracking_number: &str,
    ) -> Result<Order> {
        let tracking_number = tracking_number.trim();
        if tracking_number.is_empty() || tracking_number.len() > 100 {
            return Err(AppError::BadRequest("Invalid tracking number".to_string()));
        }

        let mut order = self.seller_order(ctx, order_id).await?;
        order.tracking_number = Some(tracking_number.to_string());
        order.updated_at = chrono::Utc::now();
        self.db.set_order(&order).await?;

        tracing::info!(order_id, seller_id = %ctx.uid, "Tracking number set");
        Ok(order)
    }
}

/// Look up contact details for every seller in the order.
///
/// Lookup failures leave the email empty rather than failing.
async fn seller_contacts(db: &FirestoreDb, order: &Order) -> Vec<SellerContact> {
    let mut names: BTreeMap<&str, &str> = BTreeMap::new();
    for item in &order.items {
        names.entry(&item.seller_id).or_insert(&item.seller_name);
    }

    let mut contacts = Vec::with_capacity(names.len());
    for (seller_id, seller_name) in names {
        let email = match db.get_user(seller_id).await {
            Ok(user) => user.map(|u| u.email),
            Err(e) => {
                tracing::warn!(seller_id, error = %e, "Seller lookup failed for notification");
                None
            }
        };
        contacts.push(SellerContact {
            seller_id: seller_id.to_string(),
            seller_name: seller_name.to_string(),
            email,
        });
    }
    contacts
}
