// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shopping cart routes.

use crate::error::{AppError, Result};
use crate::middleware::SessionContext;
use crate::models::{calculate_cart_item_count, calculate_cart_total, Cart};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/cart", get(get_cart).delete(clear_cart))
        .route("/api/cart/items", post(add_item))
        .route(
            "/api/cart/items/{product_id}",
            put(update_quantity).delete(remove_item),
        )
}

/// Cart with derived totals.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    #[serde(flatten)]
    pub cart: Cart,
    pub total: Decimal,
    pub item_count: u32,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            total: calculate_cart_total(&cart),
            item_count: calculate_cart_item_count(&cart),
            cart,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest {
    product_id: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Deserialize)]
struct QuantityRequest {
    /// Zero or negative removes the line
    quantity: i64,
}

async fn get_cart(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<CartResponse>> {
    Ok(Json(state.carts.get_cart(&ctx.uid).await?.into()))
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartResponse>> {
    if body.quantity == 0 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
    }
    let cart = state
        .carts
        .add_product(&ctx.uid, &body.product_id, body.quantity)
        .await?;
    Ok(Json(cart.into()))
}

async fn update_quantity(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Path(product_id): Path<String>,
    Json(body): Json<QuantityRequest>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .carts
        .update_cart_item_quantity(&ctx.uid, &product_id, body.quantity)
        .await?;
    Ok(Json(cart.into()))
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Path(product_id): Path<String>,
) -> Result<Json<CartResponse>> {
    let cart = state.carts.remove_from_cart(&ctx.uid, &product_id).await?;
    Ok(Json(cart.into()))
}

async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<CartResponse>> {
    Ok(Json(state.carts.clear_cart(&ctx.uid).await?.into()))
}
