// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Buyer checkout and order history routes.

use crate::error::Result;
use crate::middleware::SessionContext;
use crate::models::Order;
use crate::services::CheckoutRequest;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/checkout", post(checkout))
        .route("/api/orders", get(list_orders))
        .route("/api/orders/{id}", get(get_order))
}

async fn checkout(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.orders.checkout(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders.get_user_orders(&ctx).await?))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    Ok(Json(state.orders.get_order(&ctx, &id).await?))
}
