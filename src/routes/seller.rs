// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Seller dashboard routes: own products, incoming orders, images.
//!
//! All handlers require the seller role; ownership is checked in the
//! services.

use crate::error::{AppError, Result};
use crate::middleware::SessionContext;
use crate::models::{NewProduct, Order, OrderStatus, Product, ProductUpdate, SellerOrderStats};
use crate::services::storage::MAX_UPLOAD_BYTES;
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Longest base64 encoding of an image within the upload limit.
const MAX_ENCODED_IMAGE_LEN: usize = MAX_UPLOAD_BYTES.div_ceil(3) * 4;

/// Request body limit for image uploads: the encoded image plus the JSON
/// around it.
const UPLOAD_BODY_LIMIT: usize = MAX_ENCODED_IMAGE_LEN + 64 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/seller/products", get(my_products).post(create_product))
        .route(
            "/api/seller/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/api/seller/orders", get(my_orders))
        .route("/api/seller/stats", get(my_stats))
        .route("/api/seller/orders/{id}/status", put(update_status))
        .route("/api/seller/orders/{id}/tracking", put(update_tracking))
        .route(
            "/api/seller/images",
            post(upload_image)
                .delete(delete_image)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

// ─── Products ────────────────────────────────────────────────

async fn my_products(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Vec<Product>>> {
    ctx.require_seller()?;
    Ok(Json(state.catalog.get_seller_products(&ctx.uid).await?))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Json(new): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.catalog.add_product(&ctx, new).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog.update_product(&ctx, &id, update).await?))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.catalog.delete_product(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Orders ──────────────────────────────────────────────────

/// Orders containing this seller's items, projected to those items.
async fn my_orders(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Vec<Order>>> {
    ctx.require_seller()?;
    let orders = state.orders.get_seller_orders(&ctx.uid).await?;
    Ok(Json(
        orders.iter().map(|o| o.seller_view(&ctx.uid)).collect(),
    ))
}

async fn my_stats(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<SellerOrderStats>> {
    ctx.require_seller()?;
    Ok(Json(state.orders.get_seller_order_stats(&ctx.uid).await?))
}

#[derive(Deserialize)]
struct StatusRequest {
    status: OrderStatus,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Order>> {
    let order = state
        .orders
        .update_order_status(&ctx, &id, body.status)
        .await?;
    Ok(Json(order.seller_view(&ctx.uid)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackingRequest {
    tracking_number: String,
}

async fn update_tracking(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<TrackingRequest>,
) -> Result<Json<Order>> {
    let order = state
        .orders
        .update_tracking_number(&ctx, &id, &body.tracking_number)
        .await?;
    Ok(Json(order.seller_view(&ctx.uid)))
}

// ─── Images ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest {
    file_name: String,
    content_type: String,
    /// Standard base64 of the image bytes
    data: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Deserialize)]
struct DeleteImageRequest {
    url: String,
}

/// Keep file names to a safe, path-free subset.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.chars().take(100).collect()
    }
}

fn seller_image_prefix(seller_id: &str) -> String {
    format!("products/{}/", urlencoding::encode(seller_id))
}

async fn upload_image(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<UploadRequest>,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    ctx.require_seller()?;

    if body.data.len() > MAX_ENCODED_IMAGE_LEN {
        return Err(AppError::BadRequest("Image exceeds 5MB limit".to_string()));
    }
    let bytes = STANDARD
        .decode(body.data.as_bytes())
        .map_err(|_| AppError::BadRequest("Image data is not valid base64".to_string()))?;

    let path = format!(
        "{}{}-{}",
        seller_image_prefix(&ctx.uid),
        uuid::Uuid::new_v4(),
        sanitize_file_name(&body.file_name)
    );
    let url = state
        .storage
        .upload(bytes, &body.content_type, &path)
        .await?;

    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}

async fn delete_image(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<DeleteImageRequest>,
) -> Result<StatusCode> {
    ctx.require_seller()?;

    let path = state.storage.object_path(&body.url)?;
    if !path.starts_with(&seller_image_prefix(&ctx.uid)) {
        return Err(AppError::Forbidden(
            "Image belongs to another seller".to_string(),
        ));
    }
    state.storage.delete(&body.url).await?;
    Ok(StatusCode::NO_CONTENT)
}
