// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public catalog routes: products, countries, categories, reviews.

use crate::error::Result;
use crate::models::{Country, Product, ProductRating, Review};
use crate::services::{ProductQuery, ProductSort};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/products/{id}/reviews", get(get_product_reviews))
        .route("/api/products/{id}/rating", get(get_product_rating))
        .route("/api/countries", get(list_countries))
        .route("/api/countries/{id}", get(get_country))
        .route("/api/countries/{id}/products", get(get_country_products))
        .route("/api/categories/{category}/products", get(get_category_products))
}

/// Paging and ordering for the scoped listings.
#[derive(Debug, Default, Deserialize)]
struct PageParams {
    #[serde(default)]
    sort: ProductSort,
    limit: Option<usize>,
    #[serde(default)]
    offset: usize,
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog.list_products(&query).await?))
}

/// Any product by ID, including inactive ones (order history links here).
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog.get_product(&id).await?))
}

async fn get_product_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(state.reviews.get_product_reviews(&id).await?))
}

async fn get_product_rating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductRating>> {
    Ok(Json(state.reviews.get_product_rating(&id).await?))
}

async fn list_countries(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Country>>> {
    Ok(Json(state.catalog.get_countries().await?))
}

async fn get_country(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Country>> {
    Ok(Json(state.catalog.get_country(&id).await?))
}

async fn get_country_products(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<Product>>> {
    let query = ProductQuery {
        country_id: Some(id),
        sort: page.sort,
        limit: page.limit,
        offset: page.offset,
        ..Default::default()
    };
    Ok(Json(state.catalog.list_products(&query).await?))
}

async fn get_category_products(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<Product>>> {
    let query = ProductQuery {
        category: Some(category),
        sort: page.sort,
        limit: page.limit,
        offset: page.offset,
        ..Default::default()
    };
    Ok(Json(state.catalog.list_products(&query).await?))
}
