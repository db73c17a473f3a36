// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Review submission routes. Reading reviews is public (see catalog).

use crate::error::Result;
use crate::middleware::SessionContext;
use crate::models::{NewReview, Review};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/reviews", post(add_review))
        .route("/api/me/reviews", get(my_reviews))
}

async fn add_review(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Json(review): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = state.reviews.add_review(&ctx, review).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn my_reviews(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(state.reviews.get_user_reviews(&ctx).await?))
}
