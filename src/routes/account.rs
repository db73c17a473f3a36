// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session and account routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::SESSION_COOKIE;
use crate::middleware::SessionContext;
use crate::models::{Role, User};
use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;

/// Routes behind the auth middleware.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", post(start_session))
        .route("/api/me", get(get_me))
        .route("/api/me/role", put(set_role))
}

/// Routes usable without a valid session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/logout", post(logout))
}

fn secure_cookies(state: &AppState) -> bool {
    state.config.frontend_url.starts_with("https://")
}

/// Register the caller on first sign-in and pin the session token in an
/// HttpOnly cookie.
async fn start_session(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<User>)> {
    let user = state.users.ensure_user(&ctx).await?;

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    let jar = match bearer {
        Some(token) => jar.add(
            Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(secure_cookies(&state)),
        ),
        // Already authenticated by cookie.
        None => jar,
    };

    tracing::info!(uid = %user.uid, role = ?user.role, "Session started");
    Ok((jar, Json(user)))
}

async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let removal = Cookie::build(SESSION_COOKIE)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure_cookies(&state));
    (StatusCode::NO_CONTENT, jar.remove(removal))
}

/// Current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<User>> {
    let user = state.users.get_user(&ctx.uid).await.map_err(|e| match e {
        AppError::NotFound(_) => {
            AppError::NotFound("No account yet; start a session first".to_string())
        }
        other => other,
    })?;
    Ok(Json(user))
}

#[derive(Deserialize)]
struct RoleRequest {
    role: Role,
}

/// Switch between buyer and seller.
async fn set_role(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<RoleRequest>,
) -> Result<Json<User>> {
    let user = state.users.set_role(&ctx, body.role).await?;
    Ok(Json(user))
}
