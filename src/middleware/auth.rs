// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.
//!
//! The identity provider issues HS256 session tokens; this middleware
//! verifies them, resolves the caller's role from the `users` collection
//! and hands an explicit [`SessionContext`] to the handlers.

use crate::error::AppError;
use crate::models::Role;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "eurofood_session";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity provider uid)
    pub sub: String,
    #[serde(default)]
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated caller, passed explicitly into every service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl SessionContext {
    pub fn is_seller(&self) -> bool {
        self.role == Role::Seller
    }

    /// Fail with `Forbidden` unless the caller is a seller.
    pub fn require_seller(&self) -> Result<(), AppError> {
        if self.is_seller() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Seller account required".to_string()))
        }
    }

    /// Name shown on reviews and notifications.
    pub fn public_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}

/// Verify a session token and return its claims.
pub fn verify_session_token(token: &str, signing_key: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data =
        decode::<Claims>(token, &key, &validation).map_err(|_| AppError::Unauthorized)?;
    if token_data.claims.sub.is_empty() {
        return Err(AppError::Unauthorized);
    }
    Ok(token_data.claims)
}

/// Middleware that requires a valid session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) => token.to_string(),
            None => return Err(AppError::Unauthorized),
        }
    };

    let claims = verify_session_token(&token, &state.config.jwt_signing_key)?;

    // Users who have not completed their first session yet are buyers.
    let role = state
        .db
        .get_user(&claims.sub)
        .await?
        .map(|u| u.role)
        .unwrap_or_default();

    let session = SessionContext {
        uid: claims.sub,
        email: claims.email,
        display_name: claims.name,
        role,
    };
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Create a session token (identity provider side; used by tools and tests).
pub fn create_session_token(
    uid: &str,
    email: &str,
    name: &str,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: uid.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        iat: now,
        exp: now + 7 * 24 * 60 * 60, // 7 days
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

    #[test]
    fn test_session_token_roundtrip() {
        let token = create_session_token("uid-1", "a@example.com", "Anna", KEY).unwrap();
        let claims = verify_session_token(&token, KEY).unwrap();

        assert_eq!(claims.sub, "uid-1");
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.name, "Anna");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = create_session_token("uid-1", "a@example.com", "Anna", KEY).unwrap();
        let err = verify_session_token(&token, b"another_key_that_is_32_bytes!!!!").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_require_seller() {
        let mut ctx = SessionContext {
            uid: "u".to_string(),
            email: "u@example.com".to_string(),
            display_name: String::new(),
            role: Role::Buyer,
        };
        assert!(matches!(ctx.require_seller(), Err(AppError::Forbidden(_))));
        assert_eq!(ctx.public_name(), "u@example.com");

        ctx.role = Role::Seller;
        assert!(ctx.require_seller().is_ok());
    }
}
