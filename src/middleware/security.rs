// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security and caching headers middleware.

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};

/// Public catalog reads that browsers and CDNs may cache briefly.
fn is_public_catalog_read(method: &Method, path: &str) -> bool {
    method == Method::GET
        && (path.starts_with("/api/products")
            || path.starts_with("/api/countries")
            || path.starts_with("/api/categories"))
}

/// Add security headers to all responses, and a cache policy to API responses.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let cacheable = is_public_catalog_read(req.method(), req.uri().path());
    let is_api = req.uri().path().starts_with("/api/");

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    if is_api && !headers.contains_key(header::CACHE_CONTROL) {
        let policy = if cacheable && response.status().is_success() {
            "public, max-age=60"
        } else {
            "no-store"
        };
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static(policy));
    }

    response
}
