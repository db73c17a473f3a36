// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Blob store for product images.
//!
//! Talks to the Firebase Storage REST API (or its emulator). Objects are
//! addressed by path inside the bucket; callers only ever see the
//! retrieval URL returned by [`StorageService::upload`].

use crate::config::Config;
use crate::error::{AppError, Result};
use dashmap::DashMap;
use std::sync::Arc;

/// Maximum accepted upload size (5 MB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
enum Backend {
    Http {
        http: reqwest::Client,
        access_token: Option<String>,
    },
    Memory(Arc<DashMap<String, (String, Vec<u8>)>>),
}

#[derive(Clone)]
pub struct StorageService {
    base_url: String,
    bucket: String,
    backend: Backend,
}

/// Reject uploads the blob store must not accept.
pub fn validate_upload(content_type: &str, len: usize) -> Result<()> {
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest(format!(
            "Unsupported content type {}: only images are accepted",
            content_type
        )));
    }
    if len == 0 {
        return Err(AppError::BadRequest("Empty upload".to_string()));
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(AppError::BadRequest(format!(
            "Image is {} bytes; the limit is 5MB",
            len
        )));
    }
    Ok(())
}

impl StorageService {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.storage_base_url.trim_end_matches('/').to_string(),
            bucket: config.storage_bucket.clone(),
            backend: Backend::Http {
                http: reqwest::Client::new(),
                access_token: config.storage_access_token.clone(),
            },
        }
    }

    /// In-memory store for tests.
    pub fn new_mock() -> Self {
        Self {
            base_url: "http://storage.invalid".to_string(),
            bucket: "mock-bucket".to_string(),
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/v0/b/{}/o/{}?alt=media",
            self.base_url,
            self.bucket,
            urlencoding::encode(path)
        )
    }

    /// Recover the object path from a URL produced by `object_url`.
    pub fn object_path(&self, url: &str) -> Result<String> {
        let prefix = format!("{}/v0/b/{}/o/", self.base_url, self.bucket);
        let encoded = url
            .strip_prefix(&prefix)
            .map(|rest| rest.split('?').next().unwrap_or(rest))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| AppError::BadRequest("URL does not belong to this bucket".to_string()))?;

        urlencoding::decode(encoded)
            .map(|p| p.into_owned())
            .map_err(|_| AppError::BadRequest("Malformed object URL".to_string()))
    }

    /// Store an image at `path` and return its retrieval URL.
    pub async fn upload(&self, data: Vec<u8>, content_type: &str, path: &str) -> Result<String> {
        validate_upload(content_type, data.len())?;
        if path.is_empty() || path.starts_with('/') || path.contains("..") {
            return Err(AppError::BadRequest(format!("Invalid object path {}", path)));
        }

        match &self.backend {
            Backend::Http { http, access_token } => {
                let url = format!("{}/v0/b/{}/o", self.base_url, self.bucket);
                let mut request = http
                    .post(&url)
                    .query(&[("uploadType", "media"), ("name", path)])
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(data);
                if let Some(token) = access_token {
                    request = request.bearer_auth(token);
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| AppError::Storage(e.to_string()))?;
                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::Storage(format!("Upload failed ({}): {}", status, body)));
                }
            }
            Backend::Memory(objects) => {
                objects.insert(path.to_string(), (content_type.to_string(), data));
            }
        }

        tracing::info!(path, content_type, "Image uploaded");
        Ok(self.object_url(path))
    }

    /// Delete an object by its retrieval URL.
    pub async fn delete(&self, url: &str) -> Result<()> {
        let path = self.object_path(url)?;

        match &self.backend {
            Backend::Http { http, access_token } => {
                let endpoint = format!(
                    "{}/v0/b/{}/o/{}",
                    self.base_url,
                    self.bucket,
                    urlencoding::encode(&path)
                );
                let mut request = http.delete(&endpoint);
                if let Some(token) = access_token {
                    request = request.bearer_auth(token);
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| AppError::Storage(e.to_string()))?;
                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(AppError::NotFound(format!("Image {} not found", path)));
                }
                if !response.status().is_success() {
                    return Err(AppError::Storage(format!(
                        "Delete failed ({})",
                        response.status()
                    )));
                }
            }
            Backend::Memory(objects) => {
                if objects.remove(&path).is_none() {
                    return Err(AppError::NotFound(format!("Image {} not found", path)));
                }
            }
        }

        tracing::info!(path = %path, "Image deleted");
        Ok(())
    }

    /// Whether an object exists in the in-memory backend.
    pub fn contains(&self, path: &str) -> bool {
        match &self.backend {
            Backend::Memory(objects) => objects.contains_key(path),
            Backend::Http { .. } => false,
        }
    }
}
