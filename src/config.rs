// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Cloud Run injects secrets as environment variables via secret bindings,
//! so everything is read once at startup and cached in memory.

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

/// Path of the static country list used for seeding.
pub const COUNTRIES_SEED_PATH: &str = "data/countries.json";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL (CORS origin)
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Notification sink endpoint; `None` drops notifications after logging
    pub notification_webhook_url: Option<String>,
    /// Blob store bucket
    pub storage_bucket: String,
    /// Blob store REST base URL
    pub storage_base_url: String,
    /// Flat shipping cost applied at checkout
    pub shipping_cost: Decimal,
    /// Tax rate applied to the subtotal at checkout (0.19 = 19%)
    pub tax_rate: Decimal,
    /// Seed the countries collection at startup
    pub seed_countries: bool,
    /// Run against the in-process document store
    pub use_in_memory_store: bool,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Bearer token for the blob store, if it requires one
    pub storage_access_token: Option<String>,
}

impl Config {
    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            notification_webhook_url: None,
            storage_bucket: "test-project.appspot.com".to_string(),
            storage_base_url: "http://localhost:9199".to_string(),
            shipping_cost: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            seed_countries: false,
            use_in_memory_store: true,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            storage_access_token: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let gcp_project_id =
            env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string());

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            notification_webhook_url: optional_var("NOTIFICATION_WEBHOOK_URL"),
            storage_bucket: env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| format!("{}.appspot.com", gcp_project_id)),
            storage_base_url: env::var("STORAGE_BASE_URL")
                .unwrap_or_else(|_| "https://firebasestorage.googleapis.com".to_string()),
            shipping_cost: decimal_var("SHIPPING_COST")?,
            tax_rate: decimal_var("TAX_RATE")?,
            seed_countries: flag_var("SEED_COUNTRIES"),
            use_in_memory_store: flag_var("USE_IN_MEMORY_STORE"),
            gcp_project_id,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            storage_access_token: optional_var("STORAGE_ACCESS_TOKEN"),
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag_var(name: &str) -> bool {
    matches!(
        optional_var(name).as_deref(),
        Some("1") | Some("true") | Some("TRUE") | Some("yes")
    )
}

fn decimal_var(name: &'static str) -> Result<Decimal, ConfigError> {
    match optional_var(name) {
        None => Ok(Decimal::ZERO),
        Some(raw) => {
            let value = Decimal::from_str(&raw).map_err(|_| ConfigError::Invalid(name, raw))?;
            if value.is_sign_negative() {
                return Err(ConfigError::Invalid(name, value.to_string()));
            }
            Ok(value)
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("SHIPPING_COST", "4.95");
        env::set_var("SEED_COUNTRIES", "true");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.shipping_cost, Decimal::new(495, 2));
        assert_eq!(config.tax_rate, Decimal::ZERO);
        assert!(config.seed_countries);
        assert_eq!(config.port, 8080);

        env::remove_var("SHIPPING_COST");
        env::remove_var("SEED_COUNTRIES");
    }

    #[test]
    fn test_negative_decimal_rejected() {
        env::set_var("NEGATIVE_TEST_RATE", "-0.5");
        let err = decimal_var("NEGATIVE_TEST_RATE").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("NEGATIVE_TEST_RATE", _)));
        env::remove_var("NEGATIVE_TEST_RATE");
    }
}
