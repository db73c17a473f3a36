// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog service: products and countries.
//!
//! All "by X" listings fetch the products collection and filter/sort in
//! the application, so no composite indexes need provisioning.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::middleware::SessionContext;
use crate::models::{Country, NewProduct, Product, ProductUpdate};
use serde::Deserialize;
use std::cmp::Ordering;
use validator::Validate;

/// Upper bound on a single listing page.
pub const MAX_PAGE_SIZE: usize = 100;

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
}

/// Buyer-facing listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub country_id: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sort: ProductSort,
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

impl ProductQuery {
    fn matches(&self, product: &Product) -> bool {
        product.active
            && self
                .country_id
                .as_deref()
                .map_or(true, |c| product.country_id == c)
            && self
                .category
                .as_deref()
                .map_or(true, |c| product.category.eq_ignore_ascii_case(c))
            && (!self.featured || product.featured)
    }
}

fn sort_products(products: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        ProductSort::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        ProductSort::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        ProductSort::Rating => products.sort_by(|a, b| {
            let ra = a.average_rating.unwrap_or(0.0);
            let rb = b.average_rating.unwrap_or(0.0);
            rb.partial_cmp(&ra)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.review_count.cmp(&a.review_count))
        }),
    }
}

/// Apply offset and a limit clamped to `MAX_PAGE_SIZE`.
fn paginate<T>(items: Vec<T>, offset: usize, limit: Option<usize>) -> Vec<T> {
    let limit = limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE);
    items.into_iter().skip(offset).take(limit).collect()
}

#[derive(Clone)]
pub struct CatalogService {
    db: FirestoreDb,
}

impl CatalogService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    // ─── Products ────────────────────────────────────────────────

    /// Create a product owned by the calling seller.
    pub async fn add_product(&self, ctx: &SessionContext, new: NewProduct) -> Result<Product> {
        ctx.require_seller()?;
        new.validate()?;

        let product = Product::from_new(
            uuid::Uuid::new_v4().to_string(),
            &ctx.uid,
            ctx.public_name(),
            new,
            chrono::Utc::now(),
        );
        self.db.set_product(&product).await?;

        tracing::info!(
            seller_id = %ctx.uid,
            product_id = %product.id,
            "Product created"
        );
        Ok(product)
    }

    pub async fn get_product(&self, product_id: &str) -> Result<Product> {
        self.db
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))
    }

    /// A seller's own products (including inactive ones), newest first.
    pub async fn get_seller_products(&self, seller_id: &str) -> Result<Vec<Product>> {
        let mut products = self
            .db
            .query(crate::db::collections::PRODUCTS, |p: &Product| {
                p.seller_id == seller_id
            })
            .await?;
        sort_products(&mut products, ProductSort::Newest);
        Ok(products)
    }

    /// Buyer-facing listing.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let mut products = self
            .db
            .query(crate::db::collections::PRODUCTS, |p: &Product| {
                query.matches(p)
            })
            .await?;
        sort_products(&mut products, query.sort);
        Ok(paginate(products, query.offset, query.limit))
    }

    /// Active products, newest first, optionally limited.
    pub async fn get_all_products(&self, limit: Option<usize>) -> Result<Vec<Product>> {
        self.list_products(&ProductQuery {
            limit,
            ..Default::default()
        })
        .await
    }

    pub async fn get_products_by_country(&self, country_id: &str) -> Result<Vec<Product>> {
        self.list_products(&ProductQuery {
            country_id: Some(country_id.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn get_products_by_category(&self, category: &str) -> Result<Vec<Product>> {
        self.list_products(&ProductQuery {
            category: Some(category.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn get_featured_products(&self, limit: Option<usize>) -> Result<Vec<Product>> {
        self.list_products(&ProductQuery {
            featured: true,
            limit,
            ..Default::default()
        })
        .await
    }

    /// Load a product and check the caller owns it.
    async fn owned_product(&self, ctx: &SessionContext, product_id: &str) -> Result<Product> {
        ctx.require_seller()?;
        let product = self.get_product(product_id).await?;
        if product.seller_id != ctx.uid {
            return Err(AppError::Forbidden(format!(
                "Product {} belongs to another seller",
                product_id
            )));
        }
        Ok(product)
    }

    pub async fn update_product(
        &self,
        ctx: &SessionContext,
        product_id: &str,
        update: ProductUpdate,
    ) -> Result<Product> {
        update.validate()?;
        let mut product = self.owned_product(ctx, product_id).await?;

        product.apply_update(update, chrono::Utc::now());
        self.db.update_product_listing(&product).await?;

        tracing::info!(seller_id = %ctx.uid, product_id, "Product updated");
        Ok(product)
    }

    /// Hard delete.
    pub async fn delete_product(&self, ctx: &SessionContext, product_id: &str) -> Result<()> {
        self.owned_product(ctx, product_id).await?;
        self.db.delete_product(product_id).await?;

        tracing::info!(seller_id = %ctx.uid, product_id, "Product deleted");
        Ok(())
    }

    // ─── Countries ───────────────────────────────────────────────

    /// Active countries sorted by name.
    pub async fn get_countries(&self) -> Result<Vec<Country>> {
        let mut countries: Vec<Country> = self
            .db
            .list_countries()
            .await?
            .into_iter()
            .filter(|c| c.active)
            .collect();
        countries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(countries)
    }

    pub async fn get_country(&self, country_id: &str) -> Result<Country> {
        self.db
            .get_country(country_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Country {} not found", country_id)))
    }

    /// Bulk upsert of the static country list. Returns the number written.
    pub async fn seed_countries(&self, countries: &[Country]) -> Result<usize> {
        self.db.batch_set_countries(countries).await?;
        tracing::info!(count = countries.len(), "Seeded countries");
        Ok(countries.len())
    }

    /// Read the static country list from a JSON file.
    pub fn load_countries_from_file(path: &str) -> Result<Vec<Country>> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to read {}: {}", path, e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Invalid country list {}: {}", path, e))
        })
    }
}
