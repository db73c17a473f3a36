// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Product catalog model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Stored product record in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document ID
    pub id: String,
    /// Owning seller uid
    pub seller_id: String,
    pub seller_name: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Producer story shown on the product page
    #[serde(default)]
    pub story: String,
    pub price: Decimal,
    pub category: String,
    /// Country display name
    pub country: String,
    /// Country slug (matches `Country::id`)
    pub country_id: String,
    #[serde(default)]
    pub region: String,
    pub stock: u32,
    /// Free-form shelf life ("12 months")
    #[serde(default)]
    pub shelf_life: String,
    #[serde(default)]
    pub pair_with: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub featured: bool,
    /// Denormalized mean rating, maintained by the review service
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Stored field names a seller edit writes.
    pub const LISTING_FIELDS: &'static [&'static str] = &[
        "name",
        "description",
        "story",
        "price",
        "category",
        "region",
        "stock",
        "shelfLife",
        "pairWith",
        "tags",
        "imageUrl",
        "active",
        "featured",
        "updatedAt",
    ];

    /// Build a new product owned by `seller_id`.
    pub fn from_new(
        id: String,
        seller_id: &str,
        seller_name: &str,
        new: NewProduct,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            seller_id: seller_id.to_string(),
            seller_name: seller_name.to_string(),
            name: new.name,
            description: new.description,
            story: new.story,
            price: new.price,
            category: new.category,
            country: new.country,
            country_id: new.country_id,
            region: new.region,
            stock: new.stock,
            shelf_life: new.shelf_life,
            pair_with: new.pair_with,
            tags: new.tags,
            image_url: new.image_url,
            active: new.active,
            featured: new.featured,
            average_rating: None,
            review_count: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a seller edit. Ownership and rating fields are never touched.
    pub fn apply_update(&mut self, update: ProductUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(story) = update.story {
            self.story = story;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(region) = update.region {
            self.region = region;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(shelf_life) = update.shelf_life {
            self.shelf_life = shelf_life;
        }
        if let Some(pair_with) = update.pair_with {
            self.pair_with = pair_with;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        if let Some(featured) = update.featured {
            self.featured = featured;
        }
        self.updated_at = now;
    }
}

/// The denormalized rating fields of a product, written on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRatingFields {
    pub average_rating: Option<f64>,
    pub review_count: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRatingFields {
    pub const FIELDS: &'static [&'static str] = &["averageRating", "reviewCount", "updatedAt"];
}

/// Seller input for a new product.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub story: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(length(min = 1, max = 100))]
    pub country_id: String,
    #[serde(default)]
    pub region: String,
    pub stock: u32,
    #[serde(default)]
    pub shelf_life: String,
    #[serde(default)]
    pub pair_with: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub featured: bool,
}

/// Partial seller edit of an existing product.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 5000))]
    pub story: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub region: Option<String>,
    pub stock: Option<u32>,
    pub shelf_life: Option<String>,
    pub pair_with: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
    pub featured: Option<bool>,
}

fn default_true() -> bool {
    true
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() || price.is_zero() {
        return Err(ValidationError::new("price_not_positive"));
    }
    if price.scale() > 2 {
        return Err(ValidationError::new("price_too_precise"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Parmigiano Reggiano 24 mesi".to_string(),
            description: "Aged two years".to_string(),
            story: String::new(),
            price: Decimal::new(1250, 2),
            category: "cheese".to_string(),
            country: "Italy".to_string(),
            country_id: "italy".to_string(),
            region: "Emilia-Romagna".to_string(),
            stock: 45,
            shelf_life: "6 months".to_string(),
            pair_with: vec!["Lambrusco".to_string()],
            tags: vec![],
            image_url: None,
            active: true,
            featured: false,
        }
    }

    #[test]
    fn test_masked_field_names_exist_in_stored_form() {
        let product = Product::from_new(
            "p1".to_string(),
            "s1",
            "Caseificio",
            new_product(),
            Utc::now(),
        );
        let stored = serde_json::to_value(&product).unwrap();
        for field in Product::LISTING_FIELDS {
            assert!(stored.get(*field).is_some(), "missing {}", field);
        }
        assert!(!Product::LISTING_FIELDS.contains(&"averageRating"));

        let rating = serde_json::to_value(ProductRatingFields {
            average_rating: Some(4.5),
            review_count: Some(2),
            updated_at: Utc::now(),
        })
        .unwrap();
        for field in ProductRatingFields::FIELDS {
            assert!(rating.get(*field).is_some(), "missing {}", field);
            assert!(stored.get(*field).is_some(), "missing {}", field);
        }
    }

    #[test]
    fn test_new_product_validation() {
        assert!(new_product().validate().is_ok());

        let mut free = new_product();
        free.price = Decimal::ZERO;
        assert!(free.validate().is_err());

        let mut fractional = new_product();
        fractional.price = Decimal::new(12345, 3);
        assert!(fractional.validate().is_err());

        let mut unnamed = new_product();
        unnamed.name = String::new();
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_update_keeps_ownership_and_rating() {
        let now = Utc::now();
        let mut product =
            Product::from_new("p1".into(), "seller-1", "Caseificio", new_product(), now);
        product.average_rating = Some(4.5);
        product.review_count = Some(2);

        product.apply_update(
            ProductUpdate {
                price: Some(Decimal::new(1399, 2)),
                stock: Some(0),
                ..Default::default()
            },
            now,
        );

        assert_eq!(product.price, Decimal::new(1399, 2));
        assert_eq!(product.stock, 0);
        assert_eq!(product.seller_id, "seller-1");
        assert_eq!(product.average_rating, Some(4.5));
        assert_eq!(product.review_count, Some(2));
    }
}
