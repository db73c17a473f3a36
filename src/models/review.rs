// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Product review model and rating aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored review record in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Document ID, derived from (user, product, order)
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub user_id: String,
    pub user_name: String,
    pub order_id: String,
    /// 1..=5
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Buyer input for a review.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1))]
    pub order_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(min = 10, max = 2000))]
    pub comment: String,
}

/// Document ID enforcing one review per (user, product, order).
pub fn review_document_id(user_id: &str, product_id: &str, order_id: &str) -> String {
    format!(
        "{}:{}:{}",
        urlencoding::encode(user_id),
        urlencoding::encode(product_id),
        urlencoding::encode(order_id)
    )
}

/// Aggregate rating of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProductRating {
    /// Mean rating rounded to one decimal; 0 with no reviews
    pub average_rating: f64,
    pub review_count: u32,
}

impl ProductRating {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }
        let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        let mean = f64::from(sum) / reviews.len() as f64;
        Self {
            average_rating: (mean * 10.0).round() / 10.0,
            review_count: reviews.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8) -> Review {
        let now = Utc::now();
        Review {
            id: "r".to_string(),
            product_id: "p".to_string(),
            product_name: "Product".to_string(),
            user_id: "u".to_string(),
            user_name: "User".to_string(),
            order_id: "o".to_string(),
            rating,
            comment: "Lovely, would buy again".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_rating_rounds_to_one_decimal() {
        let reviews: Vec<Review> = [5, 4, 4].into_iter().map(review).collect();
        let rating = ProductRating::from_reviews(&reviews);
        assert_eq!(rating.average_rating, 4.3);
        assert_eq!(rating.review_count, 3);

        let reviews: Vec<Review> = [5, 4].into_iter().map(review).collect();
        assert_eq!(ProductRating::from_reviews(&reviews).average_rating, 4.5);
    }

    #[test]
    fn test_rating_without_reviews() {
        assert_eq!(ProductRating::from_reviews(&[]), ProductRating::default());
    }

    #[test]
    fn test_review_document_id_escapes_separator() {
        assert_ne!(
            review_document_id("a:b", "c", "d"),
            review_document_id("a", "b:c", "d")
        );
        assert_eq!(review_document_id("u1", "p1", "o1"), "u1:p1:o1");
    }

    #[test]
    fn test_new_review_validation() {
        let valid = NewReview {
            product_id: "p".to_string(),
            order_id: "o".to_string(),
            rating: 5,
            comment: "Excellent olive oil".to_string(),
        };
        assert!(valid.validate().is_ok());

        let mut out_of_range = valid.clone();
        out_of_range.rating = 6;
        assert!(out_of_range.validate().is_err());

        let mut zero = valid.clone();
        zero.rating = 0;
        assert!(zero.validate().is_err());

        let mut short = valid;
        short.comment = "ok".to_string();
        assert!(short.validate().is_err());
    }
}
