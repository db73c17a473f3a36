// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Product reviews.
//!
//! A buyer may review each product once per delivered order. The review
//! document ID encodes (user, product, order) and is written create-only,
//! so concurrent duplicates resolve to a single stored review.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::middleware::SessionContext;
use crate::models::review::review_document_id;
use crate::models::{NewReview, OrderStatus, ProductRating, ProductRatingFields, Review};
use validator::Validate;

#[derive(Clone)]
pub struct ReviewService {
    db: FirestoreDb,
}

impl ReviewService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Submit a review for a product in one of the caller's delivered orders.
    pub async fn add_review(&self, ctx: &SessionContext, mut new: NewReview) -> Result<Review> {
        // Length limits apply to the comment as stored.
        new.comment = new.comment.trim().to_string();
        new.validate()?;

        if self
            .has_user_reviewed_product(&ctx.uid, &new.product_id, &new.order_id)
            .await?
        {
            return Err(AppError::Conflict(
                "You have already reviewed this product for this order".to_string(),
            ));
        }

        let order = self
            .db
            .get_order(&new.order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", new.order_id)))?;
        if order.user_id != ctx.uid {
            return Err(AppError::Forbidden(
                "Only the buyer can review items in an order".to_string(),
            ));
        }
        if order.status != OrderStatus::Delivered {
            return Err(AppError::BadRequest(format!(
                "Order is {}; reviews open after delivery",
                order.status
            )));
        }
        let item = order
            .items
            .iter()
            .find(|i| i.product_id == new.product_id)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Product {} is not part of order {}",
                    new.product_id, new.order_id
                ))
            })?;

        let now = chrono::Utc::now();
        let review = Review {
            id: review_document_id(&ctx.uid, &new.product_id, &new.order_id),
            product_id: new.product_id,
            product_name: item.product_name.clone(),
            user_id: ctx.uid.clone(),
            user_name: ctx.public_name().to_string(),
            order_id: new.order_id,
            rating: new.rating,
            comment: new.comment,
            created_at: now,
            updated_at: now,
        };

        self.db.create_review(&review).await?;
        tracing::info!(
            review_id = %review.id,
            product_id = %review.product_id,
            rating = review.rating,
            "Review added"
        );

        self.update_product_rating(&review.product_id).await?;
        Ok(review)
    }

    pub async fn has_user_reviewed_product(
        &self,
        user_id: &str,
        product_id: &str,
        order_id: &str,
    ) -> Result<bool> {
        let id = review_document_id(user_id, product_id, order_id);
        Ok(self.db.get_review(&id).await?.is_some())
    }

    /// Reviews of a product, newest first.
    pub async fn get_product_reviews(&self, product_id: &str) -> Result<Vec<Review>> {
        let mut reviews = self.db.get_reviews_for_product(product_id).await?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    pub async fn get_product_rating(&self, product_id: &str) -> Result<ProductRating> {
        let reviews = self.db.get_reviews_for_product(product_id).await?;
        Ok(ProductRating::from_reviews(&reviews))
    }

    /// Recompute the aggregate from all reviews and store it on the product.
    ///
    /// Two concurrent recomputes may both read before either writes, leaving
    /// a stale aggregate until the next review.
    pub async fn update_product_rating(&self, product_id: &str) -> Result<ProductRating> {
        let rating = self.get_product_rating(product_id).await?;

        let fields = ProductRatingFields {
            average_rating: Some(rating.average_rating),
            review_count: Some(rating.review_count),
            updated_at: chrono::Utc::now(),
        };
        match self.db.update_product_rating(product_id, &fields).await {
            Ok(()) => {}
            Err(AppError::NotFound(_)) => {
                tracing::warn!(product_id, "Reviewed product no longer exists, rating not stored");
                return Ok(rating);
            }
            Err(e) => return Err(e),
        }

        tracing::debug!(
            product_id,
            average = rating.average_rating,
            count = rating.review_count,
            "Product rating updated"
        );
        Ok(rating)
    }

    /// The caller's reviews, newest first.
    pub async fn get_user_reviews(&self, ctx: &SessionContext) -> Result<Vec<Review>> {
        let mut reviews = self.db.get_reviews_for_user(&ctx.uid).await?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}
