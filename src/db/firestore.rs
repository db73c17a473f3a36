// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile + role)
//! - Products and countries (catalog)
//! - Carts (one document per user)
//! - Orders (checkout snapshots)
//! - Reviews (one per user/product/order)
//!
//! There are no transactions here. `set_*` writes overwrite the whole
//! document (last write wins); `create_*` writes fail with `Conflict` if
//! the document exists, which is what the checkout idempotency key and
//! review uniqueness rely on. Product edits and rating recomputes use
//! field-masked `update_*` writes so neither overwrites the other.

use crate::db::collections;
use crate::db::MemoryStore;
use crate::error::AppError;
use crate::models::{Cart, Country, Order, Product, ProductRatingFields, Review, User};
use futures_util::{stream, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

const MAX_CONCURRENT_DB_OPS: usize = 50;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
    Offline,
}

/// Document store client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

fn db_err(e: firestore::errors::FirestoreError) -> AppError {
    AppError::Database(e.to_string())
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Database(format!("Corrupt document: {}", e)))
}

fn encode<T: Serialize>(doc: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(doc).map_err(|e| AppError::Internal(e.into()))
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a client backed by a fresh in-process store.
    pub fn new_in_memory() -> Self {
        Self::with_memory_store(Arc::new(MemoryStore::new()))
    }

    /// Create a client over an existing in-process store (shared with a test).
    pub fn with_memory_store(store: Arc<MemoryStore>) -> Self {
        Self {
            backend: Backend::Memory(store),
        }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    fn offline() -> AppError {
        AppError::Database("Database not connected (offline mode)".to_string())
    }

    // ─── Document Primitives ─────────────────────────────────────

    async fn get_doc<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collection)
                .obj()
                .one(id)
                .await
                .map_err(db_err),
            Backend::Memory(store) => store.get(collection, id)?.map(decode).transpose(),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Overwrite a whole document (last write wins).
    async fn set_doc<T>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collection)
                    .document_id(id)
                    .object(doc)
                    .execute()
                    .await
                    .map_err(db_err)?;
                Ok(())
            }
            Backend::Memory(store) => store.set(collection, id, encode(doc)?),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Create a document; `Conflict` if the ID is taken.
    async fn create_doc<T>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .insert()
                    .into(collection)
                    .document_id(id)
                    .object(doc)
                    .execute()
                    .await
                    .map_err(|e| match e {
                        firestore::errors::FirestoreError::DataConflictError(_) => {
                            AppError::Conflict(format!(
                                "Document {}/{} already exists",
                                collection, id
                            ))
                        }
                        other => db_err(other),
                    })?;
                Ok(())
            }
            Backend::Memory(store) => store.create(collection, id, encode(doc)?),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Write only `fields` of an existing document; other fields keep
    /// whatever is stored. `NotFound` if the document is missing.
    async fn update_doc_fields<T>(
        &self,
        collection: &str,
        id: &str,
        doc: &T,
        fields: &[&str],
    ) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .fields(fields.iter().copied())
                    .in_col(collection)
                    .precondition(firestore::FirestoreWritePrecondition::Exists(true))
                    .document_id(id)
                    .object(doc)
                    .execute()
                    .await
                    .map_err(|e| match e {
                        firestore::errors::FirestoreError::DataNotFoundError(_) => {
                            AppError::NotFound(format!("Document {}/{} not found", collection, id))
                        }
                        other => db_err(other),
                    })?;
                Ok(())
            }
            Backend::Memory(store) => store.merge(collection, id, encode(doc)?, fields),
            Backend::Offline => Err(Self::offline()),
        }
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(id)
                    .execute()
                    .await
                    .map_err(db_err)?;
                Ok(())
            }
            Backend::Memory(store) => store.delete(collection, id),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Fetch a whole collection.
    async fn list_docs<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .from(collection)
                .obj()
                .query()
                .await
                .map_err(db_err),
            Backend::Memory(store) => store.list(collection)?.into_iter().map(decode).collect(),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Equality query on a single string field.
    async fn find_by_field<T>(
        &self,
        collection: &str,
        field: &'static str,
        value: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => {
                let value = value.to_string();
                client
                    .fluent()
                    .select()
                    .from(collection)
                    .filter(move |q| q.field(field).eq(value.clone()))
                    .obj()
                    .query()
                    .await
                    .map_err(db_err)
            }
            Backend::Memory(store) => store
                .list(collection)?
                .into_iter()
                .filter(|doc| doc.get(field).and_then(|v| v.as_str()) == Some(value))
                .map(decode)
                .collect(),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Fetch a collection and filter in the application.
    ///
    /// O(collection size) per call; fine at marketplace scale and needs no
    /// composite indexes.
    pub async fn query<T, F>(&self, collection: &str, predicate: F) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
        F: Fn(&T) -> bool,
    {
        let docs: Vec<T> = self.list_docs(collection).await?;
        Ok(docs.into_iter().filter(|doc| predicate(doc)).collect())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by identity-provider uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_doc(collections::USERS, uid).await
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.set_doc(collections::USERS, &user.uid, user).await
    }

    /// Create a user only if none exists yet.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        self.create_doc(collections::USERS, &user.uid, user).await
    }

    // ─── Product Operations ──────────────────────────────────────

    pub async fn get_product(&self, product_id: &str) -> Result<Option<Product>, AppError> {
        self.get_doc(collections::PRODUCTS, product_id).await
    }

    pub async fn set_product(&self, product: &Product) -> Result<(), AppError> {
        self.set_doc(collections::PRODUCTS, &product.id, product).await
    }

    /// Write the seller-editable fields of an existing product. Rating
    /// fields are left as stored.
    pub async fn update_product_listing(&self, product: &Product) -> Result<(), AppError> {
        self.update_doc_fields(
            collections::PRODUCTS,
            &product.id,
            product,
            Product::LISTING_FIELDS,
        )
        .await
    }

    /// Write only the denormalized rating of an existing product.
    pub async fn update_product_rating(
        &self,
        product_id: &str,
        rating: &ProductRatingFields,
    ) -> Result<(), AppError> {
        self.update_doc_fields(
            collections::PRODUCTS,
            product_id,
            rating,
            ProductRatingFields::FIELDS,
        )
        .await
    }

    pub async fn delete_product(&self, product_id: &str) -> Result<(), AppError> {
        self.delete_doc(collections::PRODUCTS, product_id).await
    }

    /// All products, active or not.
    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.list_docs(collections::PRODUCTS).await
    }

    // ─── Country Operations ──────────────────────────────────────

    pub async fn get_country(&self, country_id: &str) -> Result<Option<Country>, AppError> {
        self.get_doc(collections::COUNTRIES, country_id).await
    }

    pub async fn list_countries(&self) -> Result<Vec<Country>, AppError> {
        self.list_docs(collections::COUNTRIES).await
    }

    /// Store multiple countries.
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn batch_set_countries(&self, countries: &[Country]) -> Result<(), AppError> {
        stream::iter(countries)
            .map(|country| async move {
                self.set_doc(collections::COUNTRIES, &country.id, country)
                    .await
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    // ─── Cart Operations ─────────────────────────────────────────

    /// Get a user's cart document, if one was ever written.
    pub async fn get_cart(&self, user_id: &str) -> Result<Option<Cart>, AppError> {
        self.get_doc(collections::CARTS, user_id).await
    }

    /// Overwrite a user's cart document.
    pub async fn set_cart(&self, cart: &Cart) -> Result<(), AppError> {
        self.set_doc(collections::CARTS, &cart.user_id, cart).await
    }

    // ─── Order Operations ────────────────────────────────────────

    pub async fn get_order(&self, order_id: &str) -> Result<Option<Order>, AppError> {
        self.get_doc(collections::ORDERS, order_id).await
    }

    /// Create a new order document; `Conflict` if the ID already exists.
    pub async fn create_order(&self, order: &Order) -> Result<(), AppError> {
        self.create_doc(collections::ORDERS, &order.id, order).await
    }

    /// Overwrite an existing order (status/tracking updates).
    pub async fn set_order(&self, order: &Order) -> Result<(), AppError> {
        self.set_doc(collections::ORDERS, &order.id, order).await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        self.list_docs(collections::ORDERS).await
    }

    /// Orders placed by a buyer.
    pub async fn get_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, AppError> {
        self.find_by_field(collections::ORDERS, "userId", user_id)
            .await
    }

    // ─── Review Operations ───────────────────────────────────────

    pub async fn get_review(&self, review_id: &str) -> Result<Option<Review>, AppError> {
        self.get_doc(collections::REVIEWS, review_id).await
    }

    /// Create a review; `Conflict` if one with the same ID exists.
    pub async fn create_review(&self, review: &Review) -> Result<(), AppError> {
        self.create_doc(collections::REVIEWS, &review.id, review)
            .await
    }

    pub async fn get_reviews_for_product(&self, product_id: &str) -> Result<Vec<Review>, AppError> {
        self.find_by_field(collections::REVIEWS, "productId", product_id)
            .await
    }

    pub async fn get_reviews_for_user(&self, user_id: &str) -> Result<Vec<Review>, AppError> {
        self.find_by_field(collections::REVIEWS, "userId", user_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_offline_db_errors() {
        let db = FirestoreDb::new_mock();
        let err = db.get_cart("u1").await.unwrap_err();
        assert!(err.is_store_error());
    }

    #[tokio::test]
    async fn test_find_by_field_matches_camel_case() {
        let db = FirestoreDb::new_in_memory();
        let now = Utc::now();
        for (id, product) in [("r1", "p1"), ("r2", "p2"), ("r3", "p1")] {
            db.create_review(&Review {
                id: id.to_string(),
                product_id: product.to_string(),
                product_name: "Product".to_string(),
                user_id: "u1".to_string(),
                user_name: "User".to_string(),
                order_id: id.to_string(),
                rating: 4,
                comment: "Very good indeed".to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        }

        let reviews = db.get_reviews_for_product("p1").await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.product_id == "p1"));
    }
}
