// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Mirrors the subset of Firestore semantics the application relies on:
//! per-document last-write-wins `set`, create-if-absent `create`,
//! field-masked `merge` into existing documents, and whole-collection
//! listing. Used for local development and tests.

use crate::error::AppError;
use dashmap::{DashMap, DashSet};
use serde_json::Value;
use std::collections::BTreeMap;

/// Collections of JSON documents keyed by document ID.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, BTreeMap<String, Value>>,
    /// Collections whose writes fail (partial-failure testing)
    failing_writes: DashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `collection` fail until turned off again.
    pub fn fail_writes(&self, collection: &str, fail: bool) {
        if fail {
            self.failing_writes.insert(collection.to_string());
        } else {
            self.failing_writes.remove(collection);
        }
    }

    fn check_writable(&self, collection: &str) -> Result<(), AppError> {
        if self.failing_writes.contains(collection) {
            return Err(AppError::Database(format!(
                "Injected write failure for {}",
                collection
            )));
        }
        Ok(())
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned()))
    }

    /// Overwrite (or create) a document.
    pub fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), AppError> {
        self.check_writable(collection)?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    /// Create a document, failing with `Conflict` if it already exists.
    ///
    /// The existence check and insert happen under the collection's shard lock.
    pub fn create(&self, collection: &str, id: &str, doc: Value) -> Result<(), AppError> {
        self.check_writable(collection)?;
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Err(AppError::Conflict(format!(
                "Document {}/{} already exists",
                collection, id
            )));
        }
        docs.insert(id.to_string(), doc);
        Ok(())
    }

    /// Copy `fields` of `doc` into an existing document.
    pub fn merge(
        &self,
        collection: &str,
        id: &str,
        doc: Value,
        fields: &[&str],
    ) -> Result<(), AppError> {
        self.check_writable(collection)?;
        let not_found = || AppError::NotFound(format!("Document {}/{} not found", collection, id));
        let mut docs = self.collections.get_mut(collection).ok_or_else(not_found)?;
        let Some(Value::Object(stored)) = docs.get_mut(id) else {
            return Err(not_found());
        };
        for field in fields {
            let value = doc.get(*field).cloned().unwrap_or(Value::Null);
            stored.insert((*field).to_string(), value);
        }
        Ok(())
    }

    pub fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.check_writable(collection)?;
        if let Some(mut docs) = self.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    /// All documents in a collection, in document-ID order.
    pub fn list(&self, collection: &str) -> Result<Vec<Value>, AppError> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }
}
