// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Store client abstraction: the persistence layer the GCS tables live in.
//!
//! Only the in-memory backend is provided here. The resource manager only
//! reads from the store, during recovery.

use std::collections::HashMap;

use dashmap::DashMap;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("decode error in table {table}: {source}")]
    Decode {
        table: String,
        #[source]
        source: prost::DecodeError,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Async KV operations organized by table.
///
/// Tables are logical namespaces (e.g. "Node", "NodeResource"); each one is
/// an independent key-value map.
#[async_trait::async_trait]
pub trait StoreClient: Send + Sync {
    /// Put a key-value pair. Returns true if the key already existed.
    async fn put(
        &self,
        table: &str,
        key: &str,
        data: Vec<u8>,
        overwrite: bool,
    ) -> StoreResult<bool>;

    async fn get(&self, table: &str, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Get all key-value pairs in a table.
    async fn get_all(&self, table: &str) -> StoreResult<HashMap<String, Vec<u8>>>;

    /// Delete a key. Returns true if the key existed.
    async fn delete(&self, table: &str, key: &str) -> StoreResult<bool>;

    async fn exists(&self, table: &str, key: &str) -> StoreResult<bool>;
}

/// Thread-safe in-memory store client for non-HA deployments.
#[derive(Default)]
pub struct InMemoryStoreClient {
    /// Table name → (key → value).
    tables: DashMap<String, DashMap<String, Vec<u8>>>,
}

impl InMemoryStoreClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StoreClient for InMemoryStoreClient {
    async fn put(
        &self,
        table: &str,
        key: &str,
        data: Vec<u8>,
        overwrite: bool,
    ) -> StoreResult<bool> {
        let tbl = self.tables.entry(table.to_string()).or_default();
        let existed = tbl.contains_key(key);
        if existed && !overwrite {
            return Ok(true);
        }
        tbl.insert(key.to_string(), data);
        Ok(existed)
    }

    async fn get(&self, table: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self
            .tables
            .get(table)
            .and_then(|tbl| tbl.get(key).map(|v| v.value().clone())))
    }

    async fn get_all(&self, table: &str) -> StoreResult<HashMap<String, Vec<u8>>> {
        Ok(self
            .tables
            .get(table)
            .map(|tbl| {
                tbl.iter()
                    .map(|e| (e.key().clone(), e.value().clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete(&self, table: &str, key: &str) -> StoreResult<bool> {
        Ok(self
            .tables
            .get(table)
            .is_some_and(|tbl| tbl.remove(key).is_some()))
    }

    async fn exists(&self, table: &str, key: &str) -> StoreResult<bool> {
        Ok(self
            .tables
            .get(table)
            .is_some_and(|tbl| tbl.contains_key(key)))
    }
}
