// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Typed wrappers over the raw store client.
//!
//! Each table stores protobuf-encoded values keyed by the hex encoding of a
//! node id.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use prost::Message;
use ray_common::id::NodeID;
use ray_proto::ray::rpc;

use crate::store_client::{StoreClient, StoreError, StoreResult};

/// Table names used by the resource manager.
pub mod table_names {
    pub const NODE: &str = "Node";
    pub const NODE_RESOURCE: &str = "NodeResource";
}

/// Generic typed table backed by a StoreClient.
pub struct GcsTable<V: Message + Default> {
    table_name: &'static str,
    store_client: Arc<dyn StoreClient>,
    _phantom: PhantomData<V>,
}

impl<V: Message + Default> GcsTable<V> {
    pub fn new(table_name: &'static str, store_client: Arc<dyn StoreClient>) -> Self {
        Self {
            table_name,
            store_client,
            _phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.table_name
    }

    pub async fn put(&self, node_id: &NodeID, value: &V) -> StoreResult<bool> {
        self.store_client
            .put(self.table_name, &node_id.hex(), value.encode_to_vec(), true)
            .await
    }

    pub async fn get(&self, node_id: &NodeID) -> StoreResult<Option<V>> {
        match self.store_client.get(self.table_name, &node_id.hex()).await? {
            Some(data) => self.decode(&data).map(Some),
            None => Ok(None),
        }
    }

    /// All rows, keyed by the raw (hex) key as stored.
    pub async fn get_all(&self) -> StoreResult<HashMap<String, V>> {
        let raw = self.store_client.get_all(self.table_name).await?;
        raw.into_iter()
            .map(|(key, data)| Ok((key, self.decode(&data)?)))
            .collect()
    }

    pub async fn delete(&self, node_id: &NodeID) -> StoreResult<bool> {
        self.store_client.delete(self.table_name, &node_id.hex()).await
    }

    fn decode(&self, data: &[u8]) -> StoreResult<V> {
        V::decode(data).map_err(|source| StoreError::Decode {
            table: self.table_name.to_string(),
            source,
        })
    }
}

/// The tables the resource manager recovers from.
pub struct GcsTableStorage {
    store_client: Arc<dyn StoreClient>,
}

impl GcsTableStorage {
    pub fn new(store_client: Arc<dyn StoreClient>) -> Self {
        Self { store_client }
    }

    pub fn node_table(&self) -> GcsTable<rpc::GcsNodeInfo> {
        GcsTable::new(table_names::NODE, self.store_client.clone())
    }

    /// Per-node capacity overrides made through the resource RPCs.
    pub fn node_resource_table(&self) -> GcsTable<rpc::ResourceMap> {
        GcsTable::new(table_names::NODE_RESOURCE, self.store_client.clone())
    }
}
