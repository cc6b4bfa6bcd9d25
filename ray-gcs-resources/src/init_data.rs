// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Snapshot of the persisted tables used to rebuild state after a GCS
//! restart.

use std::collections::HashMap;

use ray_common::id::NodeID;
use ray_proto::ray::rpc;

use crate::store_client::StoreResult;
use crate::table_storage::GcsTableStorage;

#[derive(Debug, Default, Clone)]
pub struct GcsInitData {
    nodes: HashMap<NodeID, rpc::GcsNodeInfo>,
    cluster_resources: HashMap<NodeID, rpc::ResourceMap>,
}

impl GcsInitData {
    pub fn new(
        nodes: HashMap<NodeID, rpc::GcsNodeInfo>,
        cluster_resources: HashMap<NodeID, rpc::ResourceMap>,
    ) -> Self {
        Self {
            nodes,
            cluster_resources,
        }
    }

    /// Read the node and node resource tables.
    ///
    /// Rows whose key is not a valid node id are skipped with a warning.
    pub async fn load(storage: &GcsTableStorage) -> StoreResult<Self> {
        let nodes = parse_keys(storage.node_table().get_all().await?, "Node");
        let cluster_resources =
            parse_keys(storage.node_resource_table().get_all().await?, "NodeResource");
        tracing::info!(
            num_nodes = nodes.len(),
            num_resource_rows = cluster_resources.len(),
            "Loaded GCS init data"
        );
        Ok(Self {
            nodes,
            cluster_resources,
        })
    }

    pub fn nodes(&self) -> &HashMap<NodeID, rpc::GcsNodeInfo> {
        &self.nodes
    }

    pub fn cluster_resources(&self) -> &HashMap<NodeID, rpc::ResourceMap> {
        &self.cluster_resources
    }
}

fn parse_keys<V>(rows: HashMap<String, V>, table: &str) -> HashMap<NodeID, V> {
    rows.into_iter()
        .filter_map(|(key, value)| match NodeID::try_from_hex(&key) {
            Some(node_id) => Some((node_id, value)),
            None => {
                tracing::warn!(table, %key, "Skipping row with malformed node id");
                None
            }
        })
        .collect()
}
