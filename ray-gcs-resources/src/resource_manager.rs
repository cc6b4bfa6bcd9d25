// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! GCS Resource Manager: the authoritative per-node resource view.
//!
//! The manager keeps one [`NodeResources`] ledger per alive node, the latest
//! resource usage report (heartbeat) of each node, and the most recent
//! placement group load. It is not thread-safe on its own: it is owned by the
//! control loop (see [`crate::event_loop`]) and every mutation runs there.
//! The one exception is the broadcast buffer, which the periodic broadcaster
//! drains from another task and which therefore carries its own lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ray_common::config::RayConfig;
use ray_common::id::NodeID;
use ray_common::scheduling::ResourceSet;
use ray_common::status::{RayError, RayResult};
use ray_proto::ray::rpc;

use crate::init_data::GcsInitData;
use crate::node_resources::NodeResources;
use crate::pubsub_handler::GcsPublisher;
use crate::resource_handlers::CountType;
use crate::resource_usage_buffer::ResourceUsageBuffer;

/// Callback invoked after a node's resources change.
pub type ResourcesChangedListener = Box<dyn Fn() + Send>;

/// Knobs of the resource manager and its broadcaster.
#[derive(Debug, Clone, PartialEq)]
pub struct GcsResourceManagerConfig {
    /// Broadcast tick; the same as the raylet report period.
    pub broadcast_period: Duration,
    pub max_broadcasting_batch_size: usize,
    /// Publish usage batches over pub/sub. Off when the gRPC syncer carries
    /// resource usage instead.
    pub legacy_broadcast_enabled: bool,
    /// `None` disables the periodic debug dump.
    pub debug_dump_period: Option<Duration>,
}

impl GcsResourceManagerConfig {
    pub fn from_ray_config(config: &RayConfig) -> Self {
        Self {
            broadcast_period: Duration::from_millis(
                config.raylet_report_resources_period_milliseconds.max(1),
            ),
            max_broadcasting_batch_size: usize::try_from(config.resource_broadcast_batch_size)
                .unwrap_or(usize::MAX)
                .max(1),
            legacy_broadcast_enabled: !config.grpc_based_resource_broadcast,
            debug_dump_period: (config.debug_dump_period_milliseconds > 0)
                .then(|| Duration::from_millis(config.debug_dump_period_milliseconds)),
        }
    }
}

impl Default for GcsResourceManagerConfig {
    fn default() -> Self {
        Self::from_ray_config(&RayConfig::default())
    }
}

/// Parse the binary node id carried in a request or report.
pub(crate) fn parse_node_id(bytes: &[u8]) -> RayResult<NodeID> {
    NodeID::try_from_binary(bytes).ok_or_else(|| {
        RayError::invalid_argument(format!(
            "malformed node id of {} bytes (expected {})",
            bytes.len(),
            NodeID::SIZE
        ))
    })
}

pub struct GcsResourceManager {
    cluster_resources: HashMap<NodeID, NodeResources>,
    /// Newest resource usage report of every node.
    node_resource_usages: HashMap<NodeID, rpc::ResourcesData>,
    /// Normal task resources can arrive out of order (periodic reports and
    /// rejected lease replies), so the newest accepted timestamp is tracked.
    latest_resources_normal_task_timestamp: HashMap<NodeID, i64>,
    placement_group_load: Option<rpc::PlacementGroupLoad>,
    listeners: Vec<ResourcesChangedListener>,
    usage_buffer: Arc<ResourceUsageBuffer>,
    pub(crate) publisher: Arc<dyn GcsPublisher>,
    pub(crate) counts: [u64; CountType::COUNT],
}

impl GcsResourceManager {
    pub fn new(config: &GcsResourceManagerConfig, publisher: Arc<dyn GcsPublisher>) -> Self {
        Self {
            cluster_resources: HashMap::new(),
            node_resource_usages: HashMap::new(),
            latest_resources_normal_task_timestamp: HashMap::new(),
            placement_group_load: None,
            listeners: Vec::new(),
            usage_buffer: Arc::new(ResourceUsageBuffer::new(
                config.max_broadcasting_batch_size,
            )),
            publisher,
            counts: [0; CountType::COUNT],
        }
    }

    /// Shared handle on the broadcast buffer, for the broadcaster task.
    pub fn usage_buffer(&self) -> Arc<ResourceUsageBuffer> {
        Arc::clone(&self.usage_buffer)
    }

    /// Rebuild state from the persisted tables after a GCS restart.
    ///
    /// Alive nodes are registered first, then capacity overrides recorded in
    /// the node resource table are applied to them. Listeners are not
    /// notified.
    pub fn initialize(&mut self, init_data: &GcsInitData) {
        for (node_id, node) in init_data.nodes() {
            if node.state() == rpc::gcs_node_info::GcsNodeState::Alive {
                self.add_node(*node_id, node);
            }
        }
        for (node_id, resource_map) in init_data.cluster_resources() {
            if let Some(ledger) = self.cluster_resources.get_mut(node_id) {
                let capacities = resource_map
                    .items
                    .iter()
                    .map(|(name, data)| (name.clone(), data.resource_capacity))
                    .collect();
                ledger.update_capacity(&capacities);
            }
        }
        tracing::info!(
            num_nodes = self.cluster_resources.len(),
            "Finished initializing GCS resource manager"
        );
    }

    // ─── Node lifecycle ─────────────────────────────────────────────

    /// Register a node with everything available. Re-registering an id
    /// replaces its ledger.
    pub fn on_node_add(&mut self, node: &rpc::GcsNodeInfo) -> RayResult<()> {
        let node_id = parse_node_id(&node.node_id)?;
        self.add_node(node_id, node);
        self.notify_listeners();
        Ok(())
    }

    fn add_node(&mut self, node_id: NodeID, node: &rpc::GcsNodeInfo) {
        let total = ResourceSet::from_map(&node.resources_total);
        tracing::debug!(?node_id, %total, "Node added to resource manager");
        self.cluster_resources
            .insert(node_id, NodeResources::new(total));
    }

    /// Forget everything about a node. Unknown ids are ignored.
    pub fn on_node_dead(&mut self, node_id: &NodeID) {
        let known = self.cluster_resources.remove(node_id).is_some();
        self.node_resource_usages.remove(node_id);
        self.latest_resources_normal_task_timestamp.remove(node_id);
        self.usage_buffer.remove(node_id);
        if known {
            tracing::debug!(?node_id, "Node removed from resource manager");
            self.notify_listeners();
        }
    }

    // ─── Ledger operations ──────────────────────────────────────────

    /// Replace the available resources of a node, clamped into its totals.
    pub fn set_available_resources(
        &mut self,
        node_id: &NodeID,
        resources: &ResourceSet,
    ) -> RayResult<()> {
        let ledger = self.ledger_mut(node_id)?;
        ledger.set_available(resources);
        self.notify_listeners();
        Ok(())
    }

    /// All-or-nothing deduction. Returns false for unknown nodes or when any
    /// resource is short.
    pub fn acquire_resources(&mut self, node_id: &NodeID, required: &ResourceSet) -> bool {
        let Some(ledger) = self.cluster_resources.get_mut(node_id) else {
            tracing::debug!(?node_id, "Acquire on unknown node");
            return false;
        };
        if !ledger.acquire(required) {
            return false;
        }
        self.notify_listeners();
        true
    }

    /// Give resources back, capped at the node totals. Returns false only
    /// for unknown nodes.
    pub fn release_resources(&mut self, node_id: &NodeID, acquired: &ResourceSet) -> bool {
        let Some(ledger) = self.cluster_resources.get_mut(node_id) else {
            tracing::debug!(?node_id, "Release on unknown node");
            return false;
        };
        if ledger.release(acquired) {
            tracing::warn!(?node_id, %acquired, "Released more than the node total, clamped");
        }
        self.notify_listeners();
        true
    }

    /// Set new capacities; available amounts shift by the same delta.
    pub fn update_resource_capacity(
        &mut self,
        node_id: &NodeID,
        changed_resources: &HashMap<String, f64>,
    ) -> RayResult<()> {
        self.ledger_mut(node_id)?
            .update_capacity(changed_resources);
        self.notify_listeners();
        Ok(())
    }

    pub fn delete_resources(
        &mut self,
        node_id: &NodeID,
        resource_names: &[String],
    ) -> RayResult<()> {
        self.ledger_mut(node_id)?.delete(resource_names);
        self.notify_listeners();
        Ok(())
    }

    fn ledger_mut(&mut self, node_id: &NodeID) -> RayResult<&mut NodeResources> {
        self.cluster_resources
            .get_mut(node_id)
            .ok_or_else(|| RayError::not_found(format!("node {node_id} does not exist")))
    }

    /// Snapshot of every node's ledger.
    pub fn get_cluster_resources(&self) -> HashMap<NodeID, NodeResources> {
        self.cluster_resources.clone()
    }

    pub fn node_resources(&self, node_id: &NodeID) -> Option<&NodeResources> {
        self.cluster_resources.get(node_id)
    }

    pub(crate) fn cluster_resources_iter(
        &self,
    ) -> impl Iterator<Item = (&NodeID, &NodeResources)> {
        self.cluster_resources.iter()
    }

    pub fn add_resources_changed_listener(&mut self, listener: ResourcesChangedListener) {
        self.listeners.push(listener);
    }

    fn notify_listeners(&self) {
        for listener in &self.listeners {
            listener();
        }
    }

    // ─── Heartbeats ─────────────────────────────────────────────────

    /// Entry point for a report coming off the wire.
    ///
    /// The ledger's available resources are resynchronized from the report
    /// the first time a node reports and whenever it flags them as changed.
    pub fn update_from_resource_report(&mut self, report: &rpc::ResourcesData) -> RayResult<()> {
        let node_id = parse_node_id(&report.node_id)?;
        if !self.node_resource_usages.contains_key(&node_id) || report.resources_available_changed
        {
            let available = ResourceSet::from_map(&report.resources_available);
            if let Some(ledger) = self.cluster_resources.get_mut(&node_id) {
                ledger.set_available(&available);
            } else {
                tracing::debug!(?node_id, "Resource report from unregistered node");
            }
        }
        self.update_node_resource_usage(&node_id, report);
        Ok(())
    }

    /// Merge a report into the node's latest snapshot and queue its
    /// lightweight delta for broadcast.
    pub fn update_node_resource_usage(&mut self, node_id: &NodeID, report: &rpc::ResourcesData) {
        match self.node_resource_usages.get_mut(node_id) {
            None => {
                let mut snapshot = report.clone();
                // Normal task resources go through the timestamp check below.
                snapshot.resources_normal_task.clear();
                self.node_resource_usages.insert(*node_id, snapshot);
            }
            Some(snapshot) => {
                if !report.resources_total.is_empty() {
                    snapshot.resources_total = report.resources_total.clone();
                }
                if report.resources_available_changed {
                    snapshot.resources_available = report.resources_available.clone();
                }
                if report.resource_load_changed {
                    snapshot.resource_load = report.resource_load.clone();
                }
                snapshot.resource_load_by_shape = report.resource_load_by_shape.clone();
                snapshot.cluster_full_of_actors_detected = report.cluster_full_of_actors_detected;
                snapshot.should_global_gc = report.should_global_gc;
                snapshot.resources_available_changed = report.resources_available_changed;
                snapshot.resource_load_changed = report.resource_load_changed;
                if !report.node_manager_address.is_empty() {
                    snapshot
                        .node_manager_address
                        .clone_from(&report.node_manager_address);
                }
            }
        }
        let normal_task_accepted = self.update_node_normal_task_resources(node_id, report);

        self.usage_buffer.insert(
            *node_id,
            lightweight_delta(node_id, report, normal_task_accepted),
        );
        self.notify_listeners();
    }

    /// Apply the normal task resources of a report unless an equal or newer
    /// report was already applied. Returns whether they were applied.
    pub fn update_node_normal_task_resources(
        &mut self,
        node_id: &NodeID,
        report: &rpc::ResourcesData,
    ) -> bool {
        if !report.resources_normal_task_changed {
            return false;
        }
        let Some(snapshot) = self.node_resource_usages.get_mut(node_id) else {
            return false;
        };
        let incoming = report.resources_normal_task_timestamp;
        if let Some(&stored) = self.latest_resources_normal_task_timestamp.get(node_id) {
            if incoming < stored {
                tracing::debug!(?node_id, incoming, stored, "Dropping stale normal task resources");
                return false;
            }
        }
        snapshot.resources_normal_task = report.resources_normal_task.clone();
        snapshot.resources_normal_task_changed = true;
        snapshot.resources_normal_task_timestamp = incoming;
        self.latest_resources_normal_task_timestamp
            .insert(*node_id, incoming);
        true
    }

    pub fn node_resource_usage(&self, node_id: &NodeID) -> Option<&rpc::ResourcesData> {
        self.node_resource_usages.get(node_id)
    }

    pub(crate) fn node_resource_usages(&self) -> &HashMap<NodeID, rpc::ResourcesData> {
        &self.node_resource_usages
    }

    /// Replace the placement group load reported to the autoscaler.
    pub fn update_placement_group_load(&mut self, load: rpc::PlacementGroupLoad) {
        self.placement_group_load = Some(load);
    }

    pub fn placement_group_load(&self) -> Option<&rpc::PlacementGroupLoad> {
        self.placement_group_load.as_ref()
    }

    /// Move up to one batch of buffered deltas into `buffer`. Not idempotent.
    pub fn get_resource_usage_batch_for_broadcast(
        &self,
        buffer: &mut rpc::ResourceUsageBroadcastData,
    ) -> usize {
        self.usage_buffer.drain_into(buffer)
    }

    pub fn count(&self, count_type: CountType) -> u64 {
        self.counts[count_type as usize]
    }

    pub fn debug_string(&self) -> String {
        let mut out = String::from("GcsResourceManager:");
        for count_type in CountType::ALL {
            out.push_str(&format!(
                "\n- {} request count: {}",
                count_type.name(),
                self.count(count_type)
            ));
        }
        out
    }
}

/// The part of a report worth broadcasting: only fields flagged as changed,
/// plus the load by shape. Totals and addresses are not broadcast.
fn lightweight_delta(
    node_id: &NodeID,
    report: &rpc::ResourcesData,
    include_normal_task: bool,
) -> rpc::ResourcesData {
    let mut delta = rpc::ResourcesData {
        node_id: node_id.binary(),
        resource_load_by_shape: report.resource_load_by_shape.clone(),
        should_global_gc: report.should_global_gc,
        cluster_full_of_actors_detected: report.cluster_full_of_actors_detected,
        ..Default::default()
    };
    if report.resources_available_changed {
        delta.resources_available = report.resources_available.clone();
        delta.resources_available_changed = true;
    }
    if report.resource_load_changed {
        delta.resource_load = report.resource_load.clone();
        delta.resource_load_changed = true;
    }
    if include_normal_task {
        delta.resources_normal_task = report.resources_normal_task.clone();
        delta.resources_normal_task_changed = true;
        delta.resources_normal_task_timestamp = report.resources_normal_task_timestamp;
    }
    delta
}

impl fmt::Display for GcsResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes: Vec<_> = self.cluster_resources.iter().collect();
        nodes.sort_by_key(|(node_id, _)| **node_id);
        writeln!(f, "{{")?;
        for (node_id, ledger) in nodes {
            writeln!(f, "  {node_id} : {ledger},")?;
        }
        writeln!(f, "}}")
    }
}
