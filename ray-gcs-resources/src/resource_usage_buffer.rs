// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Buffer of lightweight resource usage deltas awaiting broadcast.
//!
//! This is the only resource manager state touched from outside the
//! control loop (the periodic broadcaster drains it from its own task), so
//! it carries its own lock. The lock is held only to insert or to move
//! entries out; encoding and publishing happen after it is released.

use indexmap::IndexMap;
use parking_lot::Mutex;
use ray_common::id::NodeID;
use ray_proto::ray::rpc;

/// Pending per-node deltas since the last broadcast tick.
///
/// At most one delta per node is retained: a newer delta replaces the
/// pending one but keeps its place in line. When more nodes are pending than
/// fit in one batch, the oldest are sent first and the rest wait for the
/// next tick.
pub struct ResourceUsageBuffer {
    pending: Mutex<IndexMap<NodeID, rpc::ResourcesData>>,
    max_batch_size: usize,
}

impl ResourceUsageBuffer {
    /// `max_batch_size` of 0 is treated as 1.
    pub fn new(max_batch_size: usize) -> Self {
        Self {
            pending: Mutex::new(IndexMap::new()),
            max_batch_size: max_batch_size.max(1),
        }
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Queue `delta` for `node_id`, replacing any delta still pending.
    pub fn insert(&self, node_id: NodeID, delta: rpc::ResourcesData) {
        self.pending.lock().insert(node_id, delta);
    }

    /// Drop the pending delta of a node that left the cluster.
    pub fn remove(&self, node_id: &NodeID) -> Option<rpc::ResourcesData> {
        self.pending.lock().shift_remove(node_id)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Move up to `max_batch_size` pending deltas into `buffer`.
    ///
    /// This MOVES the deltas out, so it is not idempotent: a second call
    /// without new inserts in between yields nothing. Entries already in
    /// `buffer` count toward the cap. Returns the number of deltas moved.
    pub fn drain_into(&self, buffer: &mut rpc::ResourceUsageBroadcastData) -> usize {
        let room = self.max_batch_size.saturating_sub(buffer.batch.len());
        let drained: Vec<rpc::ResourcesData> = {
            let mut pending = self.pending.lock();
            let take = room.min(pending.len());
            pending.drain(..take).map(|(_, data)| data).collect()
        };
        let moved = drained.len();
        buffer
            .batch
            .extend(drained.into_iter().map(|data| rpc::ResourceUpdate {
                resource_change_or_data: Some(rpc::resource_update::ResourceChangeOrData::Data(
                    data,
                )),
            }));
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_id(v: u8) -> NodeID {
        let mut data = [0u8; 28];
        data[0] = v;
        NodeID::from_binary(&data)
    }

    fn delta(node: &NodeID, cpu: f64) -> rpc::ResourcesData {
        rpc::ResourcesData {
            node_id: node.binary(),
            resources_available: [("CPU".to_string(), cpu)].into_iter().collect(),
            resources_available_changed: true,
            ..Default::default()
        }
    }

    fn data_of(update: &rpc::ResourceUpdate) -> &rpc::ResourcesData {
        match update.resource_change_or_data.as_ref() {
            Some(rpc::resource_update::ResourceChangeOrData::Data(data)) => data,
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[test]
    fn test_drain_is_not_idempotent() {
        let buffer = ResourceUsageBuffer::new(16);
        let n1 = node_id(1);
        buffer.insert(n1, delta(&n1, 1.0));

        let mut first = rpc::ResourceUsageBroadcastData::default();
        assert_eq!(buffer.drain_into(&mut first), 1);
        assert_eq!(first.batch.len(), 1);

        let mut second = rpc::ResourceUsageBroadcastData::default();
        assert_eq!(buffer.drain_into(&mut second), 0);
        assert!(second.batch.is_empty());
    }

    #[test]
    fn test_newer_delta_overwrites_pending() {
        let buffer = ResourceUsageBuffer::new(16);
        let (n1, n2) = (node_id(1), node_id(2));
        buffer.insert(n1, delta(&n1, 1.0));
        buffer.insert(n2, delta(&n2, 2.0));
        buffer.insert(n1, delta(&n1, 3.0));
        assert_eq!(buffer.len(), 2);

        let mut out = rpc::ResourceUsageBroadcastData::default();
        buffer.drain_into(&mut out);
        assert_eq!(out.batch.len(), 2);
        // n1 keeps its original place but carries the newest value.
        let first = data_of(&out.batch[0]);
        assert_eq!(first.node_id, n1.binary());
        assert_eq!(first.resources_available.get("CPU"), Some(&3.0));
    }

    #[test]
    fn test_batch_cap_defers_excess() {
        let buffer = ResourceUsageBuffer::new(2);
        for i in 1..=5 {
            let n = node_id(i);
            buffer.insert(n, delta(&n, i as f64));
        }

        let mut sizes = Vec::new();
        let mut seen = Vec::new();
        loop {
            let mut out = rpc::ResourceUsageBroadcastData::default();
            if buffer.drain_into(&mut out) == 0 {
                break;
            }
            sizes.push(out.batch.len());
            seen.extend(out.batch.iter().map(|u| data_of(u).node_id[0]));
        }
        assert_eq!(sizes, vec![2, 2, 1]);
        // Oldest first, nothing lost.
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_existing_entries_count_toward_cap() {
        let buffer = ResourceUsageBuffer::new(2);
        for i in 1..=3 {
            let n = node_id(i);
            buffer.insert(n, delta(&n, 1.0));
        }
        let mut out = rpc::ResourceUsageBroadcastData::default();
        assert_eq!(buffer.drain_into(&mut out), 2);
        assert_eq!(buffer.drain_into(&mut out), 0);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_remove_pending() {
        let buffer = ResourceUsageBuffer::new(0);
        assert_eq!(buffer.max_batch_size(), 1);
        let n1 = node_id(1);
        buffer.insert(n1, delta(&n1, 1.0));
        assert!(buffer.remove(&n1).is_some());
        assert!(buffer.remove(&n1).is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_concurrent_insert_and_drain() {
        use std::sync::Arc;

        let buffer = Arc::new(ResourceUsageBuffer::new(1024));
        let writer = {
            let buffer = Arc::clone(&buffer);
            std::thread::spawn(move || {
                for i in 0..200u8 {
                    let n = node_id(i);
                    buffer.insert(n, delta(&n, 1.0));
                }
            })
        };
        let mut total = 0;
        while !writer.is_finished() {
            let mut out = rpc::ResourceUsageBroadcastData::default();
            total += buffer.drain_into(&mut out);
        }
        writer.join().unwrap();
        let mut out = rpc::ResourceUsageBroadcastData::default();
        total += buffer.drain_into(&mut out);
        assert_eq!(total, 200);
    }
}
