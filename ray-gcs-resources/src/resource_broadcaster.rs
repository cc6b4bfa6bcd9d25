// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Periodic broadcast of buffered resource usage deltas.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use prost::Message;
use ray_common::runtime::PeriodicalRunner;
use ray_proto::ray::rpc;
use ray_util::time::Stopwatch;

use crate::pubsub_handler::{ChannelType, GcsPublisher};
use crate::resource_usage_buffer::ResourceUsageBuffer;

/// Drains the usage buffer once per tick and publishes the batch.
///
/// Runs off the control loop; the buffer is the only state it shares with
/// the resource manager.
pub struct ResourceUsageBroadcaster {
    buffer: Arc<ResourceUsageBuffer>,
    publisher: Arc<dyn GcsPublisher>,
    legacy_broadcast_enabled: bool,
    seq_no: AtomicI64,
}

impl ResourceUsageBroadcaster {
    pub fn new(
        buffer: Arc<ResourceUsageBuffer>,
        publisher: Arc<dyn GcsPublisher>,
        legacy_broadcast_enabled: bool,
    ) -> Self {
        Self {
            buffer,
            publisher,
            legacy_broadcast_enabled,
            seq_no: AtomicI64::new(0),
        }
    }

    /// Send one batch of buffered deltas as a single publish.
    ///
    /// Returns the number of deltas drained. With the legacy broadcast
    /// disabled the batch is drained but not published. Empty batches are
    /// never published.
    pub fn send_batched_resource_usage(&self) -> usize {
        let stopwatch = Stopwatch::new();
        let mut batch = rpc::ResourceUsageBroadcastData::default();
        let drained = self.buffer.drain_into(&mut batch);
        if drained == 0 || !self.legacy_broadcast_enabled {
            return drained;
        }
        batch.seq_no = self.seq_no.fetch_add(1, Ordering::Relaxed) + 1;
        let seq_no = batch.seq_no;
        self.publisher.publish(
            ChannelType::RayNodeResourceUsageChannel,
            &[],
            batch.encode_to_vec(),
        );
        tracing::trace!(
            seq_no,
            drained,
            pending = self.buffer.len(),
            elapsed_us = stopwatch.elapsed_us(),
            "Published resource usage batch"
        );
        drained
    }

    /// Last sequence number published, 0 before the first publish.
    pub fn last_seq_no(&self) -> i64 {
        self.seq_no.load(Ordering::Relaxed)
    }

    /// Run [`Self::send_batched_resource_usage`] every `period`.
    pub fn start(self: &Arc<Self>, period: Duration) -> PeriodicalRunner {
        let broadcaster = Arc::clone(self);
        PeriodicalRunner::start("ResourceUsageBroadcaster", period, move || {
            broadcaster.send_batched_resource_usage();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubsub_handler::InternalPubSubHandler;
    use ray_common::id::NodeID;

    fn fill(buffer: &ResourceUsageBuffer, n: usize) {
        for _ in 0..n {
            let node_id = NodeID::from_random();
            buffer.insert(
                node_id,
                rpc::ResourcesData {
                    node_id: node_id.binary(),
                    ..Default::default()
                },
            );
        }
    }

    fn setup(
        batch_size: usize,
        legacy: bool,
    ) -> (
        Arc<ResourceUsageBuffer>,
        Arc<InternalPubSubHandler>,
        Arc<ResourceUsageBroadcaster>,
    ) {
        let buffer = Arc::new(ResourceUsageBuffer::new(batch_size));
        let pubsub = Arc::new(InternalPubSubHandler::new());
        let broadcaster = Arc::new(ResourceUsageBroadcaster::new(
            buffer.clone(),
            pubsub.clone(),
            legacy,
        ));
        (buffer, pubsub, broadcaster)
    }

    #[tokio::test]
    async fn test_publishes_batches_in_sequence() {
        let (buffer, pubsub, broadcaster) = setup(2, true);
        let mut rx = pubsub.subscribe(ChannelType::RayNodeResourceUsageChannel);
        fill(&buffer, 3);

        assert_eq!(broadcaster.send_batched_resource_usage(), 2);
        assert_eq!(broadcaster.send_batched_resource_usage(), 1);
        assert_eq!(broadcaster.send_batched_resource_usage(), 0);

        let first = rpc::ResourceUsageBroadcastData::decode(rx.recv().await.unwrap().value.as_slice())
            .unwrap();
        let second = rpc::ResourceUsageBroadcastData::decode(rx.recv().await.unwrap().value.as_slice())
            .unwrap();
        assert_eq!((first.seq_no, first.batch.len()), (1, 2));
        assert_eq!((second.seq_no, second.batch.len()), (2, 1));
        assert_eq!(pubsub.num_published(), 2);
        assert_eq!(broadcaster.last_seq_no(), 2);
    }

    #[test]
    fn test_empty_batch_not_published() {
        let (_, pubsub, broadcaster) = setup(16, true);
        assert_eq!(broadcaster.send_batched_resource_usage(), 0);
        assert_eq!(pubsub.num_published(), 0);
    }

    #[test]
    fn test_drains_without_publishing_when_legacy_disabled() {
        let (buffer, pubsub, broadcaster) = setup(16, false);
        fill(&buffer, 3);
        assert_eq!(broadcaster.send_batched_resource_usage(), 3);
        assert!(buffer.is_empty());
        assert_eq!(pubsub.num_published(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_broadcast() {
        let (buffer, pubsub, broadcaster) = setup(16, true);
        let _runner = broadcaster.start(Duration::from_millis(100));

        fill(&buffer, 1);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(pubsub.num_published(), 1);

        // Nothing new buffered: the next tick publishes nothing.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(pubsub.num_published(), 1);

        fill(&buffer, 2);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(pubsub.num_published(), 2);
        assert!(buffer.is_empty());
    }
}
