// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! In-process pub/sub used by the resource manager to publish resource
//! changes and usage batches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

/// Channel types for pub/sub. Values match the proto ChannelType enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ChannelType {
    RayNodeResourceUsageChannel = 9,
    GcsNodeResourceChannel = 11,
}

impl ChannelType {
    pub const ALL: [ChannelType; 2] = [
        ChannelType::RayNodeResourceUsageChannel,
        ChannelType::GcsNodeResourceChannel,
    ];
}

/// Message published on a channel.
#[derive(Debug, Clone)]
pub struct PubSubMessage {
    pub channel_type: ChannelType,
    pub key_id: Vec<u8>,
    pub value: Vec<u8>,
}

/// Publishing side of the GCS pub/sub, as seen by the resource manager.
///
/// Publishing is fire-and-forget: implementations must not block and have
/// no way to report delivery failures.
pub trait GcsPublisher: Send + Sync {
    fn publish(&self, channel_type: ChannelType, key_id: &[u8], value: Vec<u8>);
}

/// Channel-backed publisher with one tokio broadcast channel per type.
pub struct InternalPubSubHandler {
    channels: HashMap<ChannelType, broadcast::Sender<PubSubMessage>>,
    published: AtomicU64,
}

impl InternalPubSubHandler {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// `capacity` bounds how far a slow subscriber may lag before it starts
    /// missing messages.
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = ChannelType::ALL
            .into_iter()
            .map(|channel_type| (channel_type, broadcast::channel(capacity).0))
            .collect();
        Self {
            channels,
            published: AtomicU64::new(0),
        }
    }

    /// Subscribe to a channel (returns a broadcast receiver, for internal use).
    pub fn subscribe(&self, channel_type: ChannelType) -> broadcast::Receiver<PubSubMessage> {
        self.channels[&channel_type].subscribe()
    }

    /// Number of messages published since creation, delivered or not.
    pub fn num_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl GcsPublisher for InternalPubSubHandler {
    fn publish(&self, channel_type: ChannelType, key_id: &[u8], value: Vec<u8>) {
        self.published.fetch_add(1, Ordering::Relaxed);
        let msg = PubSubMessage {
            channel_type,
            key_id: key_id.to_vec(),
            value,
        };
        // No subscribers is not an error.
        if let Some(tx) = self.channels.get(&channel_type) {
            let _ = tx.send(msg);
        }
    }
}

impl Default for InternalPubSubHandler {
    fn default() -> Self {
        Self::new()
    }
}
