// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! GCS resource manager.
//!
//! Keeps the authoritative view of every node's total and available
//! resources, ingests resource usage reports from raylets, answers the
//! NodeResourceInfo RPCs, and periodically broadcasts a compact digest of
//! resource usage to subscribers.

pub mod event_loop;
pub mod grpc_services;
pub mod init_data;
pub mod node_resources;
pub mod pubsub_handler;
pub mod resource_broadcaster;
pub mod resource_handlers;
pub mod resource_manager;
pub mod resource_usage_buffer;
pub mod server;
pub mod store_client;
pub mod table_storage;

pub use event_loop::{ResourceManagerHandle, ResourceManagerLoop};
pub use resource_manager::{GcsResourceManager, GcsResourceManagerConfig};
pub use server::GcsResourceServer;
