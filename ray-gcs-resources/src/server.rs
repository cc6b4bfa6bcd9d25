// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Resource manager startup and lifecycle.

use std::sync::Arc;

use ray_common::config::RayConfig;
use ray_common::runtime::PeriodicalRunner;

use crate::event_loop::{ResourceManagerHandle, ResourceManagerLoop};
use crate::grpc_services::NodeResourceInfoGcsServiceImpl;
use crate::init_data::GcsInitData;
use crate::pubsub_handler::InternalPubSubHandler;
use crate::resource_broadcaster::ResourceUsageBroadcaster;
use crate::resource_manager::{GcsResourceManager, GcsResourceManagerConfig};
use crate::store_client::StoreClient;
use crate::table_storage::GcsTableStorage;

/// A running resource manager: the control loop, the periodic broadcaster,
/// the RPC service and the pub/sub handler subscribers attach to.
pub struct GcsResourceServer {
    config: GcsResourceManagerConfig,
    pubsub_handler: Arc<InternalPubSubHandler>,
    event_loop: ResourceManagerLoop,
    service: NodeResourceInfoGcsServiceImpl,
    broadcaster: Arc<ResourceUsageBroadcaster>,
    broadcast_runner: PeriodicalRunner,
    debug_dump_runner: Option<PeriodicalRunner>,
}

impl GcsResourceServer {
    /// Recover state from `store_client` and start serving.
    ///
    /// Must be called within a tokio runtime.
    pub async fn start(
        ray_config: &RayConfig,
        store_client: Arc<dyn StoreClient>,
    ) -> anyhow::Result<Self> {
        let config = GcsResourceManagerConfig::from_ray_config(ray_config);
        tracing::info!(?config, "Starting GCS resource manager");

        // 1. Load persisted state
        let table_storage = GcsTableStorage::new(store_client);
        let init_data = GcsInitData::load(&table_storage)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load GCS init data: {e}"))?;

        // 2. Build and initialize the manager
        let pubsub_handler = Arc::new(InternalPubSubHandler::new());
        let mut manager = GcsResourceManager::new(&config, pubsub_handler.clone());
        manager.initialize(&init_data);

        // 3. Broadcaster shares only the usage buffer with the manager
        let broadcaster = Arc::new(ResourceUsageBroadcaster::new(
            manager.usage_buffer(),
            pubsub_handler.clone(),
            config.legacy_broadcast_enabled,
        ));

        // 4. Hand the manager to its control loop
        let event_loop = ResourceManagerLoop::spawn(manager);
        let service = NodeResourceInfoGcsServiceImpl::new(event_loop.handle());

        // 5. Periodic tasks
        let broadcast_runner = broadcaster.start(config.broadcast_period);
        let debug_dump_runner = config.debug_dump_period.map(|period| {
            let handle = event_loop.handle();
            PeriodicalRunner::start("GcsResourceManager.debug_dump", period, move || {
                let _ = handle.post(|mgr| tracing::info!("{}", mgr.debug_string()));
            })
        });

        tracing::info!(
            broadcast_period = ?config.broadcast_period,
            legacy_broadcast = config.legacy_broadcast_enabled,
            "GCS resource manager ready"
        );
        Ok(Self {
            config,
            pubsub_handler,
            event_loop,
            service,
            broadcaster,
            broadcast_runner,
            debug_dump_runner,
        })
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn config(&self) -> &GcsResourceManagerConfig {
        &self.config
    }

    pub fn service(&self) -> NodeResourceInfoGcsServiceImpl {
        self.service.clone()
    }

    /// Handle for other GCS components (node manager, schedulers) to run
    /// work against the resource manager.
    pub fn handle(&self) -> ResourceManagerHandle {
        self.event_loop.handle()
    }

    pub fn pubsub_handler(&self) -> &Arc<InternalPubSubHandler> {
        &self.pubsub_handler
    }

    pub fn broadcaster(&self) -> &Arc<ResourceUsageBroadcaster> {
        &self.broadcaster
    }

    /// Stop the periodic tasks and the control loop, returning the manager.
    ///
    /// Waits until every handle and service clone given out has been dropped.
    pub async fn shutdown(self) -> anyhow::Result<GcsResourceManager> {
        let Self {
            mut broadcast_runner,
            debug_dump_runner,
            service,
            event_loop,
            ..
        } = self;
        broadcast_runner.stop();
        drop(debug_dump_runner);
        drop(service);
        let manager = event_loop.shutdown().await?;
        tracing::info!("GCS resource manager stopped");
        Ok(manager)
    }
}
