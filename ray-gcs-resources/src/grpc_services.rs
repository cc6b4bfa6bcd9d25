// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! NodeResourceInfoGcsService adapter.
//!
//! Each method forwards the request to the control loop and awaits the
//! reply. Only a stopped loop surfaces as `Err`; every other outcome is a
//! status inside the reply.

use ray_common::status::RayResult;
use ray_proto::ray::rpc;

use crate::event_loop::ResourceManagerHandle;

#[derive(Clone)]
pub struct NodeResourceInfoGcsServiceImpl {
    handle: ResourceManagerHandle,
}

impl NodeResourceInfoGcsServiceImpl {
    pub fn new(handle: ResourceManagerHandle) -> Self {
        Self { handle }
    }

    pub async fn get_resources(
        &self,
        request: rpc::GetResourcesRequest,
    ) -> RayResult<rpc::GetResourcesReply> {
        self.handle
            .run(move |mgr| mgr.handle_get_resources(request))
            .await
    }

    pub async fn update_resources(
        &self,
        request: rpc::UpdateResourcesRequest,
    ) -> RayResult<rpc::UpdateResourcesReply> {
        self.handle
            .run(move |mgr| mgr.handle_update_resources(request))
            .await
    }

    pub async fn delete_resources(
        &self,
        request: rpc::DeleteResourcesRequest,
    ) -> RayResult<rpc::DeleteResourcesReply> {
        self.handle
            .run(move |mgr| mgr.handle_delete_resources(request))
            .await
    }

    pub async fn get_all_available_resources(
        &self,
        request: rpc::GetAllAvailableResourcesRequest,
    ) -> RayResult<rpc::GetAllAvailableResourcesReply> {
        self.handle
            .run(move |mgr| mgr.handle_get_all_available_resources(request))
            .await
    }

    pub async fn report_resource_usage(
        &self,
        request: rpc::ReportResourceUsageRequest,
    ) -> RayResult<rpc::ReportResourceUsageReply> {
        self.handle
            .run(move |mgr| mgr.handle_report_resource_usage(request))
            .await
    }

    pub async fn get_all_resource_usage(
        &self,
        request: rpc::GetAllResourceUsageRequest,
    ) -> RayResult<rpc::GetAllResourceUsageReply> {
        self.handle
            .run(move |mgr| mgr.handle_get_all_resource_usage(request))
            .await
    }
}
