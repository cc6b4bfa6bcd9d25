// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Handlers of the NodeResourceInfo RPCs.
//!
//! Every handler bumps its request counter and answers with a reply whose
//! `status` carries the outcome; errors never escape as `Err`.

use std::collections::HashMap;

use indexmap::IndexMap;
use prost::Message;
use ray_common::id::NodeID;
use ray_common::scheduling::ResourceSet;
use ray_common::status::{RayError, RayResult, StatusCode};
use ray_proto::ray::rpc;

use crate::pubsub_handler::ChannelType;
use crate::resource_manager::{parse_node_id, GcsResourceManager};

/// Request counters, one per RPC verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountType {
    GetResourcesRequest = 0,
    UpdateResourcesRequest = 1,
    DeleteResourcesRequest = 2,
    GetAllAvailableResourcesRequest = 3,
    ReportResourceUsageRequest = 4,
    GetAllResourceUsageRequest = 5,
}

impl CountType {
    pub const COUNT: usize = 6;

    pub const ALL: [CountType; Self::COUNT] = [
        CountType::GetResourcesRequest,
        CountType::UpdateResourcesRequest,
        CountType::DeleteResourcesRequest,
        CountType::GetAllAvailableResourcesRequest,
        CountType::ReportResourceUsageRequest,
        CountType::GetAllResourceUsageRequest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CountType::GetResourcesRequest => "GetResources",
            CountType::UpdateResourcesRequest => "UpdateResources",
            CountType::DeleteResourcesRequest => "DeleteResources",
            CountType::GetAllAvailableResourcesRequest => "GetAllAvailableResources",
            CountType::ReportResourceUsageRequest => "ReportResourceUsage",
            CountType::GetAllResourceUsageRequest => "GetAllResourceUsage",
        }
    }
}

pub fn ok_status() -> rpc::GcsStatus {
    rpc::GcsStatus {
        code: StatusCode::OK.code(),
        message: String::new(),
    }
}

pub fn error_status(err: &RayError) -> rpc::GcsStatus {
    rpc::GcsStatus {
        code: err.code.code(),
        message: err.message.clone(),
    }
}

fn to_status(result: RayResult<()>) -> rpc::GcsStatus {
    match result {
        Ok(()) => ok_status(),
        Err(err) => error_status(&err),
    }
}

impl GcsResourceManager {
    fn bump(&mut self, count_type: CountType) {
        self.counts[count_type as usize] += 1;
    }

    /// Total capacity of one node. An unknown node yields an empty map.
    pub fn handle_get_resources(&mut self, request: rpc::GetResourcesRequest) -> rpc::GetResourcesReply {
        self.bump(CountType::GetResourcesRequest);
        let node_id = match parse_node_id(&request.node_id) {
            Ok(node_id) => node_id,
            Err(err) => {
                return rpc::GetResourcesReply {
                    status: Some(error_status(&err)),
                    ..Default::default()
                }
            }
        };
        let resources = self
            .node_resources(&node_id)
            .map(|ledger| {
                ledger
                    .total()
                    .iter()
                    .map(|(name, amount)| {
                        (
                            name.to_string(),
                            rpc::ResourceTableData {
                                resource_capacity: amount.to_f64(),
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        rpc::GetResourcesReply {
            status: Some(ok_status()),
            resources,
        }
    }

    pub fn handle_update_resources(
        &mut self,
        request: rpc::UpdateResourcesRequest,
    ) -> rpc::UpdateResourcesReply {
        self.bump(CountType::UpdateResourcesRequest);
        let result = parse_node_id(&request.node_id).and_then(|node_id| {
            let changed: HashMap<String, f64> = request
                .resources
                .into_iter()
                .map(|(name, data)| (name, data.resource_capacity))
                .collect();
            self.update_resource_capacity(&node_id, &changed)?;
            tracing::debug!(?node_id, ?changed, "Updated node resources");
            self.publish_node_resource_change(
                &node_id,
                rpc::NodeResourceChange {
                    node_id: node_id.binary(),
                    updated_resources: changed,
                    ..Default::default()
                },
            );
            Ok(())
        });
        if let Err(err) = &result {
            tracing::error!(error = %err, "Failed to update resources");
        }
        rpc::UpdateResourcesReply {
            status: Some(to_status(result)),
        }
    }

    pub fn handle_delete_resources(
        &mut self,
        request: rpc::DeleteResourcesRequest,
    ) -> rpc::DeleteResourcesReply {
        self.bump(CountType::DeleteResourcesRequest);
        let result = parse_node_id(&request.node_id).and_then(|node_id| {
            self.delete_resources(&node_id, &request.resource_name_list)?;
            tracing::debug!(?node_id, deleted = ?request.resource_name_list, "Deleted node resources");
            self.publish_node_resource_change(
                &node_id,
                rpc::NodeResourceChange {
                    node_id: node_id.binary(),
                    deleted_resources: request.resource_name_list,
                    ..Default::default()
                },
            );
            Ok(())
        });
        if let Err(err) = &result {
            tracing::error!(error = %err, "Failed to delete resources");
        }
        rpc::DeleteResourcesReply {
            status: Some(to_status(result)),
        }
    }

    /// Available resources of every node, ordered by node id.
    pub fn handle_get_all_available_resources(
        &mut self,
        _request: rpc::GetAllAvailableResourcesRequest,
    ) -> rpc::GetAllAvailableResourcesReply {
        self.bump(CountType::GetAllAvailableResourcesRequest);
        let mut nodes: Vec<(&NodeID, _)> = self.cluster_resources_iter().collect();
        nodes.sort_by_key(|(node_id, _)| **node_id);
        let resources_list = nodes
            .into_iter()
            .map(|(node_id, ledger)| rpc::AvailableResources {
                node_id: node_id.binary(),
                resources_available: ledger.available().to_map(),
            })
            .collect();
        rpc::GetAllAvailableResourcesReply {
            status: Some(ok_status()),
            resources_list,
        }
    }

    pub fn handle_report_resource_usage(
        &mut self,
        request: rpc::ReportResourceUsageRequest,
    ) -> rpc::ReportResourceUsageReply {
        self.bump(CountType::ReportResourceUsageRequest);
        let result = match request.resources {
            Some(report) => self.update_from_resource_report(&report),
            None => Err(RayError::invalid_argument("resource usage report is missing")),
        };
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Rejected resource usage report");
        }
        rpc::ReportResourceUsageReply {
            status: Some(to_status(result)),
        }
    }

    /// Latest report of every node, with demands aggregated by shape and the
    /// current placement group load. The reply carries no usage data when no
    /// node has reported yet.
    pub fn handle_get_all_resource_usage(
        &mut self,
        _request: rpc::GetAllResourceUsageRequest,
    ) -> rpc::GetAllResourceUsageReply {
        self.bump(CountType::GetAllResourceUsageRequest);
        let usages = self.node_resource_usages();
        if usages.is_empty() {
            return rpc::GetAllResourceUsageReply {
                status: Some(ok_status()),
                resource_usage_data: None,
            };
        }

        let mut reports: Vec<(&NodeID, &rpc::ResourcesData)> = usages.iter().collect();
        reports.sort_by_key(|(node_id, _)| **node_id);

        let mut aggregate_load: IndexMap<ResourceSet, rpc::ResourceDemand> = IndexMap::new();
        for (_, report) in &reports {
            let Some(load) = &report.resource_load_by_shape else {
                continue;
            };
            for demand in &load.resource_demands {
                let aggregate = aggregate_load
                    .entry(ResourceSet::from_map(&demand.shape))
                    .or_insert_with(|| rpc::ResourceDemand {
                        shape: demand.shape.clone(),
                        ..Default::default()
                    });
                aggregate.num_ready_requests_queued += demand.num_ready_requests_queued;
                aggregate.num_infeasible_requests_queued += demand.num_infeasible_requests_queued;
                aggregate.backlog_size += demand.backlog_size;
            }
        }

        let batch = rpc::ResourceUsageBatchData {
            batch: reports.into_iter().map(|(_, report)| report.clone()).collect(),
            resource_load_by_shape: (!aggregate_load.is_empty()).then(|| rpc::ResourceLoad {
                resource_demands: aggregate_load.into_values().collect(),
            }),
            placement_group_load: self.placement_group_load().cloned(),
        };
        rpc::GetAllResourceUsageReply {
            status: Some(ok_status()),
            resource_usage_data: Some(batch),
        }
    }

    fn publish_node_resource_change(&self, node_id: &NodeID, change: rpc::NodeResourceChange) {
        self.publisher.publish(
            ChannelType::GcsNodeResourceChannel,
            node_id.data(),
            change.encode_to_vec(),
        );
    }
}
