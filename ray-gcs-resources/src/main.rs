// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Standalone GCS resource manager entry point.

use std::sync::Arc;

use clap::Parser;
use ray_common::config::{initialize_config, ray_config};
use ray_gcs_resources::store_client::InMemoryStoreClient;
use ray_gcs_resources::GcsResourceServer;

#[derive(Parser, Debug)]
#[command(name = "gcs_resource_server", about = "Ray GCS resource manager")]
struct Args {
    /// Log directory; logs go to stderr when unset
    #[arg(long)]
    log_dir: Option<String>,

    /// Base64-encoded Ray config
    #[arg(long)]
    config_list: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    ray_util::logging::init_ray_logging(
        "gcs_resource_server",
        args.log_dir.as_ref().map(std::path::Path::new),
        i32::from(args.verbose),
    )?;
    initialize_config(args.config_list.as_deref())?;

    let server =
        GcsResourceServer::start(ray_config(), Arc::new(InMemoryStoreClient::new())).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal");
    server.shutdown().await?;
    Ok(())
}
