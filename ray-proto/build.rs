// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

use anyhow::{Context, Result};

const PROTO_FILES: &[&str] = &["protos/gcs_resources.proto"];
const REGENERATE_ENV: &str = "RAY_PROTO_REGENERATE";

fn main() -> Result<()> {
    println!("cargo:rerun-if-env-changed={REGENERATE_ENV}");
    for proto in PROTO_FILES {
        println!("cargo:rerun-if-changed={proto}");
    }

    // The generated module is checked in; only rewrite it on request.
    if std::env::var_os(REGENERATE_ENV).is_none() {
        return Ok(());
    }
    prost_build::Config::new()
        .out_dir("src")
        .compile_protos(PROTO_FILES, &["protos"])
        .context("error compiling protos")?;
    Ok(())
}
