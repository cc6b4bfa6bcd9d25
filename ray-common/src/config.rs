// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! GCS configuration.
//!
//! Values come from, in increasing priority:
//! - the compiled-in defaults,
//! - a (base64-encoded) JSON config string handed over by the launcher,
//! - environment variables of the form `RAY_<field_name>`.

use std::sync::OnceLock;

use crate::status::{RayError, RayResult};

static RAY_CONFIG: OnceLock<RayConfig> = OnceLock::new();

/// Get the global RayConfig, falling back to defaults if nobody called
/// [`initialize_config`].
pub fn ray_config() -> &'static RayConfig {
    RAY_CONFIG.get_or_init(RayConfig::default)
}

/// Initialize the global RayConfig from a base64-encoded JSON string.
/// Returns an error if already initialized.
pub fn initialize_config(config_str: Option<&str>) -> RayResult<()> {
    let config = match config_str {
        Some(s) if !s.is_empty() => RayConfig::from_base64_json(s)?,
        _ => RayConfig::default(),
    };
    RAY_CONFIG
        .set(config)
        .map_err(|_| RayError::invalid("RayConfig already initialized"))
}

/// Configuration parameters consumed by the GCS resource manager.
#[derive(Debug, Clone, PartialEq)]
pub struct RayConfig {
    // ─── Debug ────────────────────────────────────────────────
    /// Period of the `DebugString` dump in the GCS log. 0 disables it.
    pub debug_dump_period_milliseconds: u64,

    // ─── Resource broadcast ───────────────────────────────────
    /// Raylet report period; the GCS broadcasts resource usage at the same
    /// cadence.
    pub raylet_report_resources_period_milliseconds: u64,
    /// Maximum number of per-node entries in one broadcast batch.
    pub resource_broadcast_batch_size: u64,
    /// When true, resource usage travels over the gRPC syncer and the legacy
    /// pub/sub broadcast only drains its buffer.
    pub grpc_based_resource_broadcast: bool,
}

impl Default for RayConfig {
    fn default() -> Self {
        Self {
            debug_dump_period_milliseconds: 10_000,
            raylet_report_resources_period_milliseconds: 100,
            resource_broadcast_batch_size: 512,
            grpc_based_resource_broadcast: true,
        }
    }
}

impl RayConfig {
    /// Parse from base64-encoded JSON (as sent by the launcher).
    pub fn from_base64_json(b64: &str) -> RayResult<Self> {
        let decoded = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, b64)
            .map_err(|e| RayError::invalid_argument(format!("base64 decode error: {e}")))?;
        let json_str = String::from_utf8(decoded)
            .map_err(|e| RayError::invalid_argument(format!("UTF-8 decode error: {e}")))?;
        Self::from_json(&json_str)
    }

    /// Parse from a JSON object. Unknown keys are ignored; values of the
    /// wrong type leave the default in place.
    pub fn from_json(json: &str) -> RayResult<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| RayError::invalid_argument(format!("JSON parse error: {e}")))?;

        let mut config = Self::default();

        macro_rules! set_field {
            ($field:ident, bool) => {
                if let Some(v) = map.get(stringify!($field)).and_then(|v| v.as_bool()) {
                    config.$field = v;
                }
            };
            ($field:ident, u64) => {
                if let Some(v) = map.get(stringify!($field)).and_then(|v| v.as_u64()) {
                    config.$field = v;
                }
            };
            ($field:ident, i32) => {
                if let Some(v) = map.get(stringify!($field)).and_then(|v| v.as_i64()) {
                    config.$field = v as i32;
                }
            };
        }

        set_field!(debug_dump_period_milliseconds, u64);
        set_field!(raylet_report_resources_period_milliseconds, u64);
        set_field!(resource_broadcast_batch_size, u64);
        set_field!(grpc_based_resource_broadcast, bool);

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides of the form `RAY_<name>`.
    pub fn apply_env_overrides(&mut self) {
        macro_rules! env_override {
            ($field:ident, $ty:ty) => {
                let env_key = concat!("RAY_", stringify!($field));
                if let Ok(val) = std::env::var(env_key) {
                    match val.parse::<$ty>() {
                        Ok(v) => self.$field = v,
                        Err(_) => tracing::warn!(env_key, %val, "Ignoring malformed config override"),
                    }
                }
            };
        }

        env_override!(debug_dump_period_milliseconds, u64);
        env_override!(raylet_report_resources_period_milliseconds, u64);
        env_override!(resource_broadcast_batch_size, u64);
        env_override!(grpc_based_resource_broadcast, bool);
    }
}
