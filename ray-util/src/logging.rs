// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Logging setup using the `tracing` ecosystem.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Environment variable consulted first for the log filter.
pub const LOG_LEVEL_ENV: &str = "RAY_BACKEND_LOG_LEVEL";

/// Build the filter used by [`init_ray_logging`].
///
/// `RAY_BACKEND_LOG_LEVEL` wins over `RUST_LOG`; without either, `verbosity`
/// picks `info` (0), `debug` (1) or `trace` (2+).
pub fn log_filter(verbosity: i32) -> EnvFilter {
    EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| {
            let level = match verbosity {
                i32::MIN..=0 => "info",
                1 => "debug",
                _ => "trace",
            };
            EnvFilter::new(level)
        })
}

/// Initialize the process-wide tracing subscriber.
///
/// Logs go to `<log_dir>/<component>.log` when a directory is given and to
/// stderr otherwise. Calling this twice is a no-op for the second call.
pub fn init_ray_logging(
    component: &str,
    log_dir: Option<&Path>,
    verbosity: i32,
) -> std::io::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbosity))
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let installed = match log_dir {
        Some(dir) => {
            let log_file = dir.join(format!("{component}.log"));
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)?;
            subscriber
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
                .is_ok()
        }
        None => subscriber.try_init().is_ok(),
    };

    if installed {
        tracing::info!(component, "Ray logging initialized");
    }
    Ok(())
}

/// Initialize tracing for tests; output is captured by the test harness.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}
