// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Control loop owning the [`GcsResourceManager`].
//!
//! All store mutations run on one task, in the order they were submitted.
//! Other tasks hold a cheap [`ResourceManagerHandle`] and send closures over
//! an unbounded channel; results come back on a oneshot.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use ray_common::status::{RayError, RayResult};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::resource_manager::GcsResourceManager;

type Job = Box<dyn FnOnce(&mut GcsResourceManager) + Send>;

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic>")
}

/// Submits work to the control loop. Cloneable and cheap.
#[derive(Clone)]
pub struct ResourceManagerHandle {
    jobs: mpsc::UnboundedSender<Job>,
}

impl ResourceManagerHandle {
    /// Queue `f` without waiting for it to run.
    pub fn post<F>(&self, f: F) -> RayResult<()>
    where
        F: FnOnce(&mut GcsResourceManager) + Send + 'static,
    {
        self.jobs
            .send(Box::new(f))
            .map_err(|_| RayError::disconnected("resource manager loop has stopped"))
    }

    /// Run `f` on the control loop and wait for its result.
    pub async fn run<F, R>(&self, f: F) -> RayResult<R>
    where
        F: FnOnce(&mut GcsResourceManager) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.post(move |mgr| {
            let _ = tx.send(f(mgr));
        })?;
        rx.await
            .map_err(|_| RayError::disconnected("resource manager loop dropped the request"))
    }

    pub fn is_closed(&self) -> bool {
        self.jobs.is_closed()
    }
}

pub struct ResourceManagerLoop {
    handle: ResourceManagerHandle,
    task: JoinHandle<GcsResourceManager>,
}

impl ResourceManagerLoop {
    /// Move `manager` onto its own task. Must be called within a tokio runtime.
    pub fn spawn(manager: GcsResourceManager) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let task = tokio::spawn(async move {
            let mut manager = manager;
            while let Some(job) = rx.recv().await {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job(&mut manager))) {
                    tracing::error!(
                        panic = panic_message(payload.as_ref()),
                        "Resource manager job panicked, stopping loop"
                    );
                    panic::resume_unwind(payload);
                }
            }
            tracing::debug!("Resource manager loop exiting");
            manager
        });
        Self {
            handle: ResourceManagerHandle { jobs: tx },
            task,
        }
    }

    pub fn handle(&self) -> ResourceManagerHandle {
        self.handle.clone()
    }

    /// Stop accepting work once every outstanding handle is gone, drain what
    /// is queued, and hand the manager back.
    pub async fn shutdown(self) -> RayResult<GcsResourceManager> {
        drop(self.handle);
        self.task.await.map_err(|e| {
            tracing::error!(error = %e, "Resource manager loop did not exit cleanly");
            RayError::unknown(format!("resource manager loop failed: {e}"))
        })
    }
}
