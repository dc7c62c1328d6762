// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod watcher - forwards pod changes to the dispatcher.

use crate::config::Config;
use crate::dispatch::{ClusterEvent, EventDispatcherHandle};
use crate::watchers::{forward, scoped_api};
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client};
use tracing::info;

pub struct PodWatcher {
    client: Client,
    namespace: Option<String>,
    handle: EventDispatcherHandle,
}

impl PodWatcher {
    pub fn new(client: Client, config: &Config, handle: EventDispatcherHandle) -> Self {
        Self {
            client,
            namespace: config.watch_namespace.clone(),
            handle,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            "Watching pods in {}",
            self.namespace.as_deref().unwrap_or("all namespaces")
        );
        let pods: Api<Pod> = scoped_api(self.client, self.namespace.as_deref());
        forward(pods, "pods", self.handle, ClusterEvent::pod).await
    }
}
