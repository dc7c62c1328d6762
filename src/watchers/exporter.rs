// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Exporter watcher - forwards PrometheusJmxExporter changes to the dispatcher.

use crate::config::Config;
use crate::dispatch::{ClusterEvent, EventDispatcherHandle};
use crate::types::PrometheusJmxExporter;
use crate::watchers::{forward, scoped_api};
use kube::{Api, Client};
use tracing::info;

pub struct ExporterWatcher {
    client: Client,
    namespace: Option<String>,
    handle: EventDispatcherHandle,
}

impl ExporterWatcher {
    pub fn new(client: Client, config: &Config, handle: EventDispatcherHandle) -> Self {
        Self {
            client,
            namespace: config.watch_namespace.clone(),
            handle,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            "Watching prometheusjmxexporters in {}",
            self.namespace.as_deref().unwrap_or("all namespaces")
        );
        let exporters: Api<PrometheusJmxExporter> =
            scoped_api(self.client, self.namespace.as_deref());
        forward(exporters, "prometheusjmxexporters", self.handle, ClusterEvent::exporter).await
    }
}
