// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};

use jmx_exporter_operator::config::Config;
use jmx_exporter_operator::dispatch::{EventDispatcher, Reconciler};
use jmx_exporter_operator::kubernetes::{wait_for_exporter_crd, KubeExec};
use jmx_exporter_operator::watchers::{ExporterWatcher, PodWatcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting JMX exporter operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: agent_source_dir={}, watch_namespace={}",
        config.agent_source_dir.display(),
        config.watch_namespace.as_deref().unwrap_or("<all>")
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Wait for the PrometheusJmxExporter CRD before watching
    info!("Waiting for PrometheusJmxExporter CRD to become available...");
    wait_for_exporter_crd(&client).await?;

    let exec = Arc::new(KubeExec::new(client.clone()));
    let reconciler = Reconciler::new(client.clone(), exec, &config);
    let (dispatcher, handle) = EventDispatcher::new(reconciler, config.queue_size);

    let exporter_watcher = ExporterWatcher::new(client.clone(), &config, handle.clone());
    let pod_watcher = PodWatcher::new(client, &config, handle);

    info!("Starting watchers...");

    // Run the dispatcher and both watchers concurrently
    tokio::try_join!(dispatcher.run(), exporter_watcher.run(), pod_watcher.run())?;

    // This should never be reached as watchers run forever
    warn!("All watchers stopped unexpectedly");
    Ok(())
}
