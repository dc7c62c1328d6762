// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Handles a single cluster event.
//!
//! Exporter events instrument every running pod the exporter selects and
//! rewrite its status from the result. Pod events instrument the one pod
//! against its owning exporter, or drop its endpoint when it is deleted.
//! Exporter deletion leaves instrumented pods as they are.

use crate::config::Config;
use crate::dispatch::event::ClusterEvent;
use crate::error::{OperatorError, Result};
use crate::injection::{is_processed, Injector};
use crate::kubernetes::pods::{format_pods, is_running, pod_key};
use crate::kubernetes::{
    fetch_exporter_config, get_pod, list_exporters, running_pods_matching, PodExec,
};
use crate::matching::{check_conflict, find_owner, selector_query};
use crate::status::{apply_status, remove_endpoint, status_from_pods, upsert_endpoint};
use crate::types::PrometheusJmxExporter;
use k8s_openapi::api::core::v1::Pod;
use kube::{Client, ResourceExt};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

pub struct Reconciler {
    client: Client,
    injector: Injector,
}

impl Reconciler {
    pub fn new(client: Client, exec: Arc<dyn PodExec>, config: &Config) -> Self {
        let injector = Injector::new(client.clone(), exec, config.agent_source_dir.clone());
        Self { client, injector }
    }

    #[instrument(skip(self, event), fields(event = %event))]
    pub async fn dispatch(&self, event: ClusterEvent) -> Result<()> {
        match event {
            ClusterEvent::Exporter { exporter, deleted } => {
                info!("PrometheusJmxExporter event received for '{}'", exporter.key());
                if deleted {
                    info!(
                        "PrometheusJmxExporter deleted event received for '{}'",
                        exporter.key()
                    );
                    return Ok(());
                }
                self.reconcile_exporter(&exporter).await
            }
            ClusterEvent::Pod { pod, deleted } => self.reconcile_pod(&pod, deleted).await,
        }
    }

    async fn reconcile_exporter(&self, exporter: &PrometheusJmxExporter) -> Result<()> {
        let namespace = namespace_of(exporter)?;

        let config = fetch_exporter_config(&self.client, &namespace, &exporter.spec.config)
            .await
            .inspect_err(|e| error!("Error during retrieving prometheus jmx exporter config: {}", e))?;
        debug!("{:?}", config);

        info!(
            "Retrieving pods with label: '{}'",
            selector_query(&exporter.spec.label_selector)
        );
        let pods = running_pods_matching(&self.client, &namespace, &exporter.spec.label_selector).await?;
        info!("Pods found: namespace='{}', {}", namespace, format_pods(&pods));

        if pods.is_empty() {
            return Ok(());
        }

        let exporters = list_exporters(&self.client, &namespace).await?;
        check_conflict(&pods, exporter, &exporters)?;

        let mut current = Vec::with_capacity(pods.len());
        for pod in pods {
            if is_processed(&pod) {
                info!("Ignoring pod '{}' as it has already been processed.", pod_key(&pod));
                current.push(pod);
                continue;
            }

            // Per-pod failures are already logged and recorded on the pod
            let report = self.injector.instrument(pod, &config, exporter.spec.port).await;
            current.push(report.pod);
        }

        apply_status(&self.client, exporter, status_from_pods(&current)).await?;
        Ok(())
    }

    async fn reconcile_pod(&self, pod: &Pod, deleted: bool) -> Result<()> {
        if !deleted && !is_running(pod) {
            debug!("Skipping pod '{}', not running", pod_key(pod));
            return Ok(());
        }

        let namespace = namespace_of(pod)?;
        let exporters = list_exporters(&self.client, &namespace).await?;
        let Some(owner) = find_owner(&exporters, pod)? else {
            debug!("No prometheusjmxexporter selects pod '{}'", pod_key(pod));
            return Ok(());
        };

        if deleted {
            info!("Pod deleted event received for '{}'", pod_key(pod));
            let mut status = owner.current_status();
            if remove_endpoint(&mut status, &pod.name_any()) {
                apply_status(&self.client, owner, status).await?;
            }
            return Ok(());
        }

        if is_processed(pod) {
            info!("Ignoring pod '{}' as it has already been processed.", pod_key(pod));
            return Ok(());
        }

        // The event may predate writes of an earlier run; decide on the stored pod
        let Some(pod) = get_pod(&self.client, &namespace, &pod.name_any()).await? else {
            debug!("Pod '{}' no longer exists", pod_key(pod));
            return Ok(());
        };
        if is_processed(&pod) {
            info!("Ignoring pod '{}' as it has already been processed.", pod_key(&pod));
            return Ok(());
        }
        if !is_running(&pod) {
            debug!("Skipping pod '{}', not running", pod_key(&pod));
            return Ok(());
        }

        let config = fetch_exporter_config(&self.client, &namespace, &owner.spec.config)
            .await
            .inspect_err(|e| error!("Error during retrieving prometheus jmx exporter config: {}", e))?;
        debug!("{:?}", config);

        let report = self.injector.instrument(pod, &config, owner.spec.port).await;

        let mut status = owner.current_status();
        if upsert_endpoint(&mut status, &report.pod) {
            apply_status(&self.client, owner, status).await?;
        }

        report.into_result().map(|_| ())
    }
}

fn namespace_of<K: ResourceExt>(object: &K) -> Result<String> {
    object.namespace().ok_or_else(|| {
        OperatorError::InvalidObject(format!("{} has no namespace", object.name_any()))
    })
}
