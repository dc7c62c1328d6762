// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Observed status of exporters: the metrics endpoints pods expose.

use crate::constants::annotations;
use crate::error::{OperatorError, Result};
use crate::kubernetes::pods::write_params;
use crate::types::{MetricsEndpoint, PrometheusJmxExporter, PrometheusJmxExporterStatus};
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info, instrument};

/// The endpoint a pod advertises through its scrape annotations, if any
pub fn endpoint_for_pod(pod: &Pod) -> Option<MetricsEndpoint> {
    let pod_annotations = pod.annotations();
    if pod_annotations.get(annotations::SCRAPE).map(String::as_str) != Some("true") {
        return None;
    }

    let value = pod_annotations.get(annotations::SCRAPE_PORT)?;
    // An unparsable port is recorded as 0
    let port = value.parse::<i32>().unwrap_or_else(|e| {
        debug!(
            "Pod '{}' has invalid {} annotation '{}': {}",
            pod.name_any(),
            annotations::SCRAPE_PORT,
            value,
            e
        );
        0
    });
    Some(MetricsEndpoint::new(pod.name_any(), port))
}

/// Status listing the endpoints of `pods`
pub fn status_from_pods(pods: &[Pod]) -> PrometheusJmxExporterStatus {
    PrometheusJmxExporterStatus::new(pods.iter().filter_map(endpoint_for_pod).collect())
}

/// Record the endpoint `pod` advertises. Returns true when `status` changed.
pub fn upsert_endpoint(status: &mut PrometheusJmxExporterStatus, pod: &Pod) -> bool {
    let Some(endpoint) = endpoint_for_pod(pod) else {
        return false;
    };

    match status
        .metrics_endpoints
        .iter_mut()
        .find(|e| e.pod == endpoint.pod)
    {
        Some(existing) if existing.port == endpoint.port => false,
        Some(existing) => {
            existing.port = endpoint.port;
            true
        }
        None => {
            status.metrics_endpoints.push(endpoint);
            true
        }
    }
}

/// Drop the endpoint recorded for `pod_name`. Returns true when `status` changed.
pub fn remove_endpoint(status: &mut PrometheusJmxExporterStatus, pod_name: &str) -> bool {
    let before = status.metrics_endpoints.len();
    status.metrics_endpoints.retain(|e| e.pod != pod_name);
    status.metrics_endpoints.len() != before
}

/// Write `status` to the exporter's status subresource unless it equals the
/// current one. Returns true when a write happened.
#[instrument(skip(client, exporter, status), fields(exporter = %exporter.key()))]
pub async fn apply_status(
    client: &Client,
    exporter: &PrometheusJmxExporter,
    status: PrometheusJmxExporterStatus,
) -> Result<bool> {
    if exporter.current_status() == status {
        debug!("Status unchanged, skipping update");
        return Ok(false);
    }

    let namespace = exporter.namespace().ok_or_else(|| {
        OperatorError::InvalidObject(format!("exporter {} has no namespace", exporter.name_any()))
    })?;

    let mut updated = exporter.clone();
    updated.status = Some(status);

    info!("PrometheusJmxExporter '{}': Update status", exporter.key());

    let exporters: Api<PrometheusJmxExporter> = Api::namespaced(client.clone(), &namespace);
    exporters
        .replace_status(
            &exporter.name_any(),
            &write_params(),
            serde_json::to_vec(&updated)?,
        )
        .await?;

    Ok(true)
}
