// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::PrometheusJmxExporter;
use kube::{discovery::Discovery, Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait for the PrometheusJmxExporter CRD to be served by the API server.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_exporter_crd(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;
    let api_version = PrometheusJmxExporter::api_version(&());

    loop {
        match check_exporter_crd_exists(client).await {
            Ok(true) => {
                info!("PrometheusJmxExporter CRD ({}) is available", api_version);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "PrometheusJmxExporter CRD ({}) not yet available, waiting {} seconds...",
                    api_version, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for PrometheusJmxExporter CRD: {}, retrying in {} seconds...",
                    e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Check if the PrometheusJmxExporter CRD exists by attempting to discover it.
async fn check_exporter_crd_exists(client: &Client) -> Result<bool> {
    let group = PrometheusJmxExporter::group(&());
    let discovery = Discovery::new(client.clone())
        .filter(&[group.as_ref()])
        .run()
        .await?;

    let found = discovery.groups().any(|g| {
        g.name() == group
            && g.recommended_resources().iter().any(|(ar, _)| {
                ar.kind == PrometheusJmxExporter::kind(&())
                    && ar.version == PrometheusJmxExporter::version(&())
            })
    });
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockService;

    fn group_list(groups: serde_json::Value) -> String {
        serde_json::json!({
            "kind": "APIGroupList",
            "apiVersion": "v1",
            "groups": groups
        })
        .to_string()
    }

    fn banzaicloud_group() -> serde_json::Value {
        let version = serde_json::json!({
            "groupVersion": "banzaicloud.com/v1alpha1",
            "version": "v1alpha1"
        });
        serde_json::json!([{
            "name": "banzaicloud.com",
            "versions": [version],
            "preferredVersion": version
        }])
    }

    fn resource_list(kind: &str, plural: &str) -> String {
        serde_json::json!({
            "kind": "APIResourceList",
            "apiVersion": "v1",
            "groupVersion": "banzaicloud.com/v1alpha1",
            "resources": [{
                "name": plural,
                "singularName": plural.trim_end_matches('s'),
                "namespaced": true,
                "kind": kind,
                "verbs": ["get", "list", "watch", "update"]
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_crd_served() {
        let client = MockService::new()
            .on_get("/apis", 200, &group_list(banzaicloud_group()))
            .on_get(
                "/apis/banzaicloud.com/v1alpha1",
                200,
                &resource_list("PrometheusJmxExporter", "prometheusjmxexporters"),
            )
            .into_client();

        assert!(check_exporter_crd_exists(&client).await.unwrap());
    }

    #[tokio::test]
    async fn test_crd_group_missing() {
        let client = MockService::new()
            .on_get("/apis", 200, &group_list(serde_json::json!([])))
            .into_client();

        assert!(!check_exporter_crd_exists(&client).await.unwrap());
    }

    #[tokio::test]
    async fn test_crd_group_without_exporter_kind() {
        let client = MockService::new()
            .on_get("/apis", 200, &group_list(banzaicloud_group()))
            .on_get(
                "/apis/banzaicloud.com/v1alpha1",
                200,
                &resource_list("KafkaCluster", "kafkaclusters"),
            )
            .into_client();

        assert!(!check_exporter_crd_exists(&client).await.unwrap());
    }
}
