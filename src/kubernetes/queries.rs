// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed reads of exporters, pods and exporter configuration

use crate::error::{OperatorError, Result};
use crate::kubernetes::pods::is_running;
use crate::matching::{selector_matches, selector_query};
use crate::types::{ConfigSource, JmxExporterConfig, PrometheusJmxExporter};
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::{api::ListParams, Api, Client};
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument};

/// All exporters in `namespace`
#[instrument(skip(client))]
pub async fn list_exporters(client: &Client, namespace: &str) -> Result<Vec<PrometheusJmxExporter>> {
    let exporters: Api<PrometheusJmxExporter> = Api::namespaced(client.clone(), namespace);
    let list = exporters.list(&ListParams::default()).await.map_err(|e| {
        error!("Failed to query prometheusjmxexporters in '{}': {}", namespace, e);
        OperatorError::from(e)
    })?;
    Ok(list.items)
}

/// Running pods in `namespace` whose labels match `selector`
#[instrument(skip(client))]
pub async fn running_pods_matching(
    client: &Client,
    namespace: &str,
    selector: &BTreeMap<String, String>,
) -> Result<Vec<Pod>> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let params = ListParams::default().labels(&selector_query(selector));
    let list = pods.list(&params).await.map_err(|e| {
        error!("Failed to query pods in '{}': {}", namespace, e);
        OperatorError::from(e)
    })?;

    Ok(list
        .items
        .into_iter()
        .filter(|p| is_running(p) && selector_matches(selector, p))
        .collect())
}

/// The stored pod `name` in `namespace`, `None` once it is gone
#[instrument(skip(client))]
pub async fn get_pod(client: &Client, namespace: &str, name: &str) -> Result<Option<Pod>> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    Ok(pods.get_opt(name).await?)
}

/// Fetch and parse the exporter configuration stored in a config map key
#[instrument(skip(client))]
pub async fn fetch_exporter_config(
    client: &Client,
    namespace: &str,
    source: &ConfigSource,
) -> Result<JmxExporterConfig> {
    info!(
        "Retrieving prometheus jmx exporter config from configMap '{}/{}:{}'",
        namespace, source.config_map_name, source.config_map_key
    );

    let config_maps: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    let config_map = config_maps
        .get_opt(&source.config_map_name)
        .await?
        .ok_or_else(|| {
            OperatorError::ConfigSource(format!(
                "configMap '{}/{}' not found",
                namespace, source.config_map_name
            ))
        })?;

    let text = config_map
        .data
        .as_ref()
        .and_then(|d| d.get(&source.config_map_key))
        .ok_or_else(|| {
            OperatorError::ConfigSource(format!(
                "configMap data with key '{}' not found in configMap '{}/{}'",
                source.config_map_key, namespace, source.config_map_name
            ))
        })?;

    debug!("Validating config data '{}'", text);
    JmxExporterConfig::parse(text)
}
