// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "banzaicloud.com", version = "v1alpha1", kind = "PrometheusJmxExporter")]
#[kube(namespaced)]
#[kube(status = "PrometheusJmxExporterStatus")]
#[kube(shortname = "jmxexporter")]
#[serde(rename_all = "camelCase")]
pub struct PrometheusJmxExporterSpec {
    /// Exact-match labels selecting the pods to instrument
    pub label_selector: BTreeMap<String, String>,
    pub config: ConfigSource,
    /// Port the agent serves metrics on
    pub port: i32,
}

/// Key within a config map in the exporter's namespace
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSource {
    pub config_map_name: String,
    pub config_map_key: String,
}

impl PrometheusJmxExporter {
    /// "namespace/name", for logging
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace().unwrap_or_default(), self.name_any())
    }

    /// Current status, empty when the object has none yet
    pub fn current_status(&self) -> PrometheusJmxExporterStatus {
        self.status.clone().unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusJmxExporterStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics_endpoints: Vec<MetricsEndpoint>,
}

impl PrometheusJmxExporterStatus {
    pub fn new(metrics_endpoints: Vec<MetricsEndpoint>) -> Self {
        Self { metrics_endpoints }
    }

    fn sorted_endpoints(&self) -> Vec<&MetricsEndpoint> {
        let mut endpoints: Vec<_> = self.metrics_endpoints.iter().collect();
        endpoints.sort();
        endpoints
    }
}

/// Multiset equality on (pod, port); order is irrelevant.
impl PartialEq for PrometheusJmxExporterStatus {
    fn eq(&self, other: &Self) -> bool {
        self.metrics_endpoints.len() == other.metrics_endpoints.len()
            && self.sorted_endpoints() == other.sorted_endpoints()
    }
}

impl Eq for PrometheusJmxExporterStatus {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, schemars::JsonSchema)]
pub struct MetricsEndpoint {
    pub pod: String,
    pub port: i32,
}

impl MetricsEndpoint {
    pub fn new(pod: impl Into<String>, port: i32) -> Self {
        Self {
            pod: pod.into(),
            port,
        }
    }
}
