// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Label-selector matching between exporters and pods.
//!
//! Within a namespace at most one exporter may select any given pod.

use crate::error::{OperatorError, Result};
use crate::kubernetes::pods::pod_key;
use crate::types::PrometheusJmxExporter;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::error;

/// True when every selector requirement is present with the same value in
/// the pod's labels. An empty selector matches every pod.
pub fn selector_matches(selector: &BTreeMap<String, String>, pod: &Pod) -> bool {
    let labels = pod.labels();
    selector
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}

/// Render a selector as a label selector query string ("a=b,c=d")
pub fn selector_query(selector: &BTreeMap<String, String>) -> String {
    selector
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// The single exporter selecting `pod`, if any. More than one match is an
/// error and no owner is picked.
pub fn find_owner<'a>(
    exporters: &'a [PrometheusJmxExporter],
    pod: &Pod,
) -> Result<Option<&'a PrometheusJmxExporter>> {
    let matches: Vec<&PrometheusJmxExporter> = exporters
        .iter()
        .filter(|e| selector_matches(&e.spec.label_selector, pod))
        .collect();

    match matches.as_slice() {
        [] => Ok(None),
        [owner] => Ok(Some(*owner)),
        many => {
            let names: Vec<String> = many.iter().map(|e| e.name_any()).collect();
            let exporters = format!("({})", names.join(","));
            error!(
                "Multiple prometheusjmxexporters for pod '{}' found: {}",
                pod_key(pod),
                exporters
            );
            Err(OperatorError::MultipleOwners {
                pod: pod_key(pod),
                exporters,
            })
        }
    }
}

/// Fail if any exporter other than `exporter` also selects one of `pods`.
/// `others` is the full exporter list of the namespace; `exporter` itself
/// is skipped by name.
pub fn check_conflict(
    pods: &[Pod],
    exporter: &PrometheusJmxExporter,
    others: &[PrometheusJmxExporter],
) -> Result<()> {
    let name = exporter.name_any();

    for pod in pods {
        for other in others.iter().filter(|o| o.name_any() != name) {
            if selector_matches(&other.spec.label_selector, pod) {
                error!(
                    "prometheusjmxexporter '{}' for pod '{}' already defined",
                    other.name_any(),
                    pod_key(pod)
                );
                return Err(OperatorError::Conflict {
                    exporter: other.name_any(),
                    pod: pod_key(pod),
                });
            }
        }
    }

    Ok(())
}
