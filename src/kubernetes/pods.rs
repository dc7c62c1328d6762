// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod writes as "snapshot + delta".
//!
//! A delta is applied to an immutable snapshot producing the next object,
//! which replaces the stored pod in a single PUT. The snapshot's
//! resourceVersion travels with it, so a write racing another writer fails
//! with a conflict instead of silently overwriting.

use crate::constants::OPERATOR_NAME;
use crate::error::{OperatorError, Result};
use k8s_openapi::api::core::v1::{ContainerPort, Pod};
use kube::{api::PostParams, Api, Client, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, error, instrument};

/// Change to apply to a pod snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum PodDelta {
    /// Set (or overwrite) annotations
    Annotate(BTreeMap<String, String>),
    /// Declare an additional TCP port on the named container
    ExposePort {
        container: String,
        name: String,
        port: i32,
    },
}

impl PodDelta {
    pub fn annotate<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        PodDelta::Annotate(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The pod that results from applying this delta to `snapshot`
    pub fn apply(&self, snapshot: &Pod) -> Result<Pod> {
        let mut next = snapshot.clone();

        match self {
            PodDelta::Annotate(annotations) => {
                next.annotations_mut()
                    .extend(annotations.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            PodDelta::ExposePort {
                container,
                name,
                port,
            } => {
                let target = next
                    .spec
                    .as_mut()
                    .and_then(|spec| spec.containers.iter_mut().find(|c| &c.name == container))
                    .ok_or_else(|| OperatorError::MissingContainer(snapshot.name_any()))?;

                let ports = target.ports.get_or_insert_with(Vec::new);
                if ports.iter().any(|p| p.container_port == *port) {
                    return Err(OperatorError::DuplicatePort {
                        port: *port,
                        container: container.clone(),
                    });
                }

                ports.push(ContainerPort {
                    container_port: *port,
                    name: Some(name.clone()),
                    protocol: Some("TCP".to_string()),
                    ..Default::default()
                });
            }
        }

        Ok(next)
    }
}

/// Apply `delta` to `snapshot` and replace the stored pod with the result.
/// Returns the object as stored by the API server.
#[instrument(skip(client, snapshot), fields(pod = %snapshot.name_any()))]
pub async fn replace_pod(client: &Client, snapshot: &Pod, delta: &PodDelta) -> Result<Pod> {
    let name = snapshot.name_any();
    let namespace = snapshot
        .namespace()
        .ok_or_else(|| OperatorError::InvalidObject(format!("pod {} has no namespace", name)))?;

    let next = delta.apply(snapshot)?;
    debug!("Replacing pod {}/{}: {:?}", namespace, name, delta);

    let pods: Api<Pod> = Api::namespaced(client.clone(), &namespace);
    pods.replace(&name, &write_params(), &next)
        .await
        .map_err(|e| {
            error!("Updating pod '{}/{}' failed: {}", namespace, name, e);
            OperatorError::from(e)
        })
}

/// Parameters for writes made by the operator
pub(crate) fn write_params() -> PostParams {
    PostParams {
        field_manager: Some(OPERATOR_NAME.to_string()),
        ..Default::default()
    }
}

/// "namespace/name" of a pod, for logging
pub fn pod_key(pod: &Pod) -> String {
    format!("{}/{}", pod.namespace().unwrap_or_default(), pod.name_any())
}

pub fn is_running(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .is_some_and(|phase| phase == "Running")
}

/// Comma separated pod names in parentheses, for logging
pub fn format_pods(pods: &[Pod]) -> String {
    let names: Vec<String> = pods.iter().map(|p| p.name_any()).collect();
    format!("({})", names.join(","))
}
