// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and pod exec.

use crate::constants::agent;
use crate::error::{OperatorError, Result};
use crate::kubernetes::{ContainerRef, ExecInput, PodExec};
use crate::types::{
    ConfigSource, PrometheusJmxExporter, PrometheusJmxExporterSpec, PrometheusJmxExporterStatus,
};
use async_trait::async_trait;
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::{ConfigMap, Container, ContainerPort, Pod, PodSpec, PodStatus};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::AsyncReadExt;
use tower::Service;

/// A request seen by [`MockService`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: serde_json::Value,
}

/// A mock HTTP service that returns predefined responses based on request paths.
/// PUT requests without a predefined response are echoed back and stored, so a
/// later GET of the same path returns the written object like the API server
/// would. Every request is recorded.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Serve `pod` for GET requests of its path
    pub fn with_stored_pod(self, pod: &Pod) -> Self {
        let path = format!(
            "/api/v1/namespaces/{}/pods/{}",
            pod.metadata.namespace.as_deref().unwrap_or("default"),
            pod.metadata.name.as_deref().unwrap_or_default()
        );
        let body = serde_json::to_string(pod).unwrap();
        self.on_get(&path, 200, &body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Bodies of requests with the given method and exact path
    pub fn requests_with(&self, method: &str, path: &str) -> Vec<serde_json::Value> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .map(|r| r.body)
            .collect()
    }

    /// Recorded write requests (anything but GET)
    pub fn writes(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != "GET")
            .collect()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        responses
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();
        let responses = self.responses.clone();

        Box::pin(async move {
            let bytes = req
                .into_body()
                .collect()
                .await
                .map_err(|e| tower::BoxError::from(e.to_string()))?
                .to_bytes();
            let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
            requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path: path.clone(),
                body,
            });

            let (status, body) = match response {
                Some((status, body)) => (status, body.into_bytes()),
                None if method == "PUT" => {
                    let stored = String::from_utf8_lossy(&bytes).into_owned();
                    responses
                        .lock()
                        .unwrap()
                        .insert(("GET".to_string(), path.clone()), (200, stored));
                    (200, bytes.to_vec())
                }
                // Default 404 for unmatched requests
                None => (404, status_json(404, "NotFound", "not found").into_bytes()),
            };

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap())
        })
    }
}

/// A Kubernetes Status failure body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// A list response body for the given objects
pub fn list_json<K: Serialize>(kind: &str, api_version: &str, items: &[K]) -> String {
    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": { "resourceVersion": "1" },
        "items": items,
    })
    .to_string()
}

pub fn config_map_json(name: &str, key: &str, value: &str) -> String {
    let config_map = ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(key.to_string(), value.to_string())])),
        ..Default::default()
    };
    serde_json::to_string(&config_map).unwrap()
}

fn string_map(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    if pairs.is_empty() {
        return None;
    }
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

/// A pod in namespace "default" with a single container named "main"
pub fn make_pod(name: &str, labels: &[(&str, &str)], annotations: &[(&str, &str)], phase: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            resource_version: Some("1".to_string()),
            labels: string_map(labels),
            annotations: string_map(annotations),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "main".to_string(),
                image: Some("openjdk:8-jre".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }),
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
    }
}

/// Declare `ports` on the pod's first container
pub fn with_ports(mut pod: Pod, ports: &[i32]) -> Pod {
    if let Some(spec) = pod.spec.as_mut() {
        spec.containers[0].ports = Some(
            ports
                .iter()
                .map(|p| ContainerPort {
                    container_port: *p,
                    ..Default::default()
                })
                .collect(),
        );
    }
    pod
}

/// An exporter in namespace "default" reading config map "jmx", key "config.yaml"
pub fn make_exporter(
    name: &str,
    selector: &[(&str, &str)],
    port: i32,
    status: Option<PrometheusJmxExporterStatus>,
) -> PrometheusJmxExporter {
    PrometheusJmxExporter {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            resource_version: Some("1".to_string()),
            ..Default::default()
        },
        spec: PrometheusJmxExporterSpec {
            label_selector: string_map(selector).unwrap_or_default(),
            config: ConfigSource {
                config_map_name: "jmx".to_string(),
                config_map_key: "config.yaml".to_string(),
            },
            port,
        },
        status,
    }
}

/// A local agent directory holding both jars
pub fn agent_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(agent::LOADER_JAR), b"loader").unwrap();
    std::fs::write(dir.path().join(agent::AGENT_JAR), b"agent").unwrap();
    dir
}

/// A command run through [`FakeExec`]
#[derive(Debug, Clone)]
pub struct ExecCall {
    pub target: ContainerRef,
    pub command: Vec<String>,
    pub stdin: Option<Vec<u8>>,
}

/// Exec transport that records calls and answers from canned rules.
/// Rules match when the space-joined command contains the needle; the first
/// matching rule wins and unmatched commands succeed with empty output.
#[derive(Default)]
pub struct FakeExec {
    rules: Vec<(String, std::result::Result<String, String>)>,
    calls: Mutex<Vec<ExecCall>>,
}

impl FakeExec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_command(mut self, needle: &str, stdout: &str) -> Self {
        self.rules.push((needle.to_string(), Ok(stdout.to_string())));
        self
    }

    pub fn failing_on(mut self, needle: &str, stderr: &str) -> Self {
        self.rules.push((needle.to_string(), Err(stderr.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PodExec for FakeExec {
    async fn exec(
        &self,
        target: &ContainerRef,
        stdin: Option<ExecInput>,
        command: Vec<String>,
    ) -> Result<String> {
        let stdin = match stdin {
            Some(mut input) => {
                let mut buf = Vec::new();
                input.read_to_end(&mut buf).await?;
                Some(buf)
            }
            None => None,
        };

        let joined = command.join(" ");
        self.calls.lock().unwrap().push(ExecCall {
            target: target.clone(),
            command,
            stdin,
        });

        match self.rules.iter().find(|(needle, _)| joined.contains(needle.as_str())) {
            Some((_, Ok(stdout))) => Ok(stdout.clone()),
            Some((_, Err(stderr))) => Err(OperatorError::CommandFailed {
                command: joined,
                detail: format!("stderr: {}", stderr),
            }),
            None => Ok(String::new()),
        }
    }
}
