// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Loads the JMX exporter agent into the java process of a running pod.
//!
//! Steps run strictly in order and the first failure stops the run:
//! find the java process, upload the jars, upload the rendered config,
//! declare the metrics port, attach the agent, annotate for scraping.
//! The pod is then marked `verified`, or `verified-failed` if any step
//! failed. Steps that already ran are not undone.

use crate::constants::{agent, annotations};
use crate::error::{OperatorError, Result};
use crate::injection::marker::InjectionState;
use crate::kubernetes::exec::command;
use crate::kubernetes::pods::pod_key;
use crate::kubernetes::{replace_pod, upload_dir, ContainerRef, PodDelta, PodExec};
use crate::types::JmxExporterConfig;
use k8s_openapi::api::core::v1::Pod;
use kube::{Client, ResourceExt};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Result of one pipeline run
#[derive(Debug)]
pub struct InjectionReport {
    /// Latest stored snapshot of the pod
    pub pod: Pod,
    pub error: Option<OperatorError>,
}

impl InjectionReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Pod> {
        match self.error {
            None => Ok(self.pod),
            Some(e) => Err(e),
        }
    }
}

pub struct Injector {
    client: Client,
    exec: Arc<dyn PodExec>,
    agent_source_dir: PathBuf,
}

impl Injector {
    pub fn new(client: Client, exec: Arc<dyn PodExec>, agent_source_dir: PathBuf) -> Self {
        Self {
            client,
            exec,
            agent_source_dir,
        }
    }

    /// Instrument `pod` and mark it with the outcome.
    #[instrument(skip(self, pod, config), fields(pod = %pod_key(&pod)))]
    pub async fn instrument(&self, pod: Pod, config: &JmxExporterConfig, port: i32) -> InjectionReport {
        info!("Inspecting pod '{}'", pod_key(&pod));

        let mut current = pod;
        let outcome = self.run_steps(&mut current, config, port).await;

        let state = match &outcome {
            Ok(()) => InjectionState::Verified,
            Err(e) => {
                warn!("Instrumenting pod '{}' failed: {}", pod_key(&current), e);
                InjectionState::VerifiedFailed
            }
        };

        info!("Mark pod '{}' as {:?}", pod_key(&current), state);
        let marked = match state.marker() {
            Some(delta) => replace_pod(&self.client, &current, &delta).await,
            None => Ok(current.clone()),
        };

        match (marked, outcome) {
            (Ok(pod), Ok(())) => InjectionReport { pod, error: None },
            (Ok(pod), Err(e)) => InjectionReport { pod, error: Some(e) },
            (Err(mark_err), Ok(())) => InjectionReport {
                pod: current,
                error: Some(mark_err),
            },
            (Err(mark_err), Err(e)) => {
                error!("Marking pod '{}' failed: {}", pod_key(&current), mark_err);
                InjectionReport {
                    pod: current,
                    error: Some(e),
                }
            }
        }
    }

    /// Steps up to and including the scrape annotation. `current` always
    /// holds the latest stored snapshot so later writes do not conflict
    /// with earlier ones.
    async fn run_steps(&self, current: &mut Pod, config: &JmxExporterConfig, port: i32) -> Result<()> {
        let target = target_container(current)?;

        let pid = self.discover_java_process(&target).await?;
        self.upload_artifacts(&target).await?;
        self.upload_config(&target, config).await?;

        // TODO: pick a free port instead of failing when the requested one is taken
        info!("Exposing port number {} on '{}'", port, target);
        *current = replace_pod(
            &self.client,
            current,
            &PodDelta::ExposePort {
                container: target.container.clone(),
                name: agent::PORT_NAME.to_string(),
                port,
            },
        )
        .await?;

        self.attach_agent(&target, &pid, port).await?;

        *current = replace_pod(
            &self.client,
            current,
            &PodDelta::annotate([
                (annotations::SCRAPE, "true".to_string()),
                (annotations::SCRAPE_PORT, port.to_string()),
            ]),
        )
        .await?;

        Ok(())
    }

    async fn discover_java_process(&self, target: &ContainerRef) -> Result<String> {
        info!("Inspecting container '{}' for java processes", target);

        let stdout = self
            .exec
            .exec(target, None, command(&["sh", "-c", "$JAVA_HOME/bin/jps"]))
            .await
            .inspect_err(|e| warn!("Failed to retrieve java process list: {}", e))?;

        let mut pids = parse_jps_output(&stdout);
        info!("Java processes: {:?}", pids);

        match pids.len() {
            0 => Err(OperatorError::NoJavaProcess(target.to_string())),
            1 => Ok(pids.remove(0)),
            _ => Err(OperatorError::AmbiguousTarget {
                target: target.to_string(),
                pids,
            }),
        }
    }

    async fn upload_artifacts(&self, target: &ContainerRef) -> Result<()> {
        for jar in [agent::LOADER_JAR, agent::AGENT_JAR] {
            let path = self.agent_source_dir.join(jar);
            if !path.is_file() {
                return Err(OperatorError::MissingArtifact(path.display().to_string()));
            }
        }

        upload_dir(
            self.exec.as_ref(),
            target,
            &self.agent_source_dir,
            agent::TARGET_DIR,
        )
        .await
        .inspect_err(|e| error!("Copying jmx-exporter-loader jars to '{}' failed: {}", target, e))
    }

    async fn upload_config(&self, target: &ContainerRef, config: &JmxExporterConfig) -> Result<()> {
        let staging = tempfile::Builder::new()
            .prefix("prometheus-jmx-exporter-conf")
            .tempdir()?;
        write_config_file(staging.path(), config)?;

        let remote_dir = format!("{}/{}", agent::TARGET_DIR, agent::CONF_SUBDIR);
        upload_dir(self.exec.as_ref(), target, staging.path(), &remote_dir)
            .await
            .inspect_err(|e| error!("Copying config for jmx-exporter to '{}' failed: {}", target, e))
    }

    async fn attach_agent(&self, target: &ContainerRef, pid: &str, port: i32) -> Result<()> {
        info!(
            "Loading prometheus jmx exporter agent into process with pid {} running inside '{}'",
            pid, target
        );

        let java = attach_command(pid, port);
        self.exec
            .exec(target, None, command(&["sh", "-c", java.as_str()]))
            .await
            .map(|_| ())
    }
}

/// First container of the pod; the only one instrumented.
fn target_container(pod: &Pod) -> Result<ContainerRef> {
    let namespace = pod
        .namespace()
        .ok_or_else(|| OperatorError::InvalidObject(format!("pod {} has no namespace", pod.name_any())))?;

    let container = pod
        .spec
        .as_ref()
        .and_then(|spec| spec.containers.first())
        .ok_or_else(|| OperatorError::MissingContainer(pod_key(pod)))?;

    Ok(ContainerRef::new(namespace, pod.name_any(), container.name.clone()))
}

/// Process ids listed by `jps`, excluding `jps` itself
pub(crate) fn parse_jps_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let pid = parts.next()?;
            match parts.next() {
                Some(class) if class.eq_ignore_ascii_case("jps") => None,
                _ => Some(pid.to_string()),
            }
        })
        .collect()
}

/// Shell command running the loader against `pid`
pub(crate) fn attach_command(pid: &str, port: i32) -> String {
    let loader = format!("{}/{}", agent::TARGET_DIR, agent::LOADER_JAR);
    let agent_jar = format!("{}/{}", agent::TARGET_DIR, agent::AGENT_JAR);
    let config = format!(
        "{}/{}/{}",
        agent::TARGET_DIR,
        agent::CONF_SUBDIR,
        agent::CONFIG_FILENAME
    );

    format!(
        "$JAVA_HOME/bin/java -cp {} -Dpid={} -Dprometheus.javaagent.path={} -Dprometheus.port={} -Dprometheus.javaagent.configPath={} {}",
        loader,
        pid,
        agent_jar,
        port,
        config,
        agent::LOADER_CLASS
    )
}

fn write_config_file(dir: &Path, config: &JmxExporterConfig) -> Result<()> {
    fs::write(dir.join(agent::CONFIG_FILENAME), config.render()?)?;
    Ok(())
}
