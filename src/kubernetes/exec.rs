// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Remote command execution inside pod containers

use crate::error::{OperatorError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kube::{api::AttachParams, Api, Client};
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, instrument};

/// Input stream fed to a remote command's stdin
pub type ExecInput = Box<dyn AsyncRead + Send + Unpin>;

/// Identifies one container of one pod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub namespace: String,
    pub pod: String,
    pub container: String,
}

impl ContainerRef {
    pub fn new(
        namespace: impl Into<String>,
        pod: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pod: pod.into(),
            container: container.into(),
        }
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.pod, self.container)
    }
}

/// Runs commands inside containers.
#[async_trait]
pub trait PodExec: Send + Sync {
    /// Run `command` in `target`, feeding `stdin` when given. Returns stdout on
    /// success; a non-zero exit or any stderr output is a command failure.
    async fn exec(
        &self,
        target: &ContainerRef,
        stdin: Option<ExecInput>,
        command: Vec<String>,
    ) -> Result<String>;
}

/// Exec over the Kubernetes pod `exec` subresource
#[derive(Clone)]
pub struct KubeExec {
    client: Client,
}

impl KubeExec {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PodExec for KubeExec {
    #[instrument(skip(self, stdin), fields(container = %target))]
    async fn exec(
        &self,
        target: &ContainerRef,
        stdin: Option<ExecInput>,
        command: Vec<String>,
    ) -> Result<String> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &target.namespace);
        let params = AttachParams::default()
            .container(target.container.clone())
            .stdin(stdin.is_some())
            .stdout(true)
            .stderr(true);

        debug!("Executing command '{:?}' in {}", command, target);

        let mut attached = pods
            .exec(&target.pod, command.clone(), &params)
            .await
            .map_err(|e| {
                OperatorError::Transport(format!("Failed to open exec channel to {}: {}", target, e))
            })?;

        let remote_stdin = attached.stdin();
        let stdout = attached.stdout();
        let stderr = attached.stderr();
        let status = attached.take_status();

        let feed = async move {
            if let (Some(mut input), Some(mut remote)) = (stdin, remote_stdin) {
                tokio::io::copy(&mut input, &mut remote).await?;
                remote.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };

        let (fed, stdout, stderr) = tokio::join!(feed, read_stream(stdout), read_stream(stderr));

        let status = match status {
            Some(status) => status.await,
            None => None,
        };

        attached
            .join()
            .await
            .map_err(|e| OperatorError::Transport(format!("Exec channel to {} failed: {}", target, e)))?;

        let stdout = stdout?;
        let stderr = stderr?;
        debug!("Command stderr: {}", stderr);
        debug!("Command stdout: {}", stdout);

        if let Err(e) = fed {
            info!("Streaming stdin to {} failed: {}", target, e);
            return Err(OperatorError::Transport(format!(
                "Failed to stream stdin to {}: {}",
                target, e
            )));
        }

        classify_output(&command, stdout, stderr, status.as_ref())
    }
}

async fn read_stream(stream: Option<impl AsyncRead + Unpin>) -> std::io::Result<String> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Decide the outcome of a finished command from its output and exit status.
pub(crate) fn classify_output(
    command: &[String],
    stdout: String,
    stderr: String,
    status: Option<&Status>,
) -> Result<String> {
    let failed_status = status.filter(|s| s.status.as_deref() != Some("Success"));

    if !stderr.is_empty() {
        return Err(OperatorError::CommandFailed {
            command: command.join(" "),
            detail: format!("stderr: {}", stderr),
        });
    }

    if let Some(status) = failed_status {
        let detail = status
            .message
            .clone()
            .or_else(|| status.reason.clone())
            .unwrap_or_else(|| "unknown failure".to_string());
        return Err(OperatorError::CommandFailed {
            command: command.join(" "),
            detail,
        });
    }

    debug!("Command succeeded.");
    Ok(stdout)
}

/// `command` as owned strings
pub fn command(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}
