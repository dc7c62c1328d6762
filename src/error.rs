// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Exec transport error: {0}")]
    Transport(String),

    #[error("Command '{command}' failed: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("Config source error: {0}")]
    ConfigSource(String),

    #[error("Invalid exporter config: {0}")]
    InvalidConfig(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Port number {port} is already in use on container '{container}'")]
    DuplicatePort { port: i32, container: String },

    #[error("Multiple java processes found in {target}: {pids:?}")]
    AmbiguousTarget { target: String, pids: Vec<String> },

    #[error("No java process found in {0}")]
    NoJavaProcess(String),

    #[error("Pod {0} has no container to instrument")]
    MissingContainer(String),

    #[error("Agent artifact not found: {0}")]
    MissingArtifact(String),

    #[error("Multiple prometheusjmxexporters for pod '{pod}' found: {exporters}")]
    MultipleOwners { pod: String, exporters: String },

    #[error("prometheusjmxexporter '{exporter}' for pod '{pod}' already defined")]
    Conflict { exporter: String, pod: String },

    #[error("Invalid object: {0}")]
    InvalidObject(String),
}

pub type Result<T> = std::result::Result<T, OperatorError>;
