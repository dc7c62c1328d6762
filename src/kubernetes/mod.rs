// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes plumbing: CRD discovery, remote exec, uploads, and pod reads and writes.

pub mod crd;
pub mod exec;
pub mod pods;
pub mod queries;
pub mod upload;

pub use crd::wait_for_exporter_crd;
pub use exec::{ContainerRef, ExecInput, KubeExec, PodExec};
pub use pods::{replace_pod, PodDelta};
pub use queries::{fetch_exporter_config, get_pod, list_exporters, running_pods_matching};
pub use upload::upload_dir;
