// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::kubernetes::pods::pod_key;
use crate::types::PrometheusJmxExporter;
use k8s_openapi::api::core::v1::Pod;
use std::fmt;

/// A change to one of the watched objects
#[derive(Debug, Clone)]
pub enum ClusterEvent {
    /// An exporter was created, updated or deleted
    Exporter {
        exporter: PrometheusJmxExporter,
        deleted: bool,
    },
    /// A pod was created, updated or deleted
    Pod { pod: Pod, deleted: bool },
}

impl ClusterEvent {
    pub fn exporter(exporter: PrometheusJmxExporter, deleted: bool) -> Self {
        ClusterEvent::Exporter { exporter, deleted }
    }

    pub fn pod(pod: Pod, deleted: bool) -> Self {
        ClusterEvent::Pod { pod, deleted }
    }

    pub fn is_deletion(&self) -> bool {
        match self {
            ClusterEvent::Exporter { deleted, .. } | ClusterEvent::Pod { deleted, .. } => *deleted,
        }
    }
}

impl fmt::Display for ClusterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, key) = match self {
            ClusterEvent::Exporter { exporter, .. } => ("prometheusjmxexporter", exporter.key()),
            ClusterEvent::Pod { pod, .. } => ("pod", pod_key(pod)),
        };
        if self.is_deletion() {
            write!(f, "{} '{}' deleted", kind, key)
        } else {
            write!(f, "{} '{}'", kind, key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_exporter, make_pod};

    #[test]
    fn test_display() {
        let exporter = ClusterEvent::exporter(make_exporter("x", &[], 9404, None), false);
        let pod = ClusterEvent::pod(make_pod("app-0", &[], &[], "Running"), true);

        assert_eq!(exporter.to_string(), "prometheusjmxexporter 'default/x'");
        assert_eq!(pod.to_string(), "pod 'default/app-0' deleted");
        assert!(!exporter.is_deletion());
        assert!(pod.is_deletion());
    }
}
