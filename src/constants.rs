// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Pod annotation keys and values written by the operator
pub mod annotations {
    /// Injection marker; absent means the pod has not been processed yet
    pub const INJECTION: &str = "jmx-prometheus-exporter";
    pub const VERIFIED: &str = "verified";
    pub const VERIFIED_FAILED: &str = "verified-failed";
    /// Scrape enablement read by Prometheus service discovery
    pub const SCRAPE: &str = "prometheus.io/scrape";
    pub const SCRAPE_PORT: &str = "prometheus.io/port";
}

/// Agent artifacts and their layout inside the target container
pub mod agent {
    /// Default local directory holding the loader and agent jars
    pub const SOURCE_DIR: &str = "/opt/jmx-exporter-loader";
    pub const TARGET_DIR: &str = "/opt/jmx-exporter-loader";
    pub const CONF_SUBDIR: &str = "conf";
    pub const CONFIG_FILENAME: &str = "config.yaml";
    pub const LOADER_JAR: &str = "jmx-exporter-loader-1.0.jar";
    pub const AGENT_JAR: &str = "jmx_prometheus_javaagent-0.3.1.jar";
    pub const LOADER_CLASS: &str = "com.banzaicloud.JmxExporterLoader";
    /// Name of the container port declared for the metrics endpoint
    pub const PORT_NAME: &str = "jmx-metrics";
}

/// The operator name used in logs and as field manager
pub const OPERATOR_NAME: &str = "jmx-exporter-operator";

/// Bound of the queue between watchers and the dispatcher
pub const DEFAULT_QUEUE_SIZE: usize = 256;

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
