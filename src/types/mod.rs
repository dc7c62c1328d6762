// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource and agent configuration types.

pub mod exporter;
pub mod jmx_config;

pub use exporter::{
    ConfigSource, MetricsEndpoint, PrometheusJmxExporter, PrometheusJmxExporterSpec,
    PrometheusJmxExporterStatus,
};
pub use jmx_config::{JmxExporterConfig, Rule};
