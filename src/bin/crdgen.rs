// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Prints the PrometheusJmxExporter CRD as YAML.
//!
//! Usage:
//!   cargo run --bin crdgen > deploy/crds/prometheusjmxexporters.crd.yaml

use jmx_exporter_operator::types::PrometheusJmxExporter;
use kube::CustomResourceExt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", serde_yaml::to_string(&PrometheusJmxExporter::crd())?);
    Ok(())
}
