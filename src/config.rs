// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{agent, DEFAULT_QUEUE_SIZE};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Local directory holding the loader and agent jars to upload
    pub agent_source_dir: PathBuf,
    /// Restrict watches to a single namespace; cluster-wide when unset
    pub watch_namespace: Option<String>,
    pub queue_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            agent_source_dir: PathBuf::from(agent::SOURCE_DIR),
            watch_namespace: None,
            queue_size: DEFAULT_QUEUE_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let agent_source_dir = env::var("AGENT_SOURCE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(agent::SOURCE_DIR));

        let watch_namespace = env::var("WATCH_NAMESPACE")
            .ok()
            .filter(|ns| !ns.is_empty());

        let queue_size = match env::var("DISPATCH_QUEUE_SIZE") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("DISPATCH_QUEUE_SIZE is not a number: {}", v))?,
            Err(_) => DEFAULT_QUEUE_SIZE,
        };

        Ok(Config {
            agent_source_dir,
            watch_namespace,
            queue_size,
        })
    }
}
