// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::engine::AggregationParams;
use crate::errors::{EngineError, Result};
use crate::model::Node;
use crate::parameters::ParameterDescriptor;
use crate::traits::ParameterMetadata;

/// A complete manifest: plugin initialization, global settings and the tree.
///
/// # Example
/// ```yaml
/// name: web-fleet
/// initialize:
///   plugins:
///     time-sync:
///       method: TimeSync
///       config:
///         start-time: 2023-12-12T00:00:00.000Z
///         end-time: 2023-12-12T00:01:00.000Z
///         interval: 5
///         allow-padding: true
///     sum-energy:
///       method: Sum
///       config:
///         input-parameters: [cpu/energy, memory/energy]
///         output-parameter: energy
/// executor-options:
///   stage-timeout-seconds: 30
/// aggregation:
///   type: vertical
///   metrics: [energy]
/// tree:
///   pipeline:
///     compute: [time-sync, sum-energy]
///   children:
///     server-1:
///       inputs:
///         - timestamp: 2023-12-12T00:00:00.000Z
///           duration: 60
///           cpu/energy: 0.02
///           memory/energy: 0.01
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Manifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub initialize: Initialize,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationParams>,
    pub tree: Node,
}

/// The `initialize` section: stage identifier -> plugin specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Initialize {
    #[serde(default)]
    pub plugins: IndexMap<String, PluginSpec>,
}

/// How to build one stage.
///
/// * `method` - built-in plugin name (`TimeSync`, `Sum`, `Coefficient`)
/// * `path` - optional; only `builtin` is accepted
/// * `config` - plugin-level config, used when a node declares none
/// * `parameter_metadata` - field descriptors registered with the parameter registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginSpec {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_metadata: Option<ParameterMetadata>,
}

/// Executor-specific options.
///
/// * `stage_timeout_seconds` - upper bound for a single stage invocation;
///   unset means stages may run indefinitely
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecutorOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_timeout_seconds: Option<u64>,
}

impl ExecutorOptions {
    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_seconds.map(Duration::from_secs)
    }
}

/// Parse a manifest from YAML text.
pub fn parse_manifest(yaml: &str) -> Result<Manifest> {
    serde_yaml::from_str(yaml).map_err(|e| EngineError::Manifest {
        path: "<inline>".to_string(),
        reason: e.to_string(),
    })
}

/// Load a manifest from a YAML file.
pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| EngineError::Manifest {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| EngineError::Manifest {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
