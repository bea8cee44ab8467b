// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;
use crate::model::Record;
use crate::parameters::ParameterDescriptor;

/// Discriminator for what a stage does when the executor invokes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// `execute(records, config) -> records`
    Execute,
}

/// Field descriptors a plugin consumes and produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterMetadata {
    #[serde(default)]
    pub inputs: IndexMap<String, ParameterDescriptor>,
    #[serde(default)]
    pub outputs: IndexMap<String, ParameterDescriptor>,
}

/// Static metadata exposed by every plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginMetadata {
    pub kind: PluginKind,
    pub parameters: ParameterMetadata,
}

impl PluginMetadata {
    pub fn execute() -> Self {
        Self {
            kind: PluginKind::Execute,
            parameters: ParameterMetadata::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: ParameterMetadata) -> Self {
        self.parameters = parameters;
        self
    }
}

/// A pipeline stage.
///
/// Stages receive the records by shared reference and return a new sequence;
/// they never mutate their input. `config` is the node-level settings for this
/// stage identifier, if the node (or an ancestor) declared any.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn metadata(&self) -> &PluginMetadata;

    async fn execute(&self, records: &[Record], config: Option<&Value>) -> Result<Vec<Record>>;
}

/// Node-level config wins over the plugin-level config from `initialize`.
pub fn resolve_config<'a>(node: Option<&'a Value>, global: Option<&'a Value>) -> Option<&'a Value> {
    node.or(global)
}
