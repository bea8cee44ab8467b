// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::record::Record;

/// Ordered child map; key order is declaration (or first-seen) order.
pub type Children = IndexMap<String, Node>;

/// Stage identifier -> stage-specific settings.
pub type NodeConfig = IndexMap<String, Value>;

/// One pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Observe,
    Regroup,
    Compute,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Observe => "observe",
            Phase::Regroup => "regroup",
            Phase::Compute => "compute",
        }
    }
}

/// Per-phase ordered stage lists.
///
/// `regroup` holds grouping field names rather than stage identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhasedPipeline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observe: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regroup: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute: Option<Vec<String>>,
}

impl PhasedPipeline {
    /// Pipeline handed to children created by a regroup: only `compute` survives.
    pub fn after_regroup(&self) -> Self {
        Self {
            observe: None,
            regroup: None,
            compute: self.compute.clone(),
        }
    }

    /// Stage identifiers declared for `phase`. Regroup entries are grouping
    /// fields, so that phase never names a stage.
    pub fn stage_ids(&self, phase: Phase) -> &[String] {
        let ids = match phase {
            Phase::Observe => &self.observe,
            Phase::Compute => &self.compute,
            Phase::Regroup => return &[],
        };
        ids.as_deref().unwrap_or_default()
    }
}

/// A manifest tree node.
///
/// Leaves carry `inputs`/`outputs`, interior nodes carry `children`. Any
/// additional keys (names, tags, ...) are preserved untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PhasedPipeline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Children>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<Record>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Node {
    pub fn with_children(children: Children) -> Self {
        Self {
            children: Some(children),
            ..Default::default()
        }
    }

    pub fn is_interior(&self) -> bool {
        self.children.is_some()
    }

    /// Child lookup by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.as_ref().and_then(|children| children.get(name))
    }
}
