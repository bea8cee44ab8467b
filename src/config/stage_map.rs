// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::traits::Plugin;
use std::collections::HashMap;
use std::sync::Arc;

/// A type-safe registry mapping stage identifiers to plugin instances.
///
/// The `StageMap` is the static replacement for loading plugin code from a
/// path: every identifier a pipeline may reference is registered up front,
/// either by the [`RuntimeBuilder`](crate::config::RuntimeBuilder) from the
/// manifest's `initialize.plugins` section or explicitly by the caller.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use impact_engine::builtins::SumPlugin;
/// use impact_engine::config::StageMap;
///
/// let mut stages = StageMap::new();
/// stages.insert("sum-energy".to_string(), Arc::new(SumPlugin::new(None)));
///
/// assert!(stages.contains_key("sum-energy"));
/// assert_eq!(stages.get("sum-energy").map(|p| p.name()), Some("sum"));
/// ```
#[derive(Clone, Default)]
pub struct StageMap(pub HashMap<String, Arc<dyn Plugin>>);

impl StageMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Register a plugin under a stage identifier; the last registration wins.
    pub fn insert(&mut self, id: String, plugin: Arc<dyn Plugin>) {
        self.0.insert(id, plugin);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Plugin>> {
        self.0.get(id)
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for StageMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&String> = self.0.keys().collect();
        ids.sort();
        f.debug_struct("StageMap")
            .field("stage_count", &self.0.len())
            .field("stage_ids", &ids)
            .finish()
    }
}
