// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::{CoefficientPlugin, SumPlugin, TimeSyncPlugin};
use crate::config::consts::BUILTIN_PLUGIN_PATH;
use crate::config::PluginSpec;
use crate::errors::{EngineError, Result};
use crate::parameters::ParameterRegistry;
use crate::traits::Plugin;

/// Factory for built-in plugin instances.
pub struct BuiltinPluginFactory;

impl BuiltinPluginFactory {
    /// Create the plugin for stage `id` from its `initialize` entry.
    ///
    /// The `method` field selects the implementation:
    /// - "TimeSync" -> [`TimeSyncPlugin`]
    /// - "Sum" -> [`SumPlugin`]
    /// - "Coefficient" -> [`CoefficientPlugin`]
    pub fn create_plugin(
        id: &str,
        spec: &PluginSpec,
        registry: Arc<ParameterRegistry>,
    ) -> Result<Arc<dyn Plugin>> {
        if let Some(path) = spec.path.as_deref().filter(|path| *path != BUILTIN_PLUGIN_PATH) {
            return Err(EngineError::ModuleInitialization {
                stage: id.to_string(),
                reason: format!(
                    "plugin path '{}' cannot be loaded; only '{}' plugins are available",
                    path, BUILTIN_PLUGIN_PATH
                ),
            });
        }

        let config = spec.config.clone();
        match spec.method.as_str() {
            "TimeSync" => Ok(Arc::new(TimeSyncPlugin::new(config, registry))),
            "Sum" => Ok(Arc::new(SumPlugin::new(config))),
            "Coefficient" => Ok(Arc::new(CoefficientPlugin::new(config))),
            other => Err(EngineError::ModuleInitialization {
                stage: id.to_string(),
                reason: format!(
                    "unknown plugin method '{}'; available methods: {}",
                    other,
                    Self::list_available_methods().join(", ")
                ),
            }),
        }
    }

    pub fn list_available_methods() -> Vec<&'static str> {
        vec!["TimeSync", "Sum", "Coefficient"]
    }
}
