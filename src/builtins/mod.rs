// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Statically linked plugins available to `initialize.plugins`.

mod coefficient;
mod factory;
mod sum;
mod time_sync;

#[cfg(test)]
pub mod stub;

pub use coefficient::CoefficientPlugin;
pub use factory::BuiltinPluginFactory;
pub use sum::SumPlugin;
pub use time_sync::TimeSyncPlugin;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{EngineError, Result};

/// Deserialize a plugin's effective config, naming the plugin on failure.
pub(crate) fn parse_config<T: DeserializeOwned>(plugin: &str, config: Option<&Value>) -> Result<T> {
    let config = config
        .ok_or_else(|| EngineError::Config(format!("{} plugin requires a config", plugin)))?;
    serde_json::from_value(config.clone())
        .map_err(|e| EngineError::Config(format!("invalid {} config: {}", plugin, e)))
}
