// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod plugin;

pub use crate::config::StageMap;
pub use plugin::{resolve_config, ParameterMetadata, Plugin, PluginKind, PluginMetadata};
