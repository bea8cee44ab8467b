// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod runtime;
mod stage_map;

pub mod consts;

pub use loader::{
    load_manifest, parse_manifest, ExecutorOptions, Initialize, Manifest, PluginSpec,
};
pub use runtime::{Runtime, RuntimeBuilder};
pub use stage_map::StageMap;
