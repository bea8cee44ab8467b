// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod builtins;   // statically linked plugins
pub mod config;     // manifest loading + runtime
pub mod engine;     // executor, regroup, aggregation
pub mod errors;     // error handling
pub mod export;     // computed manifest output
pub mod model;      // records and tree nodes
pub mod observability;
pub mod parameters; // aggregation-method registry
pub mod time_sync;  // resampling and padding
pub mod traits;     // plugin contract
pub mod utils;
