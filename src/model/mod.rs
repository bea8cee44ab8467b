// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod node;
pub mod record;

pub use node::{Children, Node, NodeConfig, Phase, PhasedPipeline};
pub use record::{merge_defaults, Record, DURATION, TIMESTAMP};
