// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod aggregate;
pub mod executor;
pub mod regroup;

pub use aggregate::{aggregate, AggregationParams, AggregationScope, AggregationType};
pub use executor::{ComputeContext, PhaseFilter, PipelineExecutor};
pub use regroup::regroup;
