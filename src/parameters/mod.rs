// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Parameter registry: field name -> aggregation method, unit and description.

mod builtin;
mod registry;

pub use builtin::BUILTIN_PARAMETERS;
pub use registry::{AggregationMethod, ParameterDescriptor, ParameterRegistry};
